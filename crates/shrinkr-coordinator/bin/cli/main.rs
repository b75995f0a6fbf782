mod cli;

use crate::cli::{Command, LogFormatArg, CLI};
use clap::Parser;
use serde_json::json;
use shrinkr_coordinator::{Coordinator, CoordinatorOptions, Settings, Visit};
use shrinkr_core::{Generator, ShortCode};
use shrinkr_generator::DigestGenerator;
use shrinkr_storage::PoolSettings;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    let config = CLI::try_parse()?;
    init_tracing(config.log_format);

    info!(
        cache = config.redis_url.is_some(),
        durable = config.database_url.is_some(),
        log_format = %config.log_format,
        "starting shrinkr"
    );

    let coordinator = Coordinator::initialize(&settings(&config)).await;
    let result = run(&coordinator, &config).await;
    coordinator.shutdown().await;
    result
}

fn init_tracing(format: LogFormatArg) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormatArg::Text => builder.init(),
        LogFormatArg::Json => builder.json().init(),
    }
}

fn settings(config: &CLI) -> Settings {
    let options = CoordinatorOptions::builder()
        .cache_ttl(Duration::from_secs(config.cache_ttl_secs))
        .cache_timeout(Duration::from_millis(config.cache_timeout_ms))
        .durable_timeout(Duration::from_millis(config.durable_timeout_ms))
        .build();
    let pool = PoolSettings::builder()
        .max_connections(config.db_max_connections)
        .min_connections(config.db_min_connections)
        .build();

    Settings {
        redis_url: config.redis_url.clone(),
        database_url: config.database_url.clone(),
        cache_key_prefix: config.cache_key_prefix.clone(),
        pool,
        options,
    }
}

async fn run(coordinator: &Coordinator, config: &CLI) -> Result<(), Box<dyn std::error::Error>> {
    match &config.command {
        Command::Shorten {
            url,
            owner,
            code,
            length,
        } => {
            let code = match code {
                Some(code) => ShortCode::new(code)?,
                None => DigestGenerator::new(*length)?.generate(url, owner.as_deref()),
            };
            let outcome = coordinator
                .save_mapping(&code, url, owner.as_deref())
                .await?;
            println!(
                "{}",
                json!({
                    "short_code": code.as_str(),
                    "short_url": code.to_url(&config.base_url),
                    "original_url": url,
                    "record_id": outcome.record_id.map(|id| id.to_string()),
                    "cached": outcome.cached,
                })
            );
        }
        Command::Resolve { code } => {
            let code = ShortCode::new(code)?;
            match coordinator.resolve_mapping(&code).await? {
                Some(url) => println!("{url}"),
                None => return Err(format!("short code '{code}' not found").into()),
            }
        }
        Command::Visit {
            code,
            owner,
            ip,
            user_agent,
            referer,
        } => {
            let code = ShortCode::new(code)?;
            let visit = Visit {
                owner_user_id: owner.clone(),
                ip_address: ip.clone(),
                user_agent: user_agent.clone(),
                referer: referer.clone(),
            };
            let Some(redirect) = coordinator.redirect(&code, visit).await? else {
                return Err(format!("short code '{code}' not found").into());
            };
            println!("{}", redirect.original_url);
            // The process exits right after, so wait for the click to land.
            let _ = redirect.tracking.await;
        }
        Command::Inspect { code } => {
            let code = ShortCode::new(code)?;
            let store = coordinator
                .store()
                .ok_or("inspect needs the durable tier (set DATABASE_URL)")?;
            let Some(mapping) = store.mapping(&code).await? else {
                return Err(format!("short code '{code}' not found").into());
            };
            let clicks = store.clicks(mapping.id).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "mapping": mapping,
                    "clicks": clicks,
                }))?
            );
        }
    }

    Ok(())
}
