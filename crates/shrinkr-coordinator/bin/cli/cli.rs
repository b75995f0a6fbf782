use clap::builder::RangedU64ValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use shrinkr_cache::redis::DEFAULT_KEY_PREFIX;
use shrinkr_core::ShortCode;
use std::fmt::{Display, Formatter};

pub const REDIS_URL_ENV: &str = "SHRINKR_REDIS_URL";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const CACHE_KEY_PREFIX_ENV: &str = "SHRINKR_CACHE_KEY_PREFIX";
pub const CACHE_TTL_ENV: &str = "SHRINKR_CACHE_TTL_SECS";
pub const CACHE_TIMEOUT_ENV: &str = "SHRINKR_CACHE_TIMEOUT_MS";
pub const DURABLE_TIMEOUT_ENV: &str = "SHRINKR_DURABLE_TIMEOUT_MS";
pub const DB_MAX_CONNECTIONS_ENV: &str = "SHRINKR_DB_MAX_CONNECTIONS";
pub const DB_MIN_CONNECTIONS_ENV: &str = "SHRINKR_DB_MIN_CONNECTIONS";
pub const BASE_URL_ENV: &str = "SHRINKR_BASE_URL";
pub const LOG_FORMAT_ENV: &str = "SHRINKR_LOG_FORMAT";

pub const DEFAULT_BASE_URL: &str = "http://localhost:9808";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

impl Display for LogFormatArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormatArg::Text => write!(f, "text"),
            LogFormatArg::Json => write!(f, "json"),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "shrinkr", about = "Shorten, resolve and inspect short links")]
pub struct CLI {
    #[arg(long, env = REDIS_URL_ENV)]
    pub redis_url: Option<String>,

    #[arg(long, env = DATABASE_URL_ENV)]
    pub database_url: Option<String>,

    #[arg(long, env = CACHE_KEY_PREFIX_ENV, default_value = DEFAULT_KEY_PREFIX)]
    pub cache_key_prefix: String,

    #[arg(long, env = CACHE_TTL_ENV, default_value_t = 21_600)]
    pub cache_ttl_secs: u64,

    #[arg(long, env = CACHE_TIMEOUT_ENV, default_value_t = 1_000)]
    pub cache_timeout_ms: u64,

    #[arg(long, env = DURABLE_TIMEOUT_ENV, default_value_t = 5_000)]
    pub durable_timeout_ms: u64,

    #[arg(long, env = DB_MAX_CONNECTIONS_ENV, default_value_t = 10)]
    pub db_max_connections: u32,

    #[arg(long, env = DB_MIN_CONNECTIONS_ENV, default_value_t = 2)]
    pub db_min_connections: u32,

    #[arg(long, env = BASE_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(
        long,
        env = LOG_FORMAT_ENV,
        value_enum,
        default_value_t = LogFormatArg::Text
    )]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a mapping under a generated or given short code.
    Shorten {
        url: String,
        #[arg(long)]
        owner: Option<String>,
        /// Use this code instead of deriving one from the URL.
        #[arg(long)]
        code: Option<String>,
        #[arg(
            long,
            default_value_t = 8,
            value_parser = RangedU64ValueParser::<usize>::new()
                .range(ShortCode::MIN_LENGTH as u64..=ShortCode::MAX_LENGTH as u64)
        )]
        length: usize,
    },
    /// Print the original URL behind a short code.
    Resolve { code: String },
    /// Resolve a short code and record a click for it.
    Visit {
        code: String,
        #[arg(long)]
        owner: Option<String>,
        #[arg(long)]
        ip: Option<String>,
        #[arg(long)]
        user_agent: Option<String>,
        #[arg(long)]
        referer: Option<String>,
    },
    /// Print the durable mapping and its clicks as JSON.
    Inspect { code: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorten_length_must_produce_valid_codes() {
        for length in ["0", "2", "33"] {
            let parsed = CLI::try_parse_from([
                "shrinkr",
                "shorten",
                "https://example.com",
                "--length",
                length,
            ]);
            assert!(parsed.is_err(), "--length {length} should be refused");
        }

        let parsed =
            CLI::try_parse_from(["shrinkr", "shorten", "https://example.com", "--length", "3"])
                .unwrap();
        assert!(matches!(parsed.command, Command::Shorten { length: 3, .. }));
    }

    #[test]
    fn cache_prefix_defaults_to_library_prefix() {
        let parsed = CLI::try_parse_from(["shrinkr", "resolve", "abc123"]).unwrap();
        assert_eq!(parsed.cache_key_prefix, DEFAULT_KEY_PREFIX);
    }
}
