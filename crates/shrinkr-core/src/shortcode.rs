use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Identifier a long URL is stored and resolved under.
///
/// The code doubles as the cache key suffix and the `short_code` column, so
/// it is restricted to `[A-Za-z0-9_-]` and [`ShortCode::MIN_LENGTH`] to
/// [`ShortCode::MAX_LENGTH`] characters.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortCode(String);

impl ShortCode {
    pub const MIN_LENGTH: usize = 3;
    pub const MAX_LENGTH: usize = 32;

    /// Validates `code` and wraps it.
    pub fn new(code: impl Into<String>) -> Result<Self, CoreError> {
        let code = code.into();

        if !Self::length_allowed(code.len()) {
            return Err(CoreError::InvalidShortCode(format!(
                "'{code}' has {} characters",
                code.len()
            )));
        }
        if let Some(bad) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(CoreError::InvalidShortCode(format!(
                "'{code}' contains '{bad}'"
            )));
        }

        Ok(Self(code))
    }

    /// Wraps `code` as is. For codes read back from storage.
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Whether a code of `length` characters can pass [`ShortCode::new`].
    pub fn length_allowed(length: usize) -> bool {
        (Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&length)
    }

    /// Joins the code onto `base_url`.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ShortCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
