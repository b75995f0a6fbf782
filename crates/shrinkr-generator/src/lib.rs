//! Short-code generators for shrinkr.

use sha2::{Digest, Sha256};
use shrinkr_core::{normalize_owner, CoreError, Generator, ShortCode};

pub use shrinkr_core::GUEST_USER_ID;

/// Derives a short code from the URL and its owner.
///
/// The code is the base58 rendering of the first eight SHA-256 digest bytes
/// (read as a decimal number), cut to `length` characters. Equal inputs give
/// equal codes, so shortening the same URL twice rewrites one mapping.
/// Guests all hash as [`GUEST_USER_ID`].
#[derive(Debug, Clone)]
pub struct DigestGenerator {
    length: usize,
}

impl Default for DigestGenerator {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
        }
    }
}

impl DigestGenerator {
    pub const DEFAULT_LENGTH: usize = 8;

    /// Creates a generator producing codes of at most `length` characters.
    ///
    /// `length` must be one [`ShortCode::new`] accepts.
    pub fn new(length: usize) -> Result<Self, CoreError> {
        if !ShortCode::length_allowed(length) {
            return Err(CoreError::InvalidCodeLength(length));
        }
        Ok(Self { length })
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

impl Generator for DigestGenerator {
    fn generate(&self, original_url: &str, owner_user_id: Option<&str>) -> ShortCode {
        let owner = normalize_owner(owner_user_id);
        let owner = owner.as_deref().unwrap_or(GUEST_USER_ID);

        let digest = Sha256::new()
            .chain_update(original_url.as_bytes())
            .chain_update(owner.as_bytes())
            .finalize();

        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&digest[..8]);
        let number = u64::from_be_bytes(prefix);

        let mut encoded = bs58::encode(number.to_string()).into_string();
        encoded.truncate(self.length);
        ShortCode::new_unchecked(encoded)
    }
}
