use crate::shortcode::ShortCode;

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
/// Uniqueness is not checked before the code is written: a collision
/// overwrites the previous mapping.
pub trait Generator: Send + Sync + 'static {
    /// Generates a short code for `original_url` on behalf of `owner_user_id`.
    fn generate(&self, original_url: &str, owner_user_id: Option<&str>) -> ShortCode;
}
