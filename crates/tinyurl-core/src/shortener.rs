use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Shortens `original_url` and returns its short code.
    ///
    /// Idempotent per URL: shortening the same string again returns the
    /// same code.
    async fn create_short_url(&self, original_url: &str) -> Result<ShortCode>;

    /// Resolves a short code to its original URL and records the visit.
    /// Returns `None` if the code has never been issued.
    async fn get_original_url(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Returns the number of recorded visits, or `0` for unknown codes.
    async fn get_click_count(&self, code: &ShortCode) -> Result<u64>;
}
