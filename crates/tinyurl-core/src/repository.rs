use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Maximum accepted length of an original URL.
pub const MAX_URL_LENGTH: usize = 2048;

/// A durable short URL record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrlRecord {
    /// Store-assigned identifier, starting at 1 and never reused.
    pub id: u64,
    /// The original URL that was shortened.
    pub original_url: String,
    /// The code derived from `id`. `None` only while the record is pending.
    pub short_code: Option<ShortCode>,
    /// When the record was first inserted.
    pub created_at: Timestamp,
    /// Number of successful lookups.
    pub visit_count: u64,
}

impl ShortUrlRecord {
    /// Creates a pending record, before its short code has been derived.
    pub fn pending(id: u64, original_url: impl Into<String>) -> Self {
        Self {
            id,
            original_url: original_url.into(),
            short_code: None,
            created_at: Timestamp::now(),
            visit_count: 0,
        }
    }

    /// Returns `true` while no short code has been assigned.
    pub fn is_pending(&self) -> bool {
        self.short_code.is_none()
    }
}

/// A read-only view of a repository.
///
/// This trait provides only the read operations from [`Repository`].
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the record carrying `code`.
    /// Returns `None` if no record has been assigned that code.
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>>;

    /// Retrieves the record for `original_url`, pending or not.
    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a record without a short code and returns its new identifier.
    /// Returns `Err(DuplicateUrl)` if the URL is already stored.
    async fn insert_pending(&self, original_url: &str) -> Result<u64>;

    /// Assigns `code` to record `id`.
    ///
    /// Re-assigning the same code to the same record is a no-op. Fails with
    /// `RecordNotFound`, `DuplicateCode` or `ShortCodeImmutable`.
    async fn set_short_code(&self, id: u64, code: &ShortCode) -> Result<()>;

    /// Atomically increments the visit count of the record carrying `code`.
    /// Returns `Err(RecordNotFound)` if there is no such record.
    async fn increment_visit_count(&self, code: &ShortCode) -> Result<()>;
}
