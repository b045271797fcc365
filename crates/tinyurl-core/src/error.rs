use thiserror::Error;

/// Errors related to the core functionality of the URL shortener service.
pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid short code format: {0}")]
    InvalidCodeFormat(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache serialization failed: {0}")]
    Serialization(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("original url already exists: {0}")]
    DuplicateUrl(String),
    #[error("short code already assigned to another record: {0}")]
    DuplicateCode(String),
    #[error("record not found: {0}")]
    RecordNotFound(String),
    #[error("record {id} already has short code {existing}")]
    ShortCodeImmutable { id: u64, existing: String },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum ShortenerError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid short code format: {0}")]
    InvalidCodeFormat(String),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidCodeFormat(message) => Self::InvalidCodeFormat(message),
            CoreError::InvalidShortCode(message) => Self::InvalidInput(message),
        }
    }
}
