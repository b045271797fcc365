use async_trait::async_trait;
use jiff::Timestamp;
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use tinyurl_core::error::StorageError;
use tinyurl_core::repository::{ReadRepository, Repository, Result, ShortUrlRecord};
use tinyurl_core::shortcode::ShortCode;
use tracing::{debug, trace};

/// DDL for the `short_urls` table.
pub const SHORT_URLS_DDL: &str = include_str!("../ddl/mysql/short_urls.sql");

/// MySQL implementation of the repository contract.
///
/// Ids come from `AUTO_INCREMENT`. Uniqueness of short codes and original
/// URLs is enforced by unique indexes; the URL index is built on a stored
/// SHA-256 of the URL since the column is too long to index directly.
/// Short codes use a binary collation so codes differing only in case stay
/// distinct, and reads convert them back to text.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        Ok(Self::new(pool))
    }

    /// Creates the `short_urls` table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(SHORT_URLS_DDL)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        debug!("short_urls schema is in place");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    async fn current_short_code(&self, id: u64) -> Result<Option<Option<String>>> {
        let row = sqlx::query(
            r#"
            SELECT CONVERT(short_code USING utf8mb4) AS short_code
            FROM short_urls
            WHERE id = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(|row| row.try_get::<Option<String>, _>("short_code"))
            .transpose()
            .map_err(map_sqlx_error)
    }
}

fn parse_created_at(seconds: i64) -> Result<Timestamp> {
    Timestamp::from_second(seconds).map_err(|e| {
        StorageError::InvalidData(format!("invalid created_at timestamp '{seconds}': {e}"))
    })
}

fn record_from_row(row: &MySqlRow) -> Result<ShortUrlRecord> {
    let id: u64 = row.try_get("id").map_err(map_sqlx_error)?;
    let original_url: String = row.try_get("original_url").map_err(map_sqlx_error)?;
    let short_code: Option<String> = row.try_get("short_code").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let visit_count: u64 = row.try_get("visit_count").map_err(map_sqlx_error)?;

    Ok(ShortUrlRecord {
        id,
        original_url,
        short_code: short_code.map(ShortCode::new_unchecked),
        created_at: parse_created_at(created_at)?,
        visit_count,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>> {
        trace!(code = %code, "looking up record by short code");

        let row = sqlx::query(
            r#"
            SELECT id,
                   original_url,
                   CONVERT(short_code USING utf8mb4) AS short_code,
                   created_at,
                   visit_count
            FROM short_urls
            WHERE short_code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        trace!(url = %original_url, "looking up record by original url");

        let row = sqlx::query(
            r#"
            SELECT id,
                   original_url,
                   CONVERT(short_code USING utf8mb4) AS short_code,
                   created_at,
                   visit_count
            FROM short_urls
            WHERE original_url_hash = UNHEX(SHA2(?, 256))
            LIMIT 1
            "#,
        )
        .bind(original_url)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(record_from_row).transpose()
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert_pending(&self, original_url: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_urls (original_url, short_code, created_at, visit_count)
            VALUES (?, NULL, ?, 0)
            "#,
        )
        .bind(original_url)
        .bind(Timestamp::now().as_second())
        .execute(&self.pool)
        .await;

        match result {
            Ok(done) => Ok(done.last_insert_id()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::DuplicateUrl(original_url.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn set_short_code(&self, id: u64, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET short_code = ?
            WHERE id = ?
              AND short_code IS NULL
            "#,
        )
        .bind(code.as_str())
        .bind(id)
        .execute(&self.pool)
        .await;

        let rows_affected = match result {
            Ok(done) => done.rows_affected(),
            Err(err) if is_unique_violation(&err) => {
                return Err(StorageError::DuplicateCode(code.to_string()))
            }
            Err(err) => return Err(map_sqlx_error(err)),
        };

        if rows_affected > 0 {
            return Ok(());
        }

        // Nothing updated: the record is missing or already carries a code.
        match self.current_short_code(id).await? {
            None => Err(StorageError::RecordNotFound(format!("id {id}"))),
            Some(Some(existing)) if existing == code.as_str() => Ok(()),
            Some(Some(existing)) => Err(StorageError::ShortCodeImmutable { id, existing }),
            Some(None) => Err(StorageError::Operation(format!(
                "short code for id {id} was not written"
            ))),
        }
    }

    async fn increment_visit_count(&self, code: &ShortCode) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE short_urls
            SET visit_count = visit_count + 1
            WHERE short_code = ?
            "#,
        )
        .bind(code.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if result.rows_affected() == 0 {
            return Err(StorageError::RecordNotFound(code.to_string()));
        }
        Ok(())
    }
}
