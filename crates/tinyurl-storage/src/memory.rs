use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tinyurl_core::error::StorageError;
use tinyurl_core::repository::{ReadRepository, Repository, Result, ShortUrlRecord};
use tinyurl_core::shortcode::ShortCode;

/// In-memory implementation of the Repository trait using DashMap.
///
/// Records are keyed by id, with secondary indexes on original URL and short
/// code. Uniqueness is enforced through the index entry locks: the record is
/// written while the index shard is held, so a concurrent reader sees either
/// nothing or the complete record. Ids come from an atomic counter starting
/// at 1.
#[derive(Debug)]
pub struct InMemoryRepository {
    records: DashMap<u64, ShortUrlRecord>,
    by_url: DashMap<String, u64>,
    by_code: DashMap<String, u64>,
    next_id: AtomicU64,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates a new in-memory repository with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: DashMap::with_capacity(capacity),
            by_url: DashMap::with_capacity(capacity),
            by_code: DashMap::with_capacity(capacity),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of stored records, pending ones included.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn record(&self, id: u64) -> Option<ShortUrlRecord> {
        self.records.get(&id).map(|r| r.value().clone())
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn find_by_short_code(&self, code: &ShortCode) -> Result<Option<ShortUrlRecord>> {
        let Some(id) = self.by_code.get(code.as_str()).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.record(id))
    }

    async fn find_by_original_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        let Some(id) = self.by_url.get(original_url).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.record(id))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert_pending(&self, original_url: &str) -> Result<u64> {
        match self.by_url.entry(original_url.to_owned()) {
            Entry::Occupied(_) => Err(StorageError::DuplicateUrl(original_url.to_owned())),
            Entry::Vacant(slot) => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                self.records
                    .insert(id, ShortUrlRecord::pending(id, original_url));
                slot.insert(id);
                Ok(id)
            }
        }
    }

    async fn set_short_code(&self, id: u64, code: &ShortCode) -> Result<()> {
        let Some(mut record) = self.records.get_mut(&id) else {
            return Err(StorageError::RecordNotFound(format!("id {id}")));
        };

        if let Some(existing) = &record.short_code {
            if existing == code {
                return Ok(());
            }
            return Err(StorageError::ShortCodeImmutable {
                id,
                existing: existing.to_string(),
            });
        }

        match self.by_code.entry(code.as_str().to_owned()) {
            Entry::Occupied(owner) if *owner.get() != id => {
                Err(StorageError::DuplicateCode(code.to_string()))
            }
            Entry::Occupied(_) => {
                record.short_code = Some(code.clone());
                Ok(())
            }
            Entry::Vacant(slot) => {
                record.short_code = Some(code.clone());
                slot.insert(id);
                Ok(())
            }
        }
    }

    async fn increment_visit_count(&self, code: &ShortCode) -> Result<()> {
        let Some(id) = self.by_code.get(code.as_str()).map(|id| *id) else {
            return Err(StorageError::RecordNotFound(code.to_string()));
        };
        let Some(mut record) = self.records.get_mut(&id) else {
            return Err(StorageError::RecordNotFound(code.to_string()));
        };
        record.visit_count += 1;
        Ok(())
    }
}
