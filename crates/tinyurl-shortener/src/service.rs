use crate::settings::{ShortenerSettings, VisitRecording};
use async_trait::async_trait;
use std::sync::Arc;
use tinyurl_core::repository::MAX_URL_LENGTH;
use tinyurl_core::{
    Repository, ShortCode, ShortUrlRecord, Shortener, ShortenerError, StorageError, UrlCache,
};
use tracing::{debug, info, trace, warn};

type Result<T> = std::result::Result<T, ShortenerError>;

/// A concrete implementation of the `Shortener` trait.
///
/// This service wraps a `Repository` and a `UrlCache` to handle:
/// - Code derivation from the store-assigned id
/// - Cache population after creates and cache misses
/// - Visit counting on successful lookups
///
/// The repository is the source of truth; every cache failure degrades to a
/// store read and is only logged.
#[derive(Debug)]
pub struct ShortenerService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    settings: ShortenerSettings,
}

impl<R, C> Clone for ShortenerService<R, C> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            cache: Arc::clone(&self.cache),
            settings: self.settings.clone(),
        }
    }
}

impl<R: Repository, C: UrlCache> ShortenerService<R, C> {
    /// Creates a new `ShortenerService` with default settings.
    pub fn new(repository: R, cache: C) -> Self {
        Self::with_settings(repository, cache, ShortenerSettings::default())
    }

    pub fn with_settings(repository: R, cache: C, settings: ShortenerSettings) -> Self {
        Self::from_shared(Arc::new(repository), Arc::new(cache), settings)
    }

    /// Creates a service over handles that are shared with other owners.
    pub fn from_shared(repository: Arc<R>, cache: Arc<C>, settings: ShortenerSettings) -> Self {
        Self {
            repository,
            cache,
            settings,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn settings(&self) -> &ShortenerSettings {
        &self.settings
    }

    /// Rejects URLs that cannot be stored.
    fn validate_url(url: &str) -> Result<()> {
        if url.trim().is_empty() {
            return Err(ShortenerError::InvalidInput(
                "URL cannot be empty".to_string(),
            ));
        }

        let length = url.chars().count();
        if length > MAX_URL_LENGTH {
            return Err(ShortenerError::InvalidInput(format!(
                "URL is {length} characters long, at most {MAX_URL_LENGTH} are allowed"
            )));
        }

        Ok(())
    }

    /// Returns the code of an existing record, assigning it first if a
    /// concurrent creator left the record pending.
    async fn complete(&self, record: ShortUrlRecord) -> Result<ShortCode> {
        if let Some(code) = record.short_code {
            trace!(code = %code, "URL already shortened");
            return Ok(code);
        }

        let code = ShortCode::from_id(record.id)?;
        debug!(id = record.id, code = %code, "Completing pending record");
        self.repository.set_short_code(record.id, &code).await?;
        self.populate_cache(&code, &record.original_url).await;
        Ok(code)
    }

    async fn populate_cache(&self, code: &ShortCode, original_url: &str) {
        if let Err(e) = self
            .cache
            .set_url(code, original_url, Some(self.settings.cache_ttl))
            .await
        {
            warn!(code = %code, error = %e, "Failed to populate cache");
        }
    }

    async fn cached_url(&self, code: &ShortCode) -> Option<String> {
        match self.cache.get_url(code).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(code = %code, error = %e, "Cache lookup failed, falling back to repository");
                None
            }
        }
    }

    async fn record_visit(&self, code: &ShortCode) {
        match self.settings.visit_recording {
            VisitRecording::Detached => {
                let repository = Arc::clone(&self.repository);
                let code = code.clone();
                tokio::spawn(async move {
                    if let Err(e) = repository.increment_visit_count(&code).await {
                        warn!(code = %code, error = %e, "Failed to record visit");
                    }
                });
            }
            VisitRecording::Inline => {
                if let Err(e) = self.repository.increment_visit_count(code).await {
                    warn!(code = %code, error = %e, "Failed to record visit");
                }
            }
        }
    }
}

#[async_trait]
impl<R: Repository, C: UrlCache> Shortener for ShortenerService<R, C> {
    async fn create_short_url(&self, original_url: &str) -> Result<ShortCode> {
        Self::validate_url(original_url)?;

        let attempts = self.settings.max_create_attempts.max(1);
        for attempt in 1..=attempts {
            if let Some(record) = self.repository.find_by_original_url(original_url).await? {
                return self.complete(record).await;
            }

            match self.repository.insert_pending(original_url).await {
                Ok(id) => {
                    let code = ShortCode::from_id(id)?;
                    self.repository.set_short_code(id, &code).await?;
                    self.populate_cache(&code, original_url).await;
                    info!(id, code = %code, "Created short URL");
                    return Ok(code);
                }
                // Another creator's insert of the same URL is committed, so
                // its record is visible to a lookup now.
                Err(StorageError::DuplicateUrl(_)) => {
                    debug!(attempt, "Lost insert race, retrying as lookup");
                    if let Some(record) =
                        self.repository.find_by_original_url(original_url).await?
                    {
                        return self.complete(record).await;
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }

        warn!(attempts, "Giving up on contended URL");
        Err(StorageError::DuplicateUrl(original_url.to_string()).into())
    }

    async fn get_original_url(&self, code: &ShortCode) -> Result<Option<String>> {
        let original_url = match self.cached_url(code).await {
            Some(url) => url,
            None => match self.repository.find_by_short_code(code).await? {
                Some(record) => {
                    self.populate_cache(code, &record.original_url).await;
                    record.original_url
                }
                None => {
                    debug!(code = %code, "Short code not found");
                    return Ok(None);
                }
            },
        };

        self.record_visit(code).await;
        Ok(Some(original_url))
    }

    async fn get_click_count(&self, code: &ShortCode) -> Result<u64> {
        let count = self
            .repository
            .find_by_short_code(code)
            .await?
            .map_or(0, |record| record.visit_count);
        Ok(count)
    }
}
