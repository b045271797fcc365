use std::time::Duration;
use typed_builder::TypedBuilder;

/// TTL applied to cache entries written by the service.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Attempts made by `create_short_url` before giving up on a contended URL.
pub const DEFAULT_MAX_CREATE_ATTEMPTS: u32 = 3;

/// How a successful lookup records its visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitRecording {
    /// Spawn the increment on the runtime and return immediately.
    #[default]
    Detached,
    /// Await the increment before returning. Failures are still swallowed.
    Inline,
}

/// Tunables for [`ShortenerService`](crate::ShortenerService).
#[derive(Debug, Clone, TypedBuilder)]
pub struct ShortenerSettings {
    #[builder(default = DEFAULT_CACHE_TTL)]
    pub cache_ttl: Duration,
    #[builder(default)]
    pub visit_recording: VisitRecording,
    #[builder(default = DEFAULT_MAX_CREATE_ATTEMPTS)]
    pub max_create_attempts: u32,
}

impl Default for ShortenerSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = ShortenerSettings::default();
        assert_eq!(settings.cache_ttl, Duration::from_secs(86_400));
        assert_eq!(settings.visit_recording, VisitRecording::Detached);
        assert_eq!(settings.max_create_attempts, 3);
    }

    #[test]
    fn builder_overrides() {
        let settings = ShortenerSettings::builder()
            .cache_ttl(Duration::from_secs(60))
            .visit_recording(VisitRecording::Inline)
            .max_create_attempts(5)
            .build();
        assert_eq!(settings.cache_ttl, Duration::from_secs(60));
        assert_eq!(settings.visit_recording, VisitRecording::Inline);
        assert_eq!(settings.max_create_attempts, 5);
    }
}
