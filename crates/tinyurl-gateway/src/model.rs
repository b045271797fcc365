mod health;
mod url;

pub use health::HealthResponse;
pub use url::{AnalyticsResponse, ErrorResponse, ShortenRequest, ShortenResponse};
