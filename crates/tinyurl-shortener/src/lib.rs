//! URL shortener service implementation.
//!
//! This crate wires a [`Repository`](tinyurl_core::Repository) and a
//! [`UrlCache`](tinyurl_core::UrlCache) into the
//! [`Shortener`](tinyurl_core::Shortener) contract. Core types are
//! re-exported from `tinyurl_core`.

pub mod service;
pub mod settings;

pub use service::ShortenerService;
pub use settings::{ShortenerSettings, VisitRecording};
pub use tinyurl_core::{Shortener, ShortenerError};
