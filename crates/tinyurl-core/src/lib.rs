//! Core types and traits for the TinyURL shortener.
//!
//! This crate provides the base-62 encoder, the short code type, and the
//! repository, cache and shortener contracts shared by the other crates.

pub mod base62;
pub mod cache;
pub mod error;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use cache::UrlCache;
pub use error::{CacheError, CoreError, ShortenerError, StorageError};
pub use repository::{ReadRepository, Repository, ShortUrlRecord};
pub use shortcode::ShortCode;
pub use shortener::Shortener;
