//! HTTP surface of the TinyURL shortener.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;
pub mod validate;

pub use app::App;
pub use state::AppState;
