//! HTTP request handlers.

pub mod models;
pub mod speech;

pub use models::{health_check, list_models};
pub use speech::synthesize_speech;
