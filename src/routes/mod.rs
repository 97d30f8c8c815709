//! HTTP routing.

pub mod api;

pub use api::{cors_layer, create_api_router};
