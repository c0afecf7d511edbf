use std::sync::Arc;

use axum::Router;

use crate::config::Config;

mod advisory;
mod health;
mod readings;

pub use readings::latest_per_entity;

// ---

pub fn router(config: Arc<Config>) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(advisory::router())
        .merge(health::router())
        .with_state(config)
}
