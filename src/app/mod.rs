//! The random string application: the inner handler behind every envelope.
//!
//! - `GET /json`: JSON, always
//! - `GET /`: HTML for browsers, JSON for CLI user agents

pub mod agent;
pub mod page;
pub mod strings;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::generator::Generator;

#[derive(Debug, Clone)]
pub struct AppState {
    pub generator: Arc<Generator>,
}

/// Build the application router.
pub fn router(generator: Generator) -> Router {
    let state = AppState {
        generator: Arc::new(generator),
    };
    Router::new()
        .route("/json", get(strings::generate_strings))
        .route("/", get(strings::generate_strings))
        .with_state(state)
}
