pub mod config;
pub mod db;
pub mod error;
pub mod handler;
pub mod model;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use db::EmployeeStore;

/// Shared, read-only state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EmployeeStore>,
}

impl AppState {
    pub fn new(store: impl EmployeeStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/employee", get(handler::get_all).post(handler::create))
        .route(
            "/employee/{id}",
            get(handler::get_one)
                .put(handler::update)
                .delete(handler::delete),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
