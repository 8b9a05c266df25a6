pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/createticket",
            post(handlers::tickets::create_ticket).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/ticket", get(handlers::tickets::list_tickets))
        .route("/availability", get(handlers::availability::get_availability))
        .route("/updateticket/:id", put(handlers::admin::update_ticket))
        .route("/Adminregister", post(handlers::admin::register))
        .route("/Adminlogin", post(handlers::admin::login))
        .with_state(state)
}
