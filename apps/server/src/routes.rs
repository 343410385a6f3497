//! Router construction.

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/structured-complaints/entity/:id",
            get(handlers::get_complaint)
                .post(handlers::save_complaint)
                .delete(handlers::delete_complaint),
        )
        .route(
            "/structured-complaints/entity/:id/bundle",
            post(handlers::save_bundle),
        )
        .route("/seo", get(handlers::get_seo).post(handlers::upsert_seo))
        .route("/seo/:id", delete(handlers::delete_seo))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
