pub mod health;

use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::catch_panic::CatchPanicLayer;

use crate::chat::handlers;
use crate::errors::error_body;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/chat", post(handlers::handle_chat))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
}

/// Last-resort conversion of a handler panic into the usual JSON 500.
fn panic_response(_panic: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("Request handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(error_body(
            "INTERNAL_ERROR",
            "An internal server error occurred",
            None,
        )),
    )
        .into_response()
}
