use axum::{extract::State, http::Uri, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::startup::AppState;

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "checkout-notifier",
        "version": env!("CARGO_PKG_VERSION"),
        "sending": state.dispatcher.is_sending(),
        "delivery_enabled": state.dispatcher.sender_enabled(),
    }))
}

pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(anyhow::anyhow!("No route for {}", uri.path()))
}
