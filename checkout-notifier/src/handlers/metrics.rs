use axum::{http::StatusCode, response::IntoResponse};
use service_core::error::AppError;

use crate::services::get_metrics;

pub async fn metrics_endpoint() -> Result<impl IntoResponse, AppError> {
    let body = get_metrics().ok_or(AppError::ServiceUnavailable)?;
    Ok((
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        body,
    ))
}
