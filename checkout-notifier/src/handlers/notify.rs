use axum::{body::Bytes, extract::State, http::StatusCode, Json};

use crate::models::{NotificationResult, NotificationStatus, OrderPayload};
use crate::services::{build_message, message::format_total, record_notification};
use crate::startup::AppState;

/// `POST /notify`: relay a checkout to the shop's messaging recipient.
///
/// The body is read as JSON whatever its content type; anything unreadable
/// is an empty order. Only a failed send produces an error response.
#[tracing::instrument(skip(state, body), fields(body_len = body.len()))]
pub async fn notify(
    State(state): State<AppState>,
    body: Bytes,
) -> (StatusCode, Json<NotificationResult>) {
    let order = OrderPayload::from_body(&body);

    tracing::info!(
        customer = %order.customer_name(),
        total = %format_total(order.total()),
        recipient = %state.dispatcher.recipient(),
        items = order.items().len(),
        "Order received"
    );

    let message = build_message(&order);
    tracing::debug!(message = %message, "Message to send");

    match state.dispatcher.dispatch(message).await {
        Ok(response) => {
            record_notification(&NotificationStatus::Ok.to_string());
            tracing::info!(
                provider_id = ?response.provider_id,
                "Message sent successfully"
            );
            (StatusCode::OK, Json(NotificationResult::ok()))
        }
        Err(e) => {
            let detail = e.to_string();
            record_notification(&NotificationStatus::Error.to_string());
            tracing::error!(error = %detail, "Failed to send message");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(NotificationResult::error(detail)),
            )
        }
    }
}

/// `OPTIONS /notify`: CORS headers are added by middleware.
pub async fn notify_preflight() -> StatusCode {
    StatusCode::OK
}
