use crate::domain::payment::{CreatePaymentRequest, ErrorEnvelope};
use crate::error::GatewayError;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

pub async fn create_payment(State(state): State<AppState>, Json(req): Json<CreatePaymentRequest>) -> impl IntoResponse {
    match state.payment_service.admit(req) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(GatewayError::QueueFull) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorEnvelope::new("QUEUE_FULL", "admission queue is full, retry later")),
        )
            .into_response(),
        Err(GatewayError::InvalidPayment(message)) => {
            (StatusCode::BAD_REQUEST, Json(ErrorEnvelope::new("INVALID_PAYMENT", message))).into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::new("INTERNAL_ERROR", e.to_string())),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct PaymentLookup {
    pub correlation_id: Option<String>,
}

pub async fn get_payment(State(state): State<AppState>, Query(query): Query<PaymentLookup>) -> impl IntoResponse {
    let Some(correlation_id) = query.correlation_id.filter(|id| !id.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorEnvelope::new("MISSING_CORRELATION_ID", "correlation_id is required")),
        )
            .into_response();
    };

    match state.payment_service.find(&correlation_id).await {
        Ok(Some(record)) => (StatusCode::OK, Json(record)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorEnvelope::new("PAYMENT_NOT_FOUND", format!("no payment {}", correlation_id))),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, correlation_id = %correlation_id, "payment lookup failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::new("INTERNAL_ERROR", e.to_string())),
            )
                .into_response()
        }
    }
}

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}
