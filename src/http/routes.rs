use crate::http::handlers::{ops, payments, summary};
use crate::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(payments::health))
        .route("/payments", post(payments::create_payment).get(payments::get_payment))
        .route("/payments-summary", get(summary::payments_summary))
        .route("/reset", get(ops::reset))
        .route("/purge-payments", post(ops::reset))
        .route("/ops/readiness", get(ops::readiness))
        .with_state(state)
}
