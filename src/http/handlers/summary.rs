use crate::domain::payment::ErrorEnvelope;
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

pub async fn payments_summary(State(state): State<AppState>, Query(query): Query<SummaryQuery>) -> impl IntoResponse {
    let (from, to) = match (parse_bound(query.from.as_deref()), parse_bound(query.to.as_deref())) {
        (Ok(from), Ok(to)) => (from, to),
        (Err(bad), _) | (_, Err(bad)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorEnvelope::new("INVALID_WINDOW", format!("'{}' is not an RFC3339 timestamp", bad))),
            )
                .into_response();
        }
    };

    match state.payment_service.summary(from, to).await {
        Ok(summary) => (StatusCode::OK, Json(summary)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "summary query failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::new("INTERNAL_ERROR", e.to_string())),
            )
                .into_response()
        }
    }
}

fn parse_bound(v: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match v.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|_| s.to_string()),
    }
}
