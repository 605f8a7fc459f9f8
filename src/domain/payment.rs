use crate::domain::provider::Processor;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    pub correlation_id: String,
    pub amount: f64,
}

/// A payment travelling through the admission queue and dispatch workers.
///
/// `processor` and `requested_at` stay empty until a worker stamps the payment
/// for an upstream attempt; every retry re-stamps it.
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub correlation_id: String,
    pub amount: f64,
    pub processor: Option<Processor>,
    pub requested_at: Option<DateTime<Utc>>,
    pub attempts: u32,
}

impl Payment {
    pub fn new(correlation_id: impl Into<String>, amount: f64) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            amount,
            processor: None,
            requested_at: None,
            attempts: 0,
        }
    }

    pub fn has_valid_correlation_id(&self) -> bool {
        Uuid::parse_str(&self.correlation_id).is_ok()
    }

    pub fn stamp(&mut self, processor: Processor, now: DateTime<Utc>) -> PaymentRecord {
        self.processor = Some(processor);
        self.requested_at = Some(now);
        self.attempts += 1;
        PaymentRecord {
            correlation_id: self.correlation_id.clone(),
            amount: self.amount,
            processor,
            requested_at: now,
        }
    }
}

impl From<CreatePaymentRequest> for Payment {
    fn from(req: CreatePaymentRequest) -> Self {
        Payment::new(req.correlation_id, req.amount)
    }
}

/// Body of `POST {processor}/payments`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorPaymentRequest {
    pub correlation_id: String,
    pub amount: f64,
    pub requested_at: DateTime<Utc>,
}

impl From<&PaymentRecord> for ProcessorPaymentRequest {
    fn from(r: &PaymentRecord) -> Self {
        Self {
            correlation_id: r.correlation_id.clone(),
            amount: r.amount,
            requested_at: r.requested_at,
        }
    }
}

/// What gets persisted once a provider has accepted the payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub correlation_id: String,
    pub amount: f64,
    pub processor: Processor,
    pub requested_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn score(&self) -> i64 {
        score_of(self.requested_at)
    }
}

/// Nanoseconds since the epoch, saturating at the ends of the `i64` range.
pub fn score_of(at: DateTime<Utc>) -> i64 {
    at.timestamp_nanos_opt()
        .unwrap_or(if at.timestamp() < 0 { i64::MIN } else { i64::MAX })
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorPayload,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorEnvelope {
    pub fn new(code: &str, message: impl Into<String>) -> Self {
        Self {
            error: ErrorPayload {
                code: code.to_string(),
                message: message.into(),
                details: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stamping_assigns_processor_and_time() {
        let mut p = Payment::new("4a7901b8-7d26-4d9d-aa19-4dc1c7cf60b3", 19.9);
        assert!(p.processor.is_none());

        let now = Utc.timestamp_opt(1_700_000_000, 5).single().unwrap();
        let record = p.stamp(Processor::Fallback, now);

        assert_eq!(p.processor, Some(Processor::Fallback));
        assert_eq!(p.requested_at, Some(now));
        assert_eq!(p.attempts, 1);
        assert_eq!(record.score(), 1_700_000_000_000_000_005);
    }

    #[test]
    fn upstream_body_uses_rfc3339_and_camel_case() {
        let at = Utc.timestamp_opt(1_752_000_000, 123_456_789).single().unwrap();
        let body = ProcessorPaymentRequest {
            correlation_id: "abc".to_string(),
            amount: 10.5,
            requested_at: at,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["correlationId"], "abc");
        assert_eq!(json["requestedAt"], "2025-07-08T18:40:00.123456789Z");
    }

    #[test]
    fn out_of_range_scores_saturate_by_sign() {
        let early = Utc.with_ymd_and_hms(1600, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2300, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(score_of(early), i64::MIN);
        assert_eq!(score_of(late), i64::MAX);
    }

    #[test]
    fn invalid_correlation_ids_are_detected_not_rejected() {
        let p = Payment::new("not-a-uuid", 1.0);
        assert!(!p.has_valid_correlation_id());
    }
}
