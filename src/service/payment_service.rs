use crate::domain::payment::{score_of, CreatePaymentRequest, Payment, PaymentRecord};
use crate::domain::provider::Processor;
use crate::domain::summary::{Summary, SummaryItem};
use crate::error::GatewayError;
use crate::service::admission_queue::AdmissionQueue;
use crate::service::provider_selector::ProviderSelector;
use crate::store::PaymentStore;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Entry points used by the HTTP layer.
#[derive(Clone)]
pub struct PaymentService {
    pub queue: AdmissionQueue,
    pub store: Arc<dyn PaymentStore>,
    pub selector: ProviderSelector,
}

impl PaymentService {
    /// Non-blocking admission. The caller decides how to surface `QueueFull`.
    pub fn admit(&self, req: CreatePaymentRequest) -> Result<(), GatewayError> {
        if !req.amount.is_finite() || req.amount < 0.0 {
            return Err(GatewayError::InvalidPayment(format!(
                "amount must be a non-negative number, got {}",
                req.amount
            )));
        }

        let payment = Payment::from(req);
        if !payment.has_valid_correlation_id() {
            tracing::debug!(correlation_id = %payment.correlation_id, "correlation id is not a UUID, accepting anyway");
        }

        self.queue.try_enqueue(payment).map_err(|rejected| {
            tracing::warn!(correlation_id = %rejected.0.correlation_id, "admission rejected, queue full");
            GatewayError::from(rejected)
        })
    }

    pub async fn summary(&self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Result<Summary> {
        Ok(Summary {
            default: self.summary_item(Processor::Default, from, to).await?,
            fallback: self.summary_item(Processor::Fallback, from, to).await?,
        })
    }

    pub async fn summary_item(
        &self,
        processor: Processor,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> Result<SummaryItem> {
        let ids = self
            .store
            .range_by_score(processor, from.map(score_of), to.map(score_of))
            .await?;
        if ids.is_empty() {
            return Ok(SummaryItem::default());
        }
        let amounts = self.store.batch_get_amounts(processor, &ids).await?;
        Ok(SummaryItem::from_amounts(&amounts))
    }

    pub async fn find(&self, correlation_id: &str) -> Result<Option<PaymentRecord>> {
        self.store.get_by_correlation_id(correlation_id).await
    }

    pub async fn reset(&self) -> Result<()> {
        self.store.reset().await?;
        self.selector.clear();
        tracing::info!("payment and provider state reset");
        Ok(())
    }
}
