use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryItem {
    pub total_requests: u64,
    pub total_amount: f64,
}

impl SummaryItem {
    /// Missing amounts (ids in the timeline without a stored value) are skipped.
    pub fn from_amounts(amounts: &[Option<f64>]) -> Self {
        amounts.iter().flatten().fold(Self::default(), |mut acc, amount| {
            acc.total_requests += 1;
            acc.total_amount += amount;
            acc
        })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub default: SummaryItem,
    pub fallback: SummaryItem,
}
