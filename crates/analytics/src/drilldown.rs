//! Drill-down payloads for a selected sub-collection.

use serde::{Deserialize, Serialize};

use crate::distinct::{DistinctCounter, KeyPolicy};
use crate::model::TransactionRecord;

/// Summary of a chart segment, table row or metric card selection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillDownSummary<'a> {
    pub name: String,
    /// Sum of `paymentValue`.
    pub total_value: f64,
    pub total_transactions: usize,
    /// Distinct `customerEmail` values.
    pub total_customers: usize,
    pub raw_data: Vec<&'a TransactionRecord>,
    /// Sum of `discountAmount`.
    pub metric_value: f64,
}

/// What kind of selection opened the drill-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DrillDownKind {
    #[default]
    #[serde(rename = "metric")]
    Metric,
    #[serde(rename = "product")]
    Product,
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "member")]
    Member,
    #[serde(rename = "soldBy")]
    SoldBy,
    #[serde(rename = "paymentMethod")]
    PaymentMethod,
    #[serde(rename = "client-conversion")]
    ClientConversion,
    #[serde(rename = "trainer")]
    Trainer,
    #[serde(rename = "location")]
    Location,
}

/// Build a drill-down summary with exact customer keys.
pub fn build_drill_down<'a, I>(records: I, label: &str) -> DrillDownSummary<'a>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    build_drill_down_with(records, label, KeyPolicy::Exact)
}

pub fn build_drill_down_with<'a, I>(records: I, label: &str, customers: KeyPolicy) -> DrillDownSummary<'a>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let raw_data: Vec<&TransactionRecord> = records.into_iter().collect();
    let mut keys = DistinctCounter::new(customers);
    let mut total_value = 0.0;
    let mut metric_value = 0.0;

    for &record in &raw_data {
        total_value += record.payment_value();
        metric_value += record.discount_amount();
        keys.insert(record.customer_email.as_deref());
    }

    DrillDownSummary {
        name: label.to_string(),
        total_value,
        total_transactions: raw_data.len(),
        total_customers: keys.len(),
        raw_data,
        metric_value,
    }
}

// ---------------------------------------------------------------------------
// Selection state
// ---------------------------------------------------------------------------

/// Drill-down selection: closed, or open with exactly one payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum DrillDownState<'a> {
    #[default]
    Closed,
    Open {
        kind: DrillDownKind,
        summary: DrillDownSummary<'a>,
    },
}

impl<'a> DrillDownState<'a> {
    /// Open with `summary`, replacing any payload already shown.
    pub fn open(&mut self, kind: DrillDownKind, summary: DrillDownSummary<'a>) {
        *self = Self::Open { kind, summary };
    }

    /// Summarize `records` under `label` and open it.
    pub fn select<I>(&mut self, label: &str, records: I, kind: DrillDownKind)
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        self.open(kind, build_drill_down(records, label));
    }

    /// Close and drop the payload.
    pub fn close(&mut self) {
        *self = Self::Closed;
    }

    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open { .. })
    }

    pub fn kind(&self) -> Option<DrillDownKind> {
        match self {
            Self::Open { kind, .. } => Some(*kind),
            Self::Closed => None,
        }
    }

    pub fn summary(&self) -> Option<&DrillDownSummary<'a>> {
        match self {
            Self::Open { summary, .. } => Some(summary),
            Self::Closed => None,
        }
    }
}
