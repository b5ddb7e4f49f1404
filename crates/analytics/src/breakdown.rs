//! Grouped totals of a filtered subset.
//!
//! Charts, top/bottom lists and the period tables are all views over
//! these groups.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distinct::{DistinctCounter, KeyPolicy};
use crate::drilldown::{build_drill_down_with, DrillDownKind, DrillDownSummary};
use crate::model::TransactionRecord;

/// Group key for records with no value for the dimension.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Location,
    Category,
    Product,
    /// Grouped by display label, so the sentinel shows as "Online/System".
    SoldBy,
    PaymentMethod,
    /// `YYYY-MM` of the payment date.
    Month,
    /// `YYYY` of the payment date.
    Year,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::Location,
        Dimension::Category,
        Dimension::Product,
        Dimension::SoldBy,
        Dimension::PaymentMethod,
        Dimension::Month,
        Dimension::Year,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Category => "category",
            Self::Product => "product",
            Self::SoldBy => "sold_by",
            Self::PaymentMethod => "payment_method",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Group key of `record` along this dimension.
    pub fn key(&self, record: &TransactionRecord) -> String {
        let value = match self {
            Self::Location => record.calculated_location.clone(),
            Self::Category => record.cleaned_category.clone(),
            Self::Product => record.cleaned_product.clone(),
            Self::SoldBy => record.sold_by_label().map(String::from),
            Self::PaymentMethod => record.payment_method.clone(),
            Self::Month => record.payment_day().map(|d| d.format("%Y-%m").to_string()),
            Self::Year => record.payment_day().map(|d| d.format("%Y").to_string()),
        };
        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }

    /// Drill-down kind a selection along this dimension opens with.
    pub fn drill_kind(&self) -> DrillDownKind {
        match self {
            Self::Location => DrillDownKind::Location,
            Self::Category => DrillDownKind::Category,
            Self::Product => DrillDownKind::Product,
            Self::SoldBy => DrillDownKind::SoldBy,
            Self::PaymentMethod => DrillDownKind::PaymentMethod,
            Self::Month | Self::Year => DrillDownKind::Metric,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dimension {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "location" => Ok(Self::Location),
            "category" => Ok(Self::Category),
            "product" => Ok(Self::Product),
            "sold_by" | "soldBy" | "seller" => Ok(Self::SoldBy),
            "payment_method" | "paymentMethod" => Ok(Self::PaymentMethod),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(format!(
                "unknown dimension '{other}' (expected location, category, product, sold_by, payment_method, month or year)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupTotal<'a> {
    pub key: String,
    pub transactions: usize,
    pub total_discount: f64,
    pub total_revenue: f64,
    pub unique_customers: usize,
    pub avg_discount_percent: f64,
    #[serde(skip)]
    pub records: Vec<&'a TransactionRecord>,
}

impl<'a> GroupTotal<'a> {
    /// Drill-down payload for this group, labelled with its key.
    pub fn drill_down(&self, customers: KeyPolicy) -> DrillDownSummary<'a> {
        build_drill_down_with(self.records.iter().copied(), &self.key, customers)
    }
}

/// Group `records` by `dimension`, sorted by key.
pub fn group_by<'a, I>(records: I, dimension: Dimension, customers: KeyPolicy) -> Vec<GroupTotal<'a>>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut groups: BTreeMap<String, Vec<&'a TransactionRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(dimension.key(record)).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let mut keys = DistinctCounter::new(customers);
            let mut total_discount = 0.0;
            let mut total_revenue = 0.0;
            let mut percent_sum = 0.0;
            for &record in &members {
                total_discount += record.discount_amount();
                total_revenue += record.payment_value();
                percent_sum += record.discount_percentage();
                keys.insert(record.customer_email.as_deref());
            }
            GroupTotal {
                key,
                transactions: members.len(),
                total_discount,
                total_revenue,
                unique_customers: keys.len(),
                avg_discount_percent: percent_sum / members.len() as f64,
                records: members,
            }
        })
        .collect()
}

/// Find one group by key.
pub fn find_group<'g, 'a>(groups: &'g [GroupTotal<'a>], key: &str) -> Option<&'g GroupTotal<'a>> {
    groups.iter().find(|g| g.key == key)
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    #[default]
    TotalDiscount,
    Transactions,
    TotalRevenue,
    UniqueCustomers,
}

impl RankBy {
    fn value(&self, group: &GroupTotal<'_>) -> f64 {
        match self {
            Self::TotalDiscount => group.total_discount,
            Self::Transactions => group.transactions as f64,
            Self::TotalRevenue => group.total_revenue,
            Self::UniqueCustomers => group.unique_customers as f64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Top,
    Bottom,
}

/// The `n` highest (or lowest) groups by `by`. Ties break by key.
pub fn rank<'g, 'a>(
    groups: &'g [GroupTotal<'a>],
    by: RankBy,
    order: Order,
    n: usize,
) -> Vec<&'g GroupTotal<'a>> {
    let mut ranked: Vec<&GroupTotal> = groups.iter().collect();
    ranked.sort_by(|a, b| {
        let cmp = by.value(a).total_cmp(&by.value(b));
        let cmp = match order {
            Order::Top => cmp.reverse(),
            Order::Bottom => cmp,
        };
        match cmp {
            Ordering::Equal => a.key.cmp(&b.key),
            other => other,
        }
    });
    ranked.truncate(n);
    ranked
}
