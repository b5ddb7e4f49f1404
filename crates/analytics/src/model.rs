use std::fmt;

use chrono::NaiveDate;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};

use crate::dates::parse_payment_date;

/// Stored `soldBy` value for sales with no attributed seller.
pub const SOLD_BY_SYSTEM: &str = "-";

/// User-facing label for [`SOLD_BY_SYSTEM`].
pub const SOLD_BY_SYSTEM_LABEL: &str = "Online/System";

/// Categorical selector value meaning "no constraint".
pub const ALL: &str = "all";

// ---------------------------------------------------------------------------
// Transaction record
// ---------------------------------------------------------------------------

/// One row of sales/discount data as delivered by the data source.
///
/// Every field is optional. Numeric fields accept JSON numbers, numeric
/// strings, empty strings and `null`; the last two are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculated_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cleaned_product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub payment_value: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub mrp_post_tax: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub mrp_pre_tax: Option<f64>,
}

impl TransactionRecord {
    /// Discount amount, `0` when absent.
    pub fn discount_amount(&self) -> f64 {
        self.discount_amount.unwrap_or(0.0)
    }

    /// Discount percentage, `0` when absent.
    pub fn discount_percentage(&self) -> f64 {
        self.discount_percentage.unwrap_or(0.0)
    }

    /// Amount actually paid, `0` when absent.
    pub fn payment_value(&self) -> f64 {
        self.payment_value.unwrap_or(0.0)
    }

    /// List price: post-tax MRP, then pre-tax MRP, then `0`.
    ///
    /// Feeds `totalMRP` and `revenueImpact`. Not interchangeable with
    /// [`list_price_or_paid`](Self::list_price_or_paid).
    pub fn list_price(&self) -> f64 {
        known_price(self.mrp_post_tax)
            .or_else(|| known_price(self.mrp_pre_tax))
            .unwrap_or(0.0)
    }

    /// List price falling back to the paid amount: post-tax MRP, then
    /// pre-tax MRP, then `paymentValue`, then `0`.
    ///
    /// Feeds `totalRevenueLost`. A record with no known MRP contributes
    /// zero lost revenue here, but its full payment to `revenueImpact`.
    pub fn list_price_or_paid(&self) -> f64 {
        known_price(self.mrp_post_tax)
            .or_else(|| known_price(self.mrp_pre_tax))
            .or_else(|| known_price(self.payment_value))
            .unwrap_or(0.0)
    }

    /// Seller as shown to users; the system sentinel becomes "Online/System".
    pub fn sold_by_label(&self) -> Option<&str> {
        self.sold_by.as_deref().map(|s| {
            if s == SOLD_BY_SYSTEM {
                SOLD_BY_SYSTEM_LABEL
            } else {
                s
            }
        })
    }

    /// Calendar day of the payment, `None` when missing or unparseable.
    pub fn payment_day(&self) -> Option<NaiveDate> {
        self.payment_date.as_deref().and_then(parse_payment_date)
    }
}

// A zero price counts as unknown and falls through to the next candidate.
fn known_price(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

// ---------------------------------------------------------------------------
// Numeric field decoding
// ---------------------------------------------------------------------------

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(NumberVisitor)
}

struct NumberVisitor;

impl<'de> Visitor<'de> for NumberVisitor {
    type Value = Option<f64>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a number, a numeric string, or nothing")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if v.is_finite() {
            Ok(Some(v))
        } else {
            Err(E::custom(format!("non-finite number {v}")))
        }
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Some(v as f64))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        match trimmed.parse::<f64>() {
            Ok(n) if n.is_finite() => Ok(Some(n)),
            _ => Err(E::custom(format!("cannot parse number '{v}'"))),
        }
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_any(self)
    }
}
