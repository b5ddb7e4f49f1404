use serde::{Deserialize, Serialize};

use crate::breakdown::{Dimension, RankBy};
use crate::distinct::KeyPolicy;
use crate::error::AnalyticsError;
use crate::filter::{active_bound, FilterSet};
use crate::model::ALL;

// ---------------------------------------------------------------------------
// View config
// ---------------------------------------------------------------------------

/// One dashboard view: global location selector, filter set and output
/// shaping. Every key is optional in TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Global location selector, applied before `filters`.
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default)]
    pub filters: FilterSet,
    /// Identity comparison for customer/member distinct counts.
    #[serde(default)]
    pub customer_key: KeyPolicy,
    /// Length of each top/bottom list.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    #[serde(default)]
    pub rank_by: RankBy,
    #[serde(default = "default_breakdowns")]
    pub breakdowns: Vec<Dimension>,
}

fn default_name() -> String {
    "Discounts & Promotions".into()
}

fn default_location() -> String {
    ALL.into()
}

fn default_top_n() -> usize {
    5
}

fn default_breakdowns() -> Vec<Dimension> {
    vec![
        Dimension::Location,
        Dimension::Category,
        Dimension::Product,
        Dimension::SoldBy,
        Dimension::PaymentMethod,
        Dimension::Month,
    ]
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            location: default_location(),
            filters: FilterSet::default(),
            customer_key: KeyPolicy::default(),
            top_n: default_top_n(),
            rank_by: RankBy::default(),
            breakdowns: default_breakdowns(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ViewConfig {
    pub fn from_toml(input: &str) -> Result<Self, AnalyticsError> {
        let config: ViewConfig =
            toml::from_str(input).map_err(|e| AnalyticsError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AnalyticsError> {
        let f = &self.filters;

        check_bounds("discount_amount", f.min_discount_amount, f.max_discount_amount)?;
        check_bounds("discount_percent", f.min_discount_percent, f.max_discount_percent)?;

        if let Some(range) = f.date_range {
            if let (Some(from), Some(to)) = (range.from, range.to) {
                if from > to {
                    return Err(AnalyticsError::ConfigValidation(format!(
                        "date_range.from ({from}) is after date_range.to ({to})"
                    )));
                }
            }
        }

        if self.top_n == 0 {
            return Err(AnalyticsError::ConfigValidation("top_n must be at least 1".into()));
        }

        for (i, dim) in self.breakdowns.iter().enumerate() {
            if self.breakdowns[..i].contains(dim) {
                return Err(AnalyticsError::ConfigValidation(format!(
                    "breakdown '{dim}' listed more than once"
                )));
            }
        }

        Ok(())
    }
}

fn check_bounds(name: &str, min: Option<f64>, max: Option<f64>) -> Result<(), AnalyticsError> {
    for (side, value) in [("min", min), ("max", max)] {
        if let Some(v) = value {
            if !v.is_finite() || v < 0.0 {
                return Err(AnalyticsError::ConfigValidation(format!(
                    "{side}_{name} must be a non-negative number, got {v}"
                )));
            }
        }
    }
    if let (Some(lo), Some(hi)) = (active_bound(min), active_bound(max)) {
        if lo > hi {
            return Err(AnalyticsError::ConfigValidation(format!(
                "min_{name} ({lo}) is greater than max_{name} ({hi})"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
