//! Filter engine: baseline discount predicate plus the user's filter set.
//!
//! Output is always an order-preserving subsequence of the input. Records
//! are borrowed, never copied or mutated.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{TransactionRecord, ALL, SOLD_BY_SYSTEM, SOLD_BY_SYSTEM_LABEL};

// ---------------------------------------------------------------------------
// Filter set
// ---------------------------------------------------------------------------

/// Inclusive calendar-day bounds on `paymentDate`. Either side may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

/// User-selected constraints. Every field is optional and absent means
/// "no constraint". Categorical fields set to `"all"` or `""` are also
/// no-ops.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// User-facing seller; "Online/System" selects the `-` sentinel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sold_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// First constraint a record failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Location,
    Category,
    Product,
    SoldBy,
    PaymentMethod,
    DiscountAmount,
    DiscountPercent,
    DateRange,
    /// A date range is active and `paymentDate` is missing or unparseable.
    UnparseableDate,
}

/// The categorical value to compare against, if the selector is active.
pub fn selection(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != ALL)
}

/// A numeric bound that constrains the view. `0` and NaN are unset, the
/// same as an absent bound.
pub fn active_bound(bound: Option<f64>) -> Option<f64> {
    bound.filter(|b| *b != 0.0 && !b.is_nan())
}

fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    active_bound(min).map_or(true, |m| value >= m) && active_bound(max).map_or(true, |m| value <= m)
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no field imposes a constraint.
    pub fn is_empty(&self) -> bool {
        selection(self.location.as_deref()).is_none()
            && selection(self.category.as_deref()).is_none()
            && selection(self.product.as_deref()).is_none()
            && selection(self.sold_by.as_deref()).is_none()
            && selection(self.payment_method.as_deref()).is_none()
            && active_bound(self.min_discount_amount).is_none()
            && active_bound(self.max_discount_amount).is_none()
            && active_bound(self.min_discount_percent).is_none()
            && active_bound(self.max_discount_percent).is_none()
            && !self.date_range.map_or(false, |r| r.is_active())
    }

    /// Stored `soldBy` value the seller selector compares against.
    pub fn sold_by_stored(&self) -> Option<&str> {
        selection(self.sold_by.as_deref()).map(|s| {
            if s == SOLD_BY_SYSTEM_LABEL {
                SOLD_BY_SYSTEM
            } else {
                s
            }
        })
    }

    /// Conjunction of every active constraint. Does not include the
    /// baseline discount predicate.
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.rejection(record).is_none()
    }

    /// The first active constraint `record` fails, or `None` if it passes.
    pub fn rejection(&self, record: &TransactionRecord) -> Option<Rejection> {
        let categorical = [
            (self.location.as_deref(), record.calculated_location.as_deref(), Rejection::Location),
            (self.category.as_deref(), record.cleaned_category.as_deref(), Rejection::Category),
            (self.product.as_deref(), record.cleaned_product.as_deref(), Rejection::Product),
            (self.payment_method.as_deref(), record.payment_method.as_deref(), Rejection::PaymentMethod),
        ];
        for (wanted, actual, rejection) in categorical {
            if let Some(wanted) = selection(wanted) {
                if actual != Some(wanted) {
                    return Some(rejection);
                }
            }
        }

        if let Some(stored) = self.sold_by_stored() {
            if record.sold_by.as_deref() != Some(stored) {
                return Some(Rejection::SoldBy);
            }
        }

        if !within(record.discount_amount(), self.min_discount_amount, self.max_discount_amount) {
            return Some(Rejection::DiscountAmount);
        }
        if !within(
            record.discount_percentage(),
            self.min_discount_percent,
            self.max_discount_percent,
        ) {
            return Some(Rejection::DiscountPercent);
        }

        if let Some(range) = self.date_range.filter(|r| r.is_active()) {
            match record.payment_day() {
                Some(day) if range.contains(day) => {}
                Some(_) => return Some(Rejection::DateRange),
                None => return Some(Rejection::UnparseableDate),
            }
        }

        None
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Baseline: only discounted transactions are part of the view.
pub fn is_discounted(record: &TransactionRecord) -> bool {
    record.discount_amount() > 0.0
}

/// Apply the baseline and `filters`, preserving input order.
pub fn filter<'a, I>(records: I, filters: &FilterSet) -> Vec<&'a TransactionRecord>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    filter_view(records, ALL, filters)
}

/// Page-level pipeline: baseline, then the global location selector, then
/// `filters`. `location` of `"all"` (or empty) selects every location.
pub fn filter_view<'a, I>(records: I, location: &str, filters: &FilterSet) -> Vec<&'a TransactionRecord>
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let location = selection(Some(location));
    let mut scanned = 0usize;
    let mut undated = 0usize;

    let kept: Vec<&TransactionRecord> = records
        .into_iter()
        .filter(|record| {
            scanned += 1;
            if !is_discounted(record) {
                return false;
            }
            if let Some(loc) = location {
                if record.calculated_location.as_deref() != Some(loc) {
                    return false;
                }
            }
            match filters.rejection(record) {
                None => true,
                Some(Rejection::UnparseableDate) => {
                    undated += 1;
                    false
                }
                Some(_) => false,
            }
        })
        .collect();

    if undated > 0 {
        log::warn!("{undated} record(s) excluded by date range: missing or unparseable paymentDate");
    }
    log::debug!("filtered discount data: {} of {} records", kept.len(), scanned);

    kept
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(discount: f64) -> TransactionRecord {
        TransactionRecord {
            discount_amount: Some(discount),
            ..Default::default()
        }
    }

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn empty_filter_keeps_discounted_only() {
        let records = vec![rec(10.0), rec(0.0), rec(20.0), TransactionRecord::default(), rec(-5.0)];
        let out = filter(&records, &FilterSet::new());
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].discount_amount, Some(10.0));
        assert_eq!(out[1].discount_amount, Some(20.0));
        assert!(FilterSet::new().is_empty());
    }

    #[test]
    fn all_sentinel_is_a_noop() {
        let filters = FilterSet {
            location: Some("all".into()),
            category: Some("all".into()),
            product: Some("".into()),
            sold_by: Some("all".into()),
            payment_method: Some("all".into()),
            ..Default::default()
        };
        assert!(filters.is_empty());
        let records = vec![rec(5.0)];
        assert_eq!(filter(&records, &filters).len(), 1);
    }

    #[test]
    fn categorical_equality() {
        let a = TransactionRecord {
            calculated_location: Some("Kemps Corner".into()),
            cleaned_category: Some("Memberships".into()),
            payment_method: Some("Card".into()),
            ..rec(10.0)
        };
        let b = TransactionRecord {
            calculated_location: Some("Bandra".into()),
            cleaned_category: Some("Memberships".into()),
            payment_method: Some("Cash".into()),
            ..rec(10.0)
        };
        let records = vec![a, b];

        let by_location = FilterSet {
            location: Some("Bandra".into()),
            ..Default::default()
        };
        let out = filter(&records, &by_location);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].calculated_location.as_deref(), Some("Bandra"));

        let by_category_and_method = FilterSet {
            category: Some("Memberships".into()),
            payment_method: Some("Card".into()),
            ..Default::default()
        };
        let out = filter(&records, &by_category_and_method);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].payment_method.as_deref(), Some("Card"));
    }

    #[test]
    fn missing_categorical_fails_active_selector() {
        let filters = FilterSet {
            product: Some("Barre 8 Pack".into()),
            ..Default::default()
        };
        assert_eq!(filters.rejection(&rec(10.0)), Some(Rejection::Product));
    }

    #[test]
    fn online_system_maps_to_sentinel() {
        let system = TransactionRecord {
            sold_by: Some("-".into()),
            ..rec(10.0)
        };
        let person = TransactionRecord {
            sold_by: Some("Priya".into()),
            ..rec(10.0)
        };
        // A stored label is not the sentinel.
        let literal = TransactionRecord {
            sold_by: Some("Online/System".into()),
            ..rec(10.0)
        };
        let records = vec![system, person, literal];

        let filters = FilterSet {
            sold_by: Some("Online/System".into()),
            ..Default::default()
        };
        let out = filter(&records, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sold_by.as_deref(), Some("-"));

        let filters = FilterSet {
            sold_by: Some("Priya".into()),
            ..Default::default()
        };
        let out = filter(&records, &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].sold_by.as_deref(), Some("Priya"));
    }

    #[test]
    fn numeric_bounds_are_inclusive() {
        let records = vec![rec(10.0), rec(20.0), rec(30.0)];
        let filters = FilterSet {
            min_discount_amount: Some(10.0),
            max_discount_amount: Some(20.0),
            ..Default::default()
        };
        let out = filter(&records, &filters);
        assert_eq!(out.len(), 2);
        assert_eq!(out[1].discount_amount, Some(20.0));
    }

    #[test]
    fn zero_bounds_impose_no_constraint() {
        let records = vec![
            TransactionRecord {
                discount_percentage: Some(12.0),
                ..rec(10.0)
            },
            TransactionRecord {
                discount_percentage: Some(25.0),
                ..rec(20.0)
            },
        ];
        let zeroed = [
            FilterSet {
                max_discount_amount: Some(0.0),
                ..Default::default()
            },
            FilterSet {
                min_discount_amount: Some(0.0),
                ..Default::default()
            },
            FilterSet {
                max_discount_percent: Some(0.0),
                ..Default::default()
            },
            FilterSet {
                min_discount_percent: Some(0.0),
                ..Default::default()
            },
        ];
        for filters in &zeroed {
            assert!(filters.is_empty(), "{filters:?}");
            assert_eq!(filter(&records, filters).len(), 2, "{filters:?}");
        }

        // A zero max next to a real min leaves the min in force.
        let min_only = FilterSet {
            min_discount_amount: Some(15.0),
            max_discount_amount: Some(0.0),
            ..Default::default()
        };
        assert!(!min_only.is_empty());
        let out = filter(&records, &min_only);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].discount_amount, Some(20.0));
    }

    #[test]
    fn missing_percentage_compares_as_zero() {
        let records = vec![
            rec(10.0),
            TransactionRecord {
                discount_percentage: Some(15.0),
                ..rec(10.0)
            },
        ];
        let at_most_five = FilterSet {
            max_discount_percent: Some(5.0),
            ..Default::default()
        };
        let out = filter(&records, &at_most_five);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].discount_percentage, None);

        let at_least_one = FilterSet {
            min_discount_percent: Some(1.0),
            ..Default::default()
        };
        assert_eq!(
            at_least_one.rejection(&records[0]),
            Some(Rejection::DiscountPercent)
        );
    }

    #[test]
    fn date_range_is_inclusive_by_day() {
        let dated = |d: &str| TransactionRecord {
            payment_date: Some(d.into()),
            ..rec(10.0)
        };
        let records = vec![
            dated("2024-01-31 23:59:00"),
            dated("2024-02-01 08:00:00"),
            dated("2024-02-29 21:30:00"),
            dated("2024-03-01"),
        ];
        let filters = FilterSet {
            date_range: Some(DateRange {
                from: Some(day("2024-02-01")),
                to: Some(day("2024-02-29")),
            }),
            ..Default::default()
        };
        let out = filter(&records, &filters);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].payment_date.as_deref(), Some("2024-02-01 08:00:00"));
        assert_eq!(out[1].payment_date.as_deref(), Some("2024-02-29 21:30:00"));
    }

    #[test]
    fn open_ended_date_range() {
        let dated = |d: &str| TransactionRecord {
            payment_date: Some(d.into()),
            ..rec(10.0)
        };
        let records = vec![dated("2023-12-31"), dated("2024-01-01")];
        let from_only = FilterSet {
            date_range: Some(DateRange {
                from: Some(day("2024-01-01")),
                to: None,
            }),
            ..Default::default()
        };
        assert_eq!(filter(&records, &from_only).len(), 1);

        let to_only = FilterSet {
            date_range: Some(DateRange {
                from: None,
                to: Some(day("2023-12-31")),
            }),
            ..Default::default()
        };
        assert_eq!(filter(&records, &to_only).len(), 1);
    }

    #[test]
    fn unparseable_date_excluded_only_when_range_active() {
        let bad = TransactionRecord {
            payment_date: Some("not a date".into()),
            ..rec(10.0)
        };
        let undated = rec(10.0);
        let records = vec![bad, undated];

        assert_eq!(filter(&records, &FilterSet::new()).len(), 2);

        // An empty range object is not an active filter.
        let inactive = FilterSet {
            date_range: Some(DateRange::default()),
            ..Default::default()
        };
        assert_eq!(filter(&records, &inactive).len(), 2);

        let active = FilterSet {
            date_range: Some(DateRange {
                from: None,
                to: Some(day("2100-01-01")),
            }),
            ..Default::default()
        };
        assert!(filter(&records, &active).is_empty());
        assert_eq!(active.rejection(&records[0]), Some(Rejection::UnparseableDate));
        assert_eq!(active.rejection(&records[1]), Some(Rejection::UnparseableDate));
    }

    #[test]
    fn global_location_applies_before_filters() {
        let at = |loc: &str, cat: &str| TransactionRecord {
            calculated_location: Some(loc.into()),
            cleaned_category: Some(cat.into()),
            ..rec(10.0)
        };
        let records = vec![at("Bandra", "Classes"), at("Kemps Corner", "Classes"), at("Bandra", "Retail")];
        let filters = FilterSet {
            category: Some("Classes".into()),
            ..Default::default()
        };
        let out = filter_view(&records, "Bandra", &filters);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].calculated_location.as_deref(), Some("Bandra"));

        assert_eq!(filter_view(&records, "all", &filters).len(), 2);

        // Selector and filter disagree: nothing qualifies.
        let conflicting = FilterSet {
            location: Some("Kemps Corner".into()),
            ..Default::default()
        };
        assert!(filter_view(&records, "Bandra", &conflicting).is_empty());
    }

    #[test]
    fn filter_does_not_touch_input() {
        let records = vec![rec(10.0), rec(0.0)];
        let before = records.clone();
        let _ = filter(&records, &FilterSet::new());
        assert_eq!(records, before);
    }

    #[test]
    fn filter_set_from_toml() {
        let filters: FilterSet = toml::from_str(
            r#"
sold_by = "Online/System"
min_discount_amount = 100
[date_range]
from = "2024-01-01"
"#,
        )
        .unwrap();
        assert_eq!(filters.sold_by_stored(), Some("-"));
        assert_eq!(filters.min_discount_amount, Some(100.0));
        assert_eq!(filters.date_range.unwrap().from, Some(day("2024-01-01")));
        assert_eq!(filters.date_range.unwrap().to, None);
    }
}
