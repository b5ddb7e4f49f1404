//! Metric aggregation over a filtered subset.
//!
//! Two formula sets exist for overlapping numbers. [`CardMetrics`] derives
//! `revenueImpact` from [`TransactionRecord::list_price`];
//! [`HeroMetrics`] derives `totalRevenueLost` from
//! [`TransactionRecord::list_price_or_paid`]. They disagree whenever a
//! record has no MRP and must stay separate.

use serde::Serialize;

use crate::distinct::{DistinctCounter, KeyPolicy};
use crate::model::TransactionRecord;

/// Metric-card aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardMetrics {
    pub total_discounts: f64,
    pub total_transactions: usize,
    pub total_revenue: f64,
    #[serde(rename = "totalMRP")]
    pub total_mrp: f64,
    pub avg_discount_percent: f64,
    pub unique_customers: usize,
    pub unique_products: usize,
    pub max_discount: f64,
    /// `totalDiscounts / totalMRP * 100`, `0` without any MRP.
    pub discount_rate: f64,
    /// `totalMRP - totalRevenue`.
    pub revenue_impact: f64,
}

/// Top-of-page aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroMetrics {
    pub total_discount_value: f64,
    pub discounted_transactions: usize,
    pub avg_discount_percentage: f64,
    pub unique_members: usize,
    /// One unit per transaction row.
    pub units_sold: usize,
    pub total_revenue_lost: f64,
}

fn mean(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Card metrics with exact customer keys.
pub fn card_metrics<'a, I>(records: I) -> CardMetrics
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    card_metrics_with(records, KeyPolicy::Exact)
}

/// Card metrics in one pass. `customers` applies to `uniqueCustomers`
/// only; products are always counted exactly.
pub fn card_metrics_with<'a, I>(records: I, customers: KeyPolicy) -> CardMetrics
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut m = CardMetrics::default();
    let mut percent_sum = 0.0;
    let mut customer_keys = DistinctCounter::new(customers);
    let mut product_keys = DistinctCounter::new(KeyPolicy::Exact);

    for record in records {
        let discount = record.discount_amount();
        m.total_discounts += discount;
        m.total_transactions += 1;
        m.total_revenue += record.payment_value();
        m.total_mrp += record.list_price();
        percent_sum += record.discount_percentage();
        m.max_discount = m.max_discount.max(discount);
        customer_keys.insert(record.customer_email.as_deref());
        product_keys.insert(record.cleaned_product.as_deref());
    }

    m.avg_discount_percent = mean(percent_sum, m.total_transactions);
    m.unique_customers = customer_keys.len();
    m.unique_products = product_keys.len();
    m.discount_rate = if m.total_mrp > 0.0 {
        m.total_discounts / m.total_mrp * 100.0
    } else {
        0.0
    };
    m.revenue_impact = m.total_mrp - m.total_revenue;
    m
}

/// Hero metrics with exact member keys.
pub fn hero_metrics<'a, I>(records: I) -> HeroMetrics
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    hero_metrics_with(records, KeyPolicy::Exact)
}

/// Hero metrics in one pass.
pub fn hero_metrics_with<'a, I>(records: I, members: KeyPolicy) -> HeroMetrics
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut m = HeroMetrics::default();
    let mut percent_sum = 0.0;
    let mut member_keys = DistinctCounter::new(members);

    for record in records {
        m.total_discount_value += record.discount_amount();
        m.discounted_transactions += 1;
        percent_sum += record.discount_percentage();
        m.total_revenue_lost += record.list_price_or_paid() - record.payment_value();
        member_keys.insert(record.customer_email.as_deref());
    }

    m.units_sold = m.discounted_transactions;
    m.avg_discount_percentage = mean(percent_sum, m.discounted_transactions);
    m.unique_members = member_keys.len();
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{filter, FilterSet};

    fn rec(discount: f64, paid: Option<f64>) -> TransactionRecord {
        TransactionRecord {
            discount_amount: Some(discount),
            payment_value: paid,
            ..Default::default()
        }
    }

    #[test]
    fn empty_input_is_all_zero() {
        let none: Vec<TransactionRecord> = vec![];
        assert_eq!(card_metrics(&none), CardMetrics::default());
        assert_eq!(hero_metrics(&none), HeroMetrics::default());

        let m = card_metrics(&none);
        assert_eq!(m.avg_discount_percent, 0.0);
        assert_eq!(m.discount_rate, 0.0);
        assert_eq!(m.max_discount, 0.0);
        assert_eq!(m.unique_customers, 0);
    }

    #[test]
    fn baseline_drops_undiscounted_before_summing() {
        let records = vec![rec(10.0, Some(90.0)), rec(0.0, Some(55.0)), rec(20.0, Some(180.0))];
        let filtered = filter(&records, &FilterSet::new());
        assert_eq!(filtered.len(), 2);

        let m = card_metrics(filtered.iter().copied());
        assert_eq!(m.total_discounts, 30.0);
        assert_eq!(m.total_transactions, 2);
        assert_eq!(m.total_revenue, 270.0);
        assert_eq!(m.max_discount, 20.0);
    }

    #[test]
    fn mrp_precedence_and_revenue_impact() {
        let records = vec![
            TransactionRecord {
                mrp_post_tax: Some(100.0),
                payment_value: Some(80.0),
                discount_amount: Some(20.0),
                ..Default::default()
            },
            TransactionRecord {
                mrp_pre_tax: Some(50.0),
                payment_value: Some(40.0),
                discount_amount: Some(10.0),
                ..Default::default()
            },
        ];
        let m = card_metrics(&records);
        assert_eq!(m.total_mrp, 150.0);
        assert_eq!(m.total_revenue, 120.0);
        assert_eq!(m.revenue_impact, 30.0);
        assert_eq!(m.discount_rate, 20.0);
    }

    #[test]
    fn averages_and_distinct_counts() {
        let records = vec![
            TransactionRecord {
                customer_email: Some("a@x.com".into()),
                cleaned_product: Some("Barre 8 Pack".into()),
                discount_percentage: Some(10.0),
                ..rec(5.0, None)
            },
            TransactionRecord {
                customer_email: Some("a@x.com".into()),
                cleaned_product: Some("Cycle Single".into()),
                discount_percentage: Some(30.0),
                ..rec(5.0, None)
            },
            TransactionRecord {
                customer_email: Some("b@x.com".into()),
                cleaned_product: Some("Cycle Single".into()),
                ..rec(5.0, None)
            },
        ];
        let m = card_metrics(&records);
        assert_eq!(m.avg_discount_percent, 40.0 / 3.0);
        assert_eq!(m.unique_customers, 2);
        assert_eq!(m.unique_products, 2);

        let h = hero_metrics(&records);
        assert_eq!(h.avg_discount_percentage, 40.0 / 3.0);
        assert_eq!(h.unique_members, 2);
        assert_eq!(h.units_sold, 3);
        assert_eq!(h.discounted_transactions, 3);
    }

    #[test]
    fn absent_email_counts_as_one_customer() {
        let with_email = |e: Option<&str>| TransactionRecord {
            customer_email: e.map(String::from),
            ..rec(5.0, None)
        };
        let records = vec![
            with_email(Some("a@x.com")),
            with_email(None),
            with_email(None),
            with_email(Some("b@x.com")),
        ];
        assert_eq!(card_metrics(&records).unique_customers, 3);
        assert_eq!(hero_metrics(&records).unique_members, 3);
    }

    #[test]
    fn email_case_policy() {
        let with_email = |e: &str| TransactionRecord {
            customer_email: Some(e.into()),
            ..rec(5.0, None)
        };
        let records = vec![with_email("Ana@X.com"), with_email("ana@x.com")];
        assert_eq!(card_metrics(&records).unique_customers, 2);
        assert_eq!(
            card_metrics_with(&records, KeyPolicy::CaseInsensitive).unique_customers,
            1
        );
        assert_eq!(
            hero_metrics_with(&records, KeyPolicy::CaseInsensitive).unique_members,
            1
        );
    }

    #[test]
    fn revenue_lost_and_revenue_impact_diverge_without_mrp() {
        let records = vec![
            TransactionRecord {
                mrp_post_tax: Some(100.0),
                ..rec(20.0, Some(80.0))
            },
            // No MRP: hero falls back to the paid amount, cards to zero.
            rec(10.0, Some(40.0)),
        ];
        let cards = card_metrics(&records);
        let hero = hero_metrics(&records);

        assert_eq!(cards.revenue_impact, 100.0 - 120.0);
        assert_eq!(hero.total_revenue_lost, 20.0);
        assert_ne!(cards.revenue_impact, hero.total_revenue_lost);
    }

    #[test]
    fn revenue_lost_without_any_price() {
        let records = vec![rec(10.0, None)];
        assert_eq!(hero_metrics(&records).total_revenue_lost, 0.0);
    }

    #[test]
    fn max_discount_floors_at_zero() {
        let records = vec![rec(-5.0, None), rec(-1.0, None)];
        assert_eq!(card_metrics(&records).max_discount, 0.0);
    }

    #[test]
    fn recomputation_is_stable() {
        let records = vec![rec(10.0, Some(90.0)), rec(20.0, Some(180.0))];
        assert_eq!(card_metrics(&records), card_metrics(&records));
        assert_eq!(hero_metrics(&records), hero_metrics(&records));
    }

    #[test]
    fn serialized_field_names() {
        let value = serde_json::to_value(card_metrics(&[rec(10.0, Some(90.0))])).unwrap();
        for key in [
            "totalDiscounts",
            "totalTransactions",
            "totalRevenue",
            "totalMRP",
            "avgDiscountPercent",
            "uniqueCustomers",
            "uniqueProducts",
            "maxDiscount",
            "discountRate",
            "revenueImpact",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }

        let value = serde_json::to_value(HeroMetrics::default()).unwrap();
        for key in [
            "totalDiscountValue",
            "discountedTransactions",
            "avgDiscountPercentage",
            "uniqueMembers",
            "unitsSold",
            "totalRevenueLost",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
    }
}
