use std::collections::BTreeSet;

use serde::Serialize;

use crate::filter::is_discounted;
use crate::model::TransactionRecord;

/// Selectable values for each categorical filter, taken from the
/// discounted records. Sorted, deduplicated, blanks skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub categories: Vec<String>,
    pub products: Vec<String>,
    /// Display labels; the system sentinel appears as "Online/System".
    pub sold_by: Vec<String>,
    pub payment_methods: Vec<String>,
}

impl FilterOptions {
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut locations = BTreeSet::new();
        let mut categories = BTreeSet::new();
        let mut products = BTreeSet::new();
        let mut sold_by = BTreeSet::new();
        let mut payment_methods = BTreeSet::new();

        for record in records.into_iter().filter(|r| is_discounted(r)) {
            add(&mut locations, record.calculated_location.as_deref());
            add(&mut categories, record.cleaned_category.as_deref());
            add(&mut products, record.cleaned_product.as_deref());
            add(&mut sold_by, record.sold_by_label());
            add(&mut payment_methods, record.payment_method.as_deref());
        }

        Self {
            locations: locations.into_iter().map(String::from).collect(),
            categories: categories.into_iter().map(String::from).collect(),
            products: products.into_iter().map(String::from).collect(),
            sold_by: sold_by.into_iter().map(String::from).collect(),
            payment_methods: payment_methods.into_iter().map(String::from).collect(),
        }
    }
}

fn add<'a>(set: &mut BTreeSet<&'a str>, value: Option<&'a str>) {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        set.insert(v);
    }
}
