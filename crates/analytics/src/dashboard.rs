//! One-call dashboard computation: filter, aggregate, break down.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::aggregate::{card_metrics_with, hero_metrics_with, CardMetrics, HeroMetrics};
use crate::breakdown::{group_by, rank, Dimension, GroupTotal, Order};
use crate::config::ViewConfig;
use crate::filter::{filter_view, is_discounted, FilterSet};
use crate::model::TransactionRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub view: String,
    pub location: String,
    pub filters: FilterSet,
    pub input_records: usize,
    /// Records passing the baseline discount predicate alone.
    pub discounted_records: usize,
    pub filtered_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownResult<'a> {
    pub dimension: Dimension,
    pub groups: Vec<GroupTotal<'a>>,
    /// Keys of the top groups by the view's `rank_by`.
    pub top: Vec<String>,
    /// Keys of the bottom groups by the view's `rank_by`.
    pub bottom: Vec<String>,
}

/// Everything the dashboard page shows, computed from one filtered subset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot<'a> {
    pub summary: SnapshotSummary,
    pub hero: HeroMetrics,
    pub cards: CardMetrics,
    pub breakdowns: BTreeMap<Dimension, BreakdownResult<'a>>,
    #[serde(skip)]
    pub filtered: Vec<&'a TransactionRecord>,
}

/// Run the page pipeline for `config` over `records`.
///
/// Pure: equal inputs give equal snapshots.
pub fn run<'a>(config: &ViewConfig, records: &'a [TransactionRecord]) -> DashboardSnapshot<'a> {
    let filtered = filter_view(records, &config.location, &config.filters);

    let hero = hero_metrics_with(filtered.iter().copied(), config.customer_key);
    let cards = card_metrics_with(filtered.iter().copied(), config.customer_key);

    let mut breakdowns = BTreeMap::new();
    for &dimension in &config.breakdowns {
        let groups = group_by(filtered.iter().copied(), dimension, config.customer_key);
        let keys = |order| {
            rank(&groups, config.rank_by, order, config.top_n)
                .into_iter()
                .map(|g| g.key.clone())
                .collect::<Vec<_>>()
        };
        let top = keys(Order::Top);
        let bottom = keys(Order::Bottom);
        breakdowns.insert(
            dimension,
            BreakdownResult {
                dimension,
                groups,
                top,
                bottom,
            },
        );
    }

    let summary = SnapshotSummary {
        view: config.name.clone(),
        location: config.location.clone(),
        filters: config.filters.clone(),
        input_records: records.len(),
        discounted_records: records.iter().filter(|r| is_discounted(r)).count(),
        filtered_records: filtered.len(),
    };

    log::debug!(
        "view '{}': {} input, {} discounted, {} after filters, {} breakdown(s)",
        summary.view,
        summary.input_records,
        summary.discounted_records,
        summary.filtered_records,
        breakdowns.len(),
    );

    DashboardSnapshot {
        summary,
        hero,
        cards,
        breakdowns,
        filtered,
    }
}
