//! `promolens-analytics` - discount and promotion analytics pipeline.
//!
//! Pure engine crate: receives pre-loaded transaction records, returns
//! filtered subsets, metrics, grouped totals and drill-down payloads.
//! Missing values, empty inputs and unparseable dates never fail the
//! pipeline; only config parsing and data loading return errors.

pub mod aggregate;
pub mod breakdown;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod distinct;
pub mod drilldown;
pub mod error;
pub mod filter;
pub mod load;
pub mod model;
pub mod options;

pub use aggregate::{card_metrics, hero_metrics, CardMetrics, HeroMetrics};
pub use config::ViewConfig;
pub use dashboard::{run, DashboardSnapshot};
pub use distinct::KeyPolicy;
pub use drilldown::{build_drill_down, DrillDownKind, DrillDownState, DrillDownSummary};
pub use error::AnalyticsError;
pub use filter::{filter, filter_view, DateRange, FilterSet};
pub use model::TransactionRecord;
