//! `promolens metrics` and `promolens drill`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use promolens_analytics::breakdown::{find_group, group_by, Dimension};
use promolens_analytics::dashboard::DashboardSnapshot;
use promolens_analytics::drilldown::build_drill_down_with;
use promolens_analytics::filter::filter_view;
use promolens_analytics::{load, run, DrillDownKind, DrillDownSummary, TransactionRecord};

use crate::exit_codes::{EXIT_EMPTY, EXIT_ERROR, EXIT_NOT_FOUND};
use crate::{resolve_view, CliError, ViewArgs};

/// JSON envelope around a snapshot.
#[derive(Serialize)]
struct MetricsReport<'a> {
    engine_version: &'static str,
    generated_at: String,
    data_file: String,
    #[serde(flatten)]
    snapshot: &'a DashboardSnapshot<'a>,
}

fn load_data(path: &Path) -> Result<Vec<TransactionRecord>, CliError> {
    Ok(load::from_path(path)?)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, CliError> {
    serde_json::to_string_pretty(value)
        .map_err(|e| CliError::new(EXIT_ERROR, format!("JSON serialization error: {e}")))
}

// ============================================================================
// metrics
// ============================================================================

pub fn cmd_metrics(
    data_path: PathBuf,
    view: ViewArgs,
    json_output: bool,
    output_file: Option<PathBuf>,
    fail_on_empty: bool,
) -> Result<(), CliError> {
    let config = resolve_view(&view)?;
    let records = load_data(&data_path)?;
    let snapshot = run(&config, &records);

    if json_output || output_file.is_some() {
        let report = MetricsReport {
            engine_version: env!("CARGO_PKG_VERSION"),
            generated_at: chrono::Utc::now().to_rfc3339(),
            data_file: data_path.display().to_string(),
            snapshot: &snapshot,
        };
        let json_str = to_json(&report)?;

        if let Some(ref path) = output_file {
            std::fs::write(path, &json_str)
                .map_err(|e| CliError::new(EXIT_ERROR, format!("cannot write output: {e}")))?;
            eprintln!("wrote {}", path.display());
        }

        if json_output {
            println!("{json_str}");
        }
    }

    print_summary(&snapshot);

    if fail_on_empty && snapshot.summary.filtered_records == 0 {
        return Err(CliError::new(EXIT_EMPTY, "no transactions match the view")
            .with_hint("check the location and filters, or run `promolens options` to list valid values"));
    }

    Ok(())
}

// Human summary to stderr.
fn print_summary(snapshot: &DashboardSnapshot<'_>) {
    let s = &snapshot.summary;
    let h = &snapshot.hero;
    let c = &snapshot.cards;

    eprintln!(
        "view '{}' (location: {}): {} of {} records ({} discounted)",
        s.view, s.location, s.filtered_records, s.input_records, s.discounted_records,
    );
    eprintln!(
        "hero: discount value {:.2}, {} transactions, avg {:.1}%, {} members, {} units, revenue lost {:.2}",
        h.total_discount_value,
        h.discounted_transactions,
        h.avg_discount_percentage,
        h.unique_members,
        h.units_sold,
        h.total_revenue_lost,
    );
    eprintln!(
        "cards: discounts {:.2}, revenue {:.2}, MRP {:.2}, rate {:.1}%, impact {:.2}, {} customers, {} products, max {:.2}",
        c.total_discounts,
        c.total_revenue,
        c.total_mrp,
        c.discount_rate,
        c.revenue_impact,
        c.unique_customers,
        c.unique_products,
        c.max_discount,
    );
    for (dimension, breakdown) in &snapshot.breakdowns {
        if breakdown.groups.is_empty() {
            continue;
        }
        eprintln!(
            "{dimension}: {} group(s), top: {}",
            breakdown.groups.len(),
            breakdown.top.join(", "),
        );
    }
}

// ============================================================================
// drill
// ============================================================================

#[derive(Serialize)]
struct DrillReport<'a> {
    kind: DrillDownKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension: Option<Dimension>,
    #[serde(flatten)]
    summary: &'a DrillDownSummary<'a>,
}

pub fn cmd_drill(
    data_path: PathBuf,
    view: ViewArgs,
    target: Option<(Dimension, String)>,
    no_records: bool,
) -> Result<(), CliError> {
    let config = resolve_view(&view)?;
    let records = load_data(&data_path)?;
    let filtered = filter_view(&records, &config.location, &config.filters);

    let (kind, mut summary) = match &target {
        None => (
            DrillDownKind::Metric,
            build_drill_down_with(filtered.iter().copied(), "All discounted transactions", config.customer_key),
        ),
        Some((dimension, key)) => {
            let groups = group_by(filtered.iter().copied(), *dimension, config.customer_key);
            let group = find_group(&groups, key).ok_or_else(|| {
                let known: Vec<&str> = groups.iter().take(10).map(|g| g.key.as_str()).collect();
                let err = CliError::new(EXIT_NOT_FOUND, format!("no {dimension} group '{key}' in the filtered view"));
                if known.is_empty() {
                    err.with_hint("the filtered view is empty")
                } else {
                    err.with_hint(format!("known values: {}", known.join(", ")))
                }
            })?;
            (dimension.drill_kind(), group.drill_down(config.customer_key))
        }
    };

    if no_records {
        summary.raw_data.clear();
    }

    let report = DrillReport {
        kind,
        dimension: target.as_ref().map(|(d, _)| *d),
        summary: &summary,
    };
    println!("{}", to_json(&report)?);

    eprintln!(
        "{}: {} transactions, {} customers, value {:.2}, discounts {:.2}",
        summary.name,
        summary.total_transactions,
        summary.total_customers,
        summary.total_value,
        summary.metric_value,
    );

    Ok(())
}
