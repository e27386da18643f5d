//! Ranked per-location reports built from a tracker.

use std::fmt::Write as _;

use fperf_core::{PerfMetric, PerfReportKind};
use serde::Serialize;

use crate::tracker::WidgetPerfTracker;

/// One ranked widget location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub location_id: u64,
    /// `path:line:column`, or `#id` when the location was never announced.
    pub location: String,
    pub value: u64,
}

/// The hottest widget locations for one kind and metric.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub kind: PerfReportKind,
    pub metric: PerfMetric,
    /// Tick of the latest report of `kind`.
    pub tick: Option<u64>,
    pub generated_at: chrono::DateTime<chrono::Local>,
    pub rows: Vec<ReportRow>,
}

/// Build a report of at most `limit` rows.
pub fn build_report(
    tracker: &WidgetPerfTracker,
    kind: PerfReportKind,
    metric: PerfMetric,
    limit: usize,
) -> Report {
    let rows = tracker
        .top(kind, metric, limit)
        .into_iter()
        .map(|(location_id, value)| ReportRow {
            location_id,
            location: tracker
                .location(location_id)
                .map(ToString::to_string)
                .unwrap_or_else(|| format!("#{location_id}")),
            value,
        })
        .collect();

    Report {
        kind,
        metric,
        tick: tracker.current_tick(kind),
        generated_at: chrono::Local::now(),
        rows,
    }
}

impl Report {
    /// Plain-text table for terminal output.
    pub fn render_table(&self) -> String {
        let mut out = format!("{} - {}", self.kind.label(), self.metric.label());
        if let Some(tick) = self.tick {
            let _ = write!(out, " (frame {})", tick + 1);
        }
        out.push('\n');

        if self.rows.is_empty() {
            out.push_str("  no widget activity\n");
            return out;
        }

        let width = self
            .rows
            .iter()
            .map(|row| row.value.to_string().len())
            .max()
            .unwrap_or(0)
            .max("Count".len());

        let _ = writeln!(out, "  {:>width$}  Location", "Count");
        for row in &self.rows {
            let _ = writeln!(out, "  {:>width$}  {}", row.value, row.location);
        }
        out
    }
}
