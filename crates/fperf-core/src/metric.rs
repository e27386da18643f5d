//! Widget perf report kinds and the metrics shown for each location.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

// ── PerfReportKind ───────────────────────────────────────────────────────────

/// Which per-widget counter a report feeds.
///
/// Flutter posts one Extension event per frame for each kind while widget
/// build/paint profiling is enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerfReportKind {
    #[default]
    Rebuild,
    Repaint,
}

impl PerfReportKind {
    pub const ALL: [PerfReportKind; 2] = [PerfReportKind::Rebuild, PerfReportKind::Repaint];

    /// The `extensionKind` of the VM Service event carrying this report.
    pub fn extension_kind(self) -> &'static str {
        match self {
            PerfReportKind::Rebuild => "Flutter.RebuiltWidgets",
            PerfReportKind::Repaint => "Flutter.RepaintWidgets",
        }
    }

    /// Reverse of [`extension_kind`](Self::extension_kind).
    pub fn from_extension_kind(kind: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.extension_kind() == kind)
    }

    /// Column header used in reports.
    pub fn label(self) -> &'static str {
        match self {
            PerfReportKind::Rebuild => "Rebuilds",
            PerfReportKind::Repaint => "Repaints",
        }
    }

    /// Name used on the command line and in config files.
    pub fn name(self) -> &'static str {
        match self {
            PerfReportKind::Rebuild => "rebuild",
            PerfReportKind::Repaint => "repaint",
        }
    }
}

impl fmt::Display for PerfReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PerfReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                Error::invalid_argument(format!(
                    "unknown report kind '{s}' (expected rebuild or repaint)"
                ))
            })
    }
}

// ── PerfMetric ───────────────────────────────────────────────────────────────

/// An aggregate shown per widget location.
///
/// Time-windowed metrics are read from the sliding window relative to the
/// current tick; the others are cumulative counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PerfMetric {
    LastFrame,
    RecentFrames,
    CurrentScreen,
    #[default]
    Total,
}

impl PerfMetric {
    /// All metrics in display order.
    pub const ALL: [PerfMetric; 4] = [
        PerfMetric::LastFrame,
        PerfMetric::RecentFrames,
        PerfMetric::CurrentScreen,
        PerfMetric::Total,
    ];

    pub fn label(self) -> &'static str {
        match self {
            PerfMetric::LastFrame => "Last Frame",
            PerfMetric::RecentFrames => "Recent Frames",
            PerfMetric::CurrentScreen => "Current Screen",
            PerfMetric::Total => "Total",
        }
    }

    /// Whether the value is computed over a trailing window of ticks.
    pub fn is_time_windowed(self) -> bool {
        matches!(self, PerfMetric::LastFrame | PerfMetric::RecentFrames)
    }

    pub fn name(self) -> &'static str {
        match self {
            PerfMetric::LastFrame => "last-frame",
            PerfMetric::RecentFrames => "recent-frames",
            PerfMetric::CurrentScreen => "current-screen",
            PerfMetric::Total => "total",
        }
    }
}

impl fmt::Display for PerfMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PerfMetric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::invalid_argument(format!("unknown metric '{s}'")))
    }
}
