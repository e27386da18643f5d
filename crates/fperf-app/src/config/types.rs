//! Configuration types for `.fperf/config.toml`

use fperf_core::prelude::*;
use fperf_core::{PerfMetric, PerfReportKind, DEFAULT_CAPACITY};
use serde::{Deserialize, Serialize};

/// Application settings (.fperf/config.toml)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub stats: StatsSettings,

    #[serde(default)]
    pub report: ReportSettings,
}

impl Settings {
    /// Reject values the counters cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.stats.validate()?;
        if self.report.top == 0 {
            return Err(Error::config_invalid("report.top must be at least 1"));
        }
        Ok(())
    }
}

/// Sliding window settings shared by every widget counter
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StatsSettings {
    /// Ticks of windowed history kept per widget location
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Ticks covered by the "recent frames" metric, current tick included
    #[serde(default = "default_recent_window")]
    pub recent_window: u64,
}

impl Default for StatsSettings {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            recent_window: default_recent_window(),
        }
    }
}

impl StatsSettings {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::config_invalid("stats.capacity must be at least 1"));
        }
        if self.recent_window == 0 {
            return Err(Error::config_invalid(
                "stats.recent_window must be at least 1",
            ));
        }
        if self.recent_window > self.capacity as u64 {
            return Err(Error::config_invalid(format!(
                "stats.recent_window ({}) cannot exceed stats.capacity ({})",
                self.recent_window, self.capacity
            )));
        }
        Ok(())
    }
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

fn default_recent_window() -> u64 {
    10
}

/// Report output defaults (overridable from the command line)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReportSettings {
    #[serde(default)]
    pub kind: PerfReportKind,

    #[serde(default)]
    pub metric: PerfMetric,

    /// Number of widget locations listed
    #[serde(default = "default_top")]
    pub top: usize,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            kind: PerfReportKind::default(),
            metric: PerfMetric::default(),
            top: default_top(),
        }
    }
}

fn default_top() -> usize {
    10
}
