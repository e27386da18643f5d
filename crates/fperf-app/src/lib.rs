//! # fperf-app - Widget Perf Tracking
//!
//! Turns VM Service stream events into per-widget rebuild and repaint
//! statistics.
//!
//! ## Public API
//!
//! - [`config`] - `.fperf/config.toml` loading and validation
//! - [`events`] - Decoding `Flutter.RebuiltWidgets` / `Flutter.RepaintWidgets`
//!   reports, navigation and isolate restarts
//! - [`WidgetPerfTracker`] - One sliding-window counter per (kind, location)
//! - [`replay()`] / [`replay_file()`] - Feed an NDJSON event dump into a tracker
//! - [`build_report()`] - Ranked locations for a kind and metric

pub mod config;
pub mod events;
pub mod replay;
pub mod report;
pub mod tracker;

pub use config::{init_config_dir, load_settings, ReportSettings, Settings, StatsSettings};
pub use events::{
    classify, parse_stream_line, PerfEvent, SourceLocation, StreamEvent, WidgetReport,
};
pub use replay::{replay, replay_file, ReplaySummary};
pub use report::{build_report, Report, ReportRow};
pub use tracker::WidgetPerfTracker;
