//! Widget perf reports from VM Service Extension events.
//!
//! While widget build/paint profiling is enabled, Flutter posts one
//! Extension event per frame listing how often each widget location was
//! rebuilt (or repainted) during that frame.
//!
//! ## Event structure
//!
//! ```json
//! {
//!     "kind": "Extension",
//!     "extensionKind": "Flutter.RebuiltWidgets",
//!     "extensionData": {
//!         "startTime": 1704067200000,
//!         "events": [1, 3, 2, 1],
//!         "newLocations": {
//!             "file:///app/lib/main.dart": [1, 12, 5, 2, 30, 9]
//!         }
//!     },
//!     "isolate": { "id": "isolates/1234", "name": "main" },
//!     "timestamp": 1704067200000
//! }
//! ```
//!
//! `events` is a flat list of `(location id, count)` pairs and
//! `newLocations` maps a file to a flat list of `(id, line, column)`
//! triples for locations not reported before in this isolate.
//!
//! Dumps may hold either bare events like the one above or full
//! `streamNotify` notifications wrapping them; [`parse_stream_line`]
//! accepts both.

use std::fmt;

use fperf_core::prelude::*;
use fperf_core::PerfReportKind;
use serde::Deserialize;
use serde_json::Value;

const NAVIGATION_EXTENSION_KIND: &str = "Flutter.Navigation";
const ISOLATE_START_KIND: &str = "IsolateStart";

// ---------------------------------------------------------------------------
// Stream events
// ---------------------------------------------------------------------------

/// Reference to the isolate that produced an event.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IsolateRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A single VM Service stream event.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamEvent {
    /// Event kind, e.g. `"Extension"`, `"IsolateStart"`.
    pub kind: String,
    /// Isolate that generated the event, if applicable.
    pub isolate: Option<IsolateRef>,
    /// Milliseconds since epoch when the event was generated.
    pub timestamp: Option<i64>,
    /// Kind-specific fields, captured untyped for forward compatibility.
    #[serde(flatten)]
    pub data: Value,
}

impl StreamEvent {
    /// The `extensionKind` of an Extension event.
    pub fn extension_kind(&self) -> Option<&str> {
        if self.kind != "Extension" {
            return None;
        }
        self.data.get("extensionKind").and_then(Value::as_str)
    }
}

/// Parse one line of a VM Service event dump.
///
/// Accepts a bare event object or a `streamNotify` JSON-RPC notification
/// whose `params.event` holds the event.
pub fn parse_stream_line(line: &str) -> Result<StreamEvent> {
    let mut value: Value = serde_json::from_str(line)?;

    if value.get("method").and_then(Value::as_str) == Some("streamNotify") {
        value = value
            .get_mut("params")
            .and_then(|params| params.get_mut("event"))
            .map(Value::take)
            .ok_or_else(|| Error::protocol("streamNotify without params.event"))?;
    }

    Ok(serde_json::from_value(value)?)
}

// ---------------------------------------------------------------------------
// Widget reports
// ---------------------------------------------------------------------------

/// Source location of a widget constructor call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub id: u64,
    pub path: String,
    pub line: u64,
    pub column: u64,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path.strip_prefix("file://").unwrap_or(&self.path);
        write!(f, "{}:{}:{}", path, self.line, self.column)
    }
}

/// One frame's worth of rebuild or repaint counts.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetReport {
    pub kind: PerfReportKind,
    /// Frame start time as reported by the framework, when present.
    pub start_time: Option<u64>,
    /// `(location id, count)` pairs.
    pub counts: Vec<(u64, u64)>,
    pub new_locations: Vec<SourceLocation>,
}

impl WidgetReport {
    /// Sum of all counts in this report, saturating at `u64::MAX`.
    pub fn total(&self) -> u64 {
        self.counts
            .iter()
            .map(|&(_, count)| count)
            .fold(0, u64::saturating_add)
    }
}

/// Parse a `Flutter.RebuiltWidgets` / `Flutter.RepaintWidgets` event.
///
/// Returns `None` for any other event or when `extensionData.events` is
/// missing. Pairs with a non-numeric element are skipped, as is a trailing
/// unpaired element.
pub fn parse_widget_report(event: &StreamEvent) -> Option<WidgetReport> {
    let kind = PerfReportKind::from_extension_kind(event.extension_kind()?)?;
    let ext_data = event.data.get("extensionData")?;
    let raw_events = ext_data.get("events")?.as_array()?;

    let counts = raw_events
        .chunks_exact(2)
        .filter_map(|pair| Some((parse_str_u64(&pair[0])?, parse_str_u64(&pair[1])?)))
        .collect::<Vec<_>>();

    if counts.len() * 2 != raw_events.len() {
        trace!(
            "Dropped {} malformed entries from {} report",
            raw_events.len() - counts.len() * 2,
            kind
        );
    }

    Some(WidgetReport {
        kind,
        start_time: ext_data.get("startTime").and_then(parse_str_u64),
        counts,
        new_locations: ext_data
            .get("newLocations")
            .map(parse_new_locations)
            .unwrap_or_default(),
    })
}

fn parse_new_locations(value: &Value) -> Vec<SourceLocation> {
    let Some(files) = value.as_object() else {
        return Vec::new();
    };

    let mut locations = Vec::new();
    for (path, entries) in files {
        let Some(entries) = entries.as_array() else {
            continue;
        };
        for triple in entries.chunks_exact(3) {
            if let (Some(id), Some(line), Some(column)) = (
                parse_str_u64(&triple[0]),
                parse_str_u64(&triple[1]),
                parse_str_u64(&triple[2]),
            ) {
                locations.push(SourceLocation {
                    id,
                    path: path.clone(),
                    line,
                    column,
                });
            }
        }
    }
    locations
}

/// Parse a JSON value that may contain a u64 either as a string or as a
/// JSON number.
///
/// Flutter's Extension event data sometimes encodes numeric values as
/// strings (e.g. `"42"`).
pub fn parse_str_u64(value: &Value) -> Option<u64> {
    value
        .as_str()
        .and_then(|s| s.parse::<u64>().ok())
        .or_else(|| value.as_u64())
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// What a stream event means for widget perf tracking.
#[derive(Debug, Clone, PartialEq)]
pub enum PerfEvent {
    Report(WidgetReport),
    /// The app moved to another route.
    Navigation { route: Option<String> },
    /// A new isolate started, which happens on hot restart. Location ids
    /// from the previous isolate are no longer valid.
    IsolateRestart { isolate_id: Option<String> },
    Ignored,
}

/// Classify a stream event.
pub fn classify(event: &StreamEvent) -> PerfEvent {
    if event.kind == ISOLATE_START_KIND {
        return PerfEvent::IsolateRestart {
            isolate_id: event.isolate.as_ref().map(|i| i.id.clone()),
        };
    }

    match event.extension_kind() {
        Some(NAVIGATION_EXTENSION_KIND) => PerfEvent::Navigation {
            route: event
                .data
                .pointer("/extensionData/route/description")
                .and_then(Value::as_str)
                .map(str::to_string),
        },
        Some(kind) if PerfReportKind::from_extension_kind(kind).is_some() => {
            match parse_widget_report(event) {
                Some(report) => PerfEvent::Report(report),
                None => {
                    debug!("Ignoring {} event without an events list", kind);
                    PerfEvent::Ignored
                }
            }
        }
        _ => PerfEvent::Ignored,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
