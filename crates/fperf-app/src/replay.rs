//! Replay a newline-delimited dump of VM Service stream events into a tracker.

use std::path::Path;

use fperf_core::prelude::*;
use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::events::{classify, parse_stream_line, PerfEvent};
use crate::tracker::WidgetPerfTracker;

/// Counts of what a replay saw.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReplaySummary {
    /// Non-blank lines read.
    pub events: u64,
    pub reports: u64,
    pub navigations: u64,
    pub restarts: u64,
    /// Lines that were not valid stream events and were skipped.
    pub malformed: u64,
}

/// Feed every event from `reader` into `tracker`.
///
/// Malformed lines (including lines that are not UTF-8) are logged and
/// counted; only I/O errors abort the replay.
pub async fn replay<R>(reader: R, tracker: &mut WidgetPerfTracker) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let mut segments = reader.split(b'\n');
    let mut summary = ReplaySummary::default();
    let mut line_no = 0u64;

    while let Some(bytes) = segments.next_segment().await? {
        line_no += 1;
        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!("Skipping non UTF-8 line {}: {}", line_no, e);
                summary.events += 1;
                summary.malformed += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }
        summary.events += 1;

        let event = match parse_stream_line(line) {
            Ok(event) => event,
            Err(e) if e.is_recoverable() => {
                warn!("Skipping malformed event on line {}: {}", line_no, e);
                summary.malformed += 1;
                continue;
            }
            Err(e) => return Err(e),
        };

        match classify(&event) {
            PerfEvent::Report(report) => {
                summary.reports += 1;
                tracker.record(report);
            }
            PerfEvent::Navigation { route } => {
                debug!("Navigation to {:?} on line {}", route, line_no);
                summary.navigations += 1;
                tracker.on_navigation();
            }
            PerfEvent::IsolateRestart { isolate_id } => {
                info!("Isolate {:?} started on line {}, resetting counters", isolate_id, line_no);
                summary.restarts += 1;
                tracker.reset();
            }
            PerfEvent::Ignored => {}
        }
    }

    debug!("Replay finished: {:?}", summary);
    Ok(summary)
}

/// Replay events from a file.
pub async fn replay_file(path: &Path, tracker: &mut WidgetPerfTracker) -> Result<ReplaySummary> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    replay(BufReader::new(file), tracker).await
}
