//! Per-location widget rebuild and repaint counters.

use std::collections::HashMap;

use fperf_core::prelude::*;
use fperf_core::{PerfMetric, PerfReportKind, SlidingWindowStats};

use crate::config::StatsSettings;
use crate::events::{SourceLocation, WidgetReport};

/// Counters for one report kind.
///
/// Every report advances `tick` by one, so a tick is one frame's report.
#[derive(Debug, Clone, Default)]
struct KindCounters {
    tick: Option<u64>,
    by_location: HashMap<u64, SlidingWindowStats>,
}

impl KindCounters {
    fn clear(&mut self) {
        self.tick = None;
        for stats in self.by_location.values_mut() {
            stats.clear();
        }
    }
}

/// Tracks widget rebuild and repaint counts per source location.
///
/// Owned by whoever consumes the event stream; nothing here is global.
#[derive(Debug, Clone)]
pub struct WidgetPerfTracker {
    settings: StatsSettings,
    /// Cloned for each new location so every counter shares the capacity.
    template: SlidingWindowStats,
    locations: HashMap<u64, SourceLocation>,
    rebuilds: KindCounters,
    repaints: KindCounters,
}

impl WidgetPerfTracker {
    /// Create a tracker from validated window settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigInvalid`] when the settings fail validation.
    pub fn new(settings: StatsSettings) -> Result<Self> {
        settings.validate()?;
        let template = SlidingWindowStats::with_capacity(settings.capacity)?;
        Ok(Self {
            settings,
            template,
            locations: HashMap::new(),
            rebuilds: KindCounters::default(),
            repaints: KindCounters::default(),
        })
    }

    pub fn settings(&self) -> &StatsSettings {
        &self.settings
    }

    fn counters(&self, kind: PerfReportKind) -> &KindCounters {
        match kind {
            PerfReportKind::Rebuild => &self.rebuilds,
            PerfReportKind::Repaint => &self.repaints,
        }
    }

    /// Record one frame's report at the next tick for its kind.
    pub fn record(&mut self, report: WidgetReport) {
        for location in report.new_locations {
            self.locations.insert(location.id, location);
        }

        let counters = match report.kind {
            PerfReportKind::Rebuild => &mut self.rebuilds,
            PerfReportKind::Repaint => &mut self.repaints,
        };
        let tick = counters.tick.map_or(0, |tick| tick + 1);
        counters.tick = Some(tick);

        for (location_id, count) in report.counts {
            counters
                .by_location
                .entry(location_id)
                .or_insert_with(|| self.template.clone())
                .add(count, tick);
        }
        trace!("{} report recorded at tick {}", report.kind, tick);
    }

    /// The tick of the latest report of `kind`, if any.
    pub fn current_tick(&self, kind: PerfReportKind) -> Option<u64> {
        self.counters(kind).tick
    }

    /// Source location registered for `id`.
    pub fn location(&self, id: u64) -> Option<&SourceLocation> {
        self.locations.get(&id)
    }

    /// Number of locations with a counter for `kind`.
    pub fn tracked_locations(&self, kind: PerfReportKind) -> usize {
        self.counters(kind).by_location.len()
    }

    /// Value of `metric` for one location. Unknown locations read as zero.
    pub fn value(&self, kind: PerfReportKind, location_id: u64, metric: PerfMetric) -> u64 {
        let counters = self.counters(kind);
        let (Some(tick), Some(stats)) = (counters.tick, counters.by_location.get(&location_id))
        else {
            return 0;
        };
        self.metric_value(stats, tick, metric)
    }

    fn metric_value(&self, stats: &SlidingWindowStats, tick: u64, metric: PerfMetric) -> u64 {
        match metric {
            PerfMetric::LastFrame => stats.total_since_tick(tick),
            PerfMetric::RecentFrames => {
                stats.total_since_tick(tick.saturating_sub(self.settings.recent_window - 1))
            }
            PerfMetric::CurrentScreen => stats.total_since_navigation(),
            PerfMetric::Total => stats.total(),
        }
    }

    /// Locations with a non-zero `metric`, highest first.
    ///
    /// Ties are ordered by location id. Returns `(location id, value)` pairs.
    pub fn top(&self, kind: PerfReportKind, metric: PerfMetric, limit: usize) -> Vec<(u64, u64)> {
        let counters = self.counters(kind);
        let Some(tick) = counters.tick else {
            return Vec::new();
        };

        let mut rows: Vec<(u64, u64)> = counters
            .by_location
            .iter()
            .map(|(&id, stats)| (id, self.metric_value(stats, tick, metric)))
            .filter(|&(_, value)| value > 0)
            .collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        rows.truncate(limit);
        rows
    }

    /// Start a new "current screen" for every counter.
    pub fn on_navigation(&mut self) {
        for counters in [&mut self.rebuilds, &mut self.repaints] {
            for stats in counters.by_location.values_mut() {
                stats.on_navigation();
            }
        }
    }

    /// Reset every counter and tick. Known locations are kept.
    pub fn clear(&mut self) {
        self.rebuilds.clear();
        self.repaints.clear();
    }

    /// Clear and forget all known locations.
    pub fn reset(&mut self) {
        self.rebuilds = KindCounters::default();
        self.repaints = KindCounters::default();
        self.locations.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> WidgetPerfTracker {
        WidgetPerfTracker::new(StatsSettings {
            capacity: 8,
            recent_window: 3,
        })
        .unwrap()
    }

    fn report(kind: PerfReportKind, counts: &[(u64, u64)]) -> WidgetReport {
        WidgetReport {
            kind,
            start_time: None,
            counts: counts.to_vec(),
            new_locations: Vec::new(),
        }
    }

    fn rebuilds(counts: &[(u64, u64)]) -> WidgetReport {
        report(PerfReportKind::Rebuild, counts)
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let err = WidgetPerfTracker::new(StatsSettings {
            capacity: 4,
            recent_window: 5,
        })
        .unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_each_report_is_one_tick() {
        let mut tracker = tracker();
        assert_eq!(tracker.current_tick(PerfReportKind::Rebuild), None);

        tracker.record(rebuilds(&[(1, 2)]));
        tracker.record(rebuilds(&[(1, 1), (2, 4)]));

        assert_eq!(tracker.current_tick(PerfReportKind::Rebuild), Some(1));
        assert_eq!(tracker.current_tick(PerfReportKind::Repaint), None);
        assert_eq!(tracker.tracked_locations(PerfReportKind::Rebuild), 2);
    }

    #[test]
    fn test_metric_values() {
        let mut tracker = tracker();
        tracker.record(rebuilds(&[(1, 5)]));
        tracker.record(rebuilds(&[(1, 1)]));
        tracker.record(rebuilds(&[(2, 2)]));
        tracker.record(rebuilds(&[(1, 3)]));

        let kind = PerfReportKind::Rebuild;
        assert_eq!(tracker.value(kind, 1, PerfMetric::LastFrame), 3);
        // Ticks 1..=3
        assert_eq!(tracker.value(kind, 1, PerfMetric::RecentFrames), 4);
        assert_eq!(tracker.value(kind, 1, PerfMetric::CurrentScreen), 9);
        assert_eq!(tracker.value(kind, 1, PerfMetric::Total), 9);

        // Location 2 was not rebuilt in the last frame.
        assert_eq!(tracker.value(kind, 2, PerfMetric::LastFrame), 0);
        assert_eq!(tracker.value(kind, 2, PerfMetric::RecentFrames), 2);

        assert_eq!(tracker.value(kind, 99, PerfMetric::Total), 0);
        assert_eq!(tracker.value(PerfReportKind::Repaint, 1, PerfMetric::Total), 0);
    }

    #[test]
    fn test_kinds_are_independent() {
        let mut tracker = tracker();
        tracker.record(rebuilds(&[(1, 1)]));
        tracker.record(rebuilds(&[(1, 1)]));
        tracker.record(report(PerfReportKind::Repaint, &[(1, 7)]));

        assert_eq!(tracker.current_tick(PerfReportKind::Repaint), Some(0));
        assert_eq!(
            tracker.value(PerfReportKind::Repaint, 1, PerfMetric::LastFrame),
            7
        );
        assert_eq!(
            tracker.value(PerfReportKind::Rebuild, 1, PerfMetric::LastFrame),
            1
        );
    }

    #[test]
    fn test_top_orders_by_value_then_id() {
        let mut tracker = tracker();
        tracker.record(rebuilds(&[(3, 2), (1, 5), (2, 2), (4, 0)]));

        let top = tracker.top(PerfReportKind::Rebuild, PerfMetric::Total, 10);
        assert_eq!(top, vec![(1, 5), (2, 2), (3, 2)]);

        let top = tracker.top(PerfReportKind::Rebuild, PerfMetric::Total, 2);
        assert_eq!(top, vec![(1, 5), (2, 2)]);

        assert!(tracker
            .top(PerfReportKind::Repaint, PerfMetric::Total, 10)
            .is_empty());
    }

    #[test]
    fn test_navigation_resets_current_screen_only() {
        let mut tracker = tracker();
        tracker.record(rebuilds(&[(1, 4)]));
        tracker.record(report(PerfReportKind::Repaint, &[(1, 2)]));
        tracker.on_navigation();
        tracker.record(rebuilds(&[(1, 1)]));

        let kind = PerfReportKind::Rebuild;
        assert_eq!(tracker.value(kind, 1, PerfMetric::CurrentScreen), 1);
        assert_eq!(tracker.value(kind, 1, PerfMetric::Total), 5);
        assert_eq!(
            tracker.value(PerfReportKind::Repaint, 1, PerfMetric::CurrentScreen),
            0
        );
    }

    #[test]
    fn test_clear_keeps_locations() {
        let mut tracker = tracker();
        let mut first = rebuilds(&[(1, 4)]);
        first.new_locations.push(SourceLocation {
            id: 1,
            path: "lib/main.dart".to_string(),
            line: 10,
            column: 3,
        });
        tracker.record(first);

        tracker.clear();
        assert_eq!(tracker.current_tick(PerfReportKind::Rebuild), None);
        assert_eq!(tracker.value(PerfReportKind::Rebuild, 1, PerfMetric::Total), 0);
        assert!(tracker.location(1).is_some());

        tracker.record(rebuilds(&[(1, 2)]));
        assert_eq!(tracker.current_tick(PerfReportKind::Rebuild), Some(0));
        assert_eq!(tracker.value(PerfReportKind::Rebuild, 1, PerfMetric::LastFrame), 2);
    }

    #[test]
    fn test_reset_forgets_locations() {
        let mut tracker = tracker();
        let mut first = rebuilds(&[(1, 4)]);
        first.new_locations.push(SourceLocation {
            id: 1,
            path: "lib/main.dart".to_string(),
            line: 10,
            column: 3,
        });
        tracker.record(first);

        tracker.reset();
        assert!(tracker.location(1).is_none());
        assert_eq!(tracker.tracked_locations(PerfReportKind::Rebuild), 0);
    }

    #[test]
    fn test_recent_window_is_bounded_by_capacity() {
        let mut tracker = tracker();
        for _ in 0..20 {
            tracker.record(rebuilds(&[(1, 1)]));
        }
        let kind = PerfReportKind::Rebuild;
        assert_eq!(tracker.value(kind, 1, PerfMetric::RecentFrames), 3);
        assert_eq!(tracker.value(kind, 1, PerfMetric::Total), 20);
    }
}
