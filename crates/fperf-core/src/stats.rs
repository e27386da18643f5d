//! # Sliding-Window Event Counter
//!
//! [`SlidingWindowStats`] counts integer-valued events tagged with a caller
//! supplied tick (a frame or report index, not wall-clock time). It answers
//! three kinds of query without keeping unbounded history:
//!
//! - the running total since construction or [`SlidingWindowStats::clear`],
//! - the total since the last [`SlidingWindowStats::on_navigation`],
//! - the total over a trailing window of ticks.
//!
//! Windowed sums come from a fixed ring of per-tick buckets indexed by
//! `tick % capacity`. Ticks older than `capacity` ticks behind the latest tick
//! are evicted and read as zero; the cumulative totals are unaffected.

use crate::error::{Error, Result};

/// Number of per-tick buckets kept by [`SlidingWindowStats::new`].
pub const DEFAULT_CAPACITY: usize = 16;

// ── SlidingWindowStats ───────────────────────────────────────────────────────

/// Event counter with a bounded trailing window and two cumulative totals.
///
/// One instance tracks one subject (for example the rebuild count of a
/// single widget location). It is not internally synchronized; callers that
/// share it across tasks must serialize access themselves.
///
/// ```
/// use fperf_core::SlidingWindowStats;
///
/// let mut stats = SlidingWindowStats::new();
/// stats.add(2, 0);
/// stats.add(3, 1);
/// assert_eq!(stats.total(), 5);
/// assert_eq!(stats.total_within_window(0), 3);
/// assert_eq!(stats.total_within_window(1), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidingWindowStats {
    /// Per-tick sums, slot `tick % capacity`.
    buckets: Box<[u64]>,
    /// Latest tick seen; `None` until the first `add` after construction or `clear`.
    latest_tick: Option<u64>,
    total: u64,
    total_since_navigation: u64,
}

impl Default for SlidingWindowStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SlidingWindowStats {
    /// Create a counter with [`DEFAULT_CAPACITY`] buckets.
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_CAPACITY)
    }

    /// Create a counter that keeps `capacity` ticks of windowed history.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when `capacity` is zero.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::invalid_argument(
                "sliding window capacity must be at least 1",
            ));
        }
        Ok(Self::with_buckets(capacity))
    }

    fn with_buckets(capacity: usize) -> Self {
        Self {
            buckets: vec![0; capacity].into_boxed_slice(),
            latest_tick: None,
            total: 0,
            total_since_navigation: 0,
        }
    }

    /// Number of ticks of windowed history kept.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    /// The latest tick observed, or `None` if nothing was added since the last clear.
    pub fn latest_tick(&self) -> Option<u64> {
        self.latest_tick
    }

    /// Whether nothing was added since construction or the last clear.
    pub fn is_empty(&self) -> bool {
        self.latest_tick.is_none()
    }

    /// Record `amount` events at `tick`.
    ///
    /// Moving forward clears the buckets of every tick passed over so stale
    /// counts from `capacity` ticks ago never show up in a window. A tick
    /// behind the latest one lands in its own bucket if that bucket is still
    /// inside the window; a tick further back than that is taken as a restart
    /// of the tick source and empties the window first. Both totals count
    /// `amount` in every case, saturating at `u64::MAX`.
    pub fn add(&mut self, amount: u64, tick: u64) {
        self.total = self.total.saturating_add(amount);
        self.total_since_navigation = self.total_since_navigation.saturating_add(amount);

        match self.latest_tick {
            None => self.latest_tick = Some(tick),
            Some(latest) if tick > latest => {
                self.evict_through(latest, tick);
                self.latest_tick = Some(tick);
            }
            Some(latest) if latest - tick >= self.capacity_u64() => {
                tracing::debug!(
                    latest,
                    tick,
                    "tick moved back past the window horizon, restarting window"
                );
                self.buckets.fill(0);
                self.latest_tick = Some(tick);
            }
            Some(_) => {}
        }

        let slot = self.slot(tick);
        self.buckets[slot] = self.buckets[slot].saturating_add(amount);
    }

    /// Sum of every amount added since construction or the last [`clear`](Self::clear).
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Sum of amounts at ticks `[latest - window_size, latest]`.
    ///
    /// `window_size == 0` returns the latest tick's bucket. Ticks that have
    /// been evicted count as zero, so any window wider than the capacity
    /// returns the sum of the whole buffer. An empty counter returns zero.
    pub fn total_within_window(&self, window_size: u64) -> u64 {
        match self.latest_tick {
            Some(latest) => self.total_since_tick(latest.saturating_sub(window_size)),
            None => 0,
        }
    }

    /// Sum of amounts at ticks from `start_tick` up to the latest tick.
    ///
    /// Useful when "now" is a tick shared by many counters rather than this
    /// counter's own latest tick. Returns zero when `start_tick` is past the
    /// latest tick.
    pub fn total_since_tick(&self, start_tick: u64) -> u64 {
        let Some(latest) = self.latest_tick else {
            return 0;
        };
        if start_tick > latest {
            return 0;
        }

        let oldest_buffered = latest.saturating_sub(self.capacity_u64() - 1);
        (start_tick.max(oldest_buffered)..=latest)
            .map(|tick| self.buckets[self.slot(tick)])
            .fold(0, u64::saturating_add)
    }

    /// Sum of amounts added since the last [`on_navigation`](Self::on_navigation).
    pub fn total_since_navigation(&self) -> u64 {
        self.total_since_navigation
    }

    /// Mark a navigation boundary. Only the since-navigation total is reset.
    pub fn on_navigation(&mut self) {
        self.total_since_navigation = 0;
    }

    /// Reset to the freshly constructed state, keeping the capacity.
    pub fn clear(&mut self) {
        self.buckets.fill(0);
        self.latest_tick = None;
        self.total = 0;
        self.total_since_navigation = 0;
    }

    fn capacity_u64(&self) -> u64 {
        self.buckets.len() as u64
    }

    fn slot(&self, tick: u64) -> usize {
        (tick % self.capacity_u64()) as usize
    }

    /// Zero the buckets for ticks `(latest, tick]`.
    fn evict_through(&mut self, latest: u64, tick: u64) {
        if tick - latest >= self.capacity_u64() {
            self.buckets.fill(0);
            return;
        }
        for passed in latest + 1..=tick {
            let slot = self.slot(passed);
            self.buckets[slot] = 0;
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn filled(amount: u64, ticks: std::ops::RangeInclusive<u64>) -> SlidingWindowStats {
        let mut stats = SlidingWindowStats::new();
        for tick in ticks {
            stats.add(amount, tick);
        }
        stats
    }

    #[test]
    fn test_empty_stats() {
        let stats = SlidingWindowStats::new();
        assert!(stats.is_empty());
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.total_within_window(0), 0);
        assert_eq!(stats.total_within_window(100), 0);
        assert_eq!(stats.total_since_tick(0), 0);
        assert_eq!(stats.total_since_navigation(), 0);
        assert_eq!(stats.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = SlidingWindowStats::with_capacity(0).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_one_event_per_tick() {
        let stats = filled(1, 0..=3);
        assert_eq!(stats.total(), 4);
        assert_eq!(stats.latest_tick(), Some(3));

        assert_eq!(stats.total_since_tick(0), 4);
        assert_eq!(stats.total_since_tick(1), 3);
        assert_eq!(stats.total_since_tick(2), 2);
        assert_eq!(stats.total_since_tick(3), 1);
        assert_eq!(stats.total_since_tick(4), 0);

        assert_eq!(stats.total_within_window(0), 1);
        assert_eq!(stats.total_within_window(1), 2);
        assert_eq!(stats.total_within_window(2), 3);
        assert_eq!(stats.total_within_window(3), 4);
        assert_eq!(stats.total_within_window(1000), 4);
    }

    #[test]
    fn test_thousand_events_per_tick() {
        let stats = filled(1000, 0..=3);
        assert_eq!(stats.total(), 4000);
        let since: Vec<u64> = (0..=3).map(|t| stats.total_since_tick(t)).collect();
        assert_eq!(since, vec![4000, 3000, 2000, 1000]);
    }

    #[test]
    fn test_duplicate_ticks_accumulate() {
        let mut stats = SlidingWindowStats::new();
        for _ in 0..1000 {
            stats.add(1, 0);
        }
        for _ in 0..1000 {
            stats.add(1, 1);
        }
        assert_eq!(stats.total(), 2000);
        assert_eq!(stats.total_within_window(0), 1000);
        assert_eq!(stats.total_within_window(1), 2000);
        assert_eq!(stats.total_since_tick(1), 1000);
    }

    #[test]
    fn test_capacity_eviction() {
        let mut stats = SlidingWindowStats::with_capacity(4).unwrap();
        for tick in 0..=11 {
            stats.add(1000, tick);
        }
        assert_eq!(stats.total(), 12_000);
        assert_eq!(stats.total_within_window(0), 1000);
        // Only ticks 8..=11 are still buffered.
        assert_eq!(stats.total_within_window(3), 4000);
        assert_eq!(stats.total_within_window(11), 4000);
        assert_eq!(stats.total_since_tick(0), 4000);
    }

    #[test]
    fn test_default_capacity_keeps_twelve_ticks() {
        let stats = filled(1, 0..=11);
        assert_eq!(stats.total(), 12);
        assert_eq!(stats.total_within_window(0), 1);
        assert_eq!(stats.total_within_window(11), 12);
    }

    #[test]
    fn test_skipped_ticks_clear_stale_buckets() {
        let mut stats = SlidingWindowStats::with_capacity(4).unwrap();
        stats.add(5, 0);
        stats.add(7, 1);
        // Tick 5 reuses slot 1, tick 4 reuses slot 0.
        stats.add(1, 5);
        assert_eq!(stats.total_within_window(0), 1);
        assert_eq!(stats.total_within_window(3), 1);
        assert_eq!(stats.total(), 13);
    }

    #[test]
    fn test_large_forward_jump_empties_window() {
        let mut stats = filled(1, 0..=5);
        stats.add(2, 1_000_000);
        assert_eq!(stats.total_within_window(0), 2);
        assert_eq!(stats.total_within_window(u64::MAX), 2);
        assert_eq!(stats.total(), 8);
    }

    #[test]
    fn test_backward_tick_within_window() {
        let mut stats = filled(1, 0..=10);
        stats.add(5, 8);
        assert_eq!(stats.latest_tick(), Some(10));
        assert_eq!(stats.total_within_window(0), 1);
        assert_eq!(stats.total_within_window(2), 8);
        assert_eq!(stats.total(), 16);
    }

    #[test]
    fn test_backward_tick_past_horizon_restarts_window() {
        let mut stats = filled(1, 100..=110);
        stats.add(3, 0);
        assert_eq!(stats.latest_tick(), Some(0));
        assert_eq!(stats.total_within_window(0), 3);
        assert_eq!(stats.total_within_window(100), 3);
        assert_eq!(stats.total(), 14);
        assert_eq!(stats.total_since_navigation(), 14);
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut stats = filled(1000, 0..=20);
        stats.clear();
        assert!(stats.is_empty());
        assert_eq!(stats.total(), 0);
        assert_eq!(stats.total_within_window(0), 0);
        assert_eq!(stats.total_within_window(50), 0);
        assert_eq!(stats.total_since_navigation(), 0);

        // Ticks restart at zero after higher ticks were seen.
        stats.add(1, 0);
        stats.add(1, 1);
        assert_eq!(stats, filled(1, 0..=1));
    }

    #[test]
    fn test_navigation_resets_only_navigation_total() {
        let mut stats = filled(2, 0..=4);
        stats.on_navigation();
        assert_eq!(stats.total_since_navigation(), 0);
        assert_eq!(stats.total(), 10);
        assert_eq!(stats.total_within_window(4), 10);

        stats.add(3, 5);
        assert_eq!(stats.total_since_navigation(), 3);
        assert_eq!(stats.total(), 13);
    }

    #[test]
    fn test_totals_saturate() {
        let mut stats = SlidingWindowStats::new();
        stats.add(u64::MAX, 0);
        stats.add(1, 0);
        stats.add(1, 1);
        assert_eq!(stats.total(), u64::MAX);
        assert_eq!(stats.total_within_window(0), 1);
        assert_eq!(stats.total_within_window(1), u64::MAX);
    }

    proptest! {
        #[test]
        fn prop_total_is_sum_of_amounts(
            events in prop::collection::vec((0u64..10_000, 0u64..200), 0..300),
        ) {
            let mut stats = SlidingWindowStats::new();
            for &(amount, tick) in &events {
                stats.add(amount, tick);
            }
            let expected: u64 = events.iter().map(|&(amount, _)| amount).sum();
            prop_assert_eq!(stats.total(), expected);
            prop_assert_eq!(stats.total_since_navigation(), expected);
            prop_assert!(stats.total_within_window(u64::MAX) <= expected);
        }

        #[test]
        fn prop_monotonic_ticks_window_matches_recent_events(
            amounts in prop::collection::vec(0u64..1000, 1..64),
            window in 0u64..32,
        ) {
            let mut stats = SlidingWindowStats::new();
            for (tick, &amount) in amounts.iter().enumerate() {
                stats.add(amount, tick as u64);
            }
            let latest = amounts.len() as u64 - 1;
            let horizon = (DEFAULT_CAPACITY as u64 - 1).min(window);
            let expected: u64 = amounts
                .iter()
                .enumerate()
                .filter(|&(tick, _)| tick as u64 + horizon >= latest)
                .map(|(_, &amount)| amount)
                .sum();
            prop_assert_eq!(stats.total_within_window(window), expected);
        }
    }
}
