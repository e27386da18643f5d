//! # fperf-core - Core Counter Types
//!
//! Foundation crate for Flutter Perf. Provides the sliding-window event
//! counter, the widget perf metric vocabulary, error handling, and logging.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Counters (`stats`)
//! - [`SlidingWindowStats`] - Per-subject event counter with a bounded trailing window
//! - [`DEFAULT_CAPACITY`] - Window buckets kept by [`SlidingWindowStats::new`]
//!
//! ### Metrics (`metric`)
//! - [`PerfMetric`] - Last frame, recent frames, current screen, total
//! - [`PerfReportKind`] - Rebuild or repaint reports
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use fperf_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod metric;
pub mod prelude;
pub mod stats;

// Re-export commonly used types at crate root for convenience
pub use error::{Error, Result, ResultExt};
pub use metric::{PerfMetric, PerfReportKind};
pub use stats::{SlidingWindowStats, DEFAULT_CAPACITY};
