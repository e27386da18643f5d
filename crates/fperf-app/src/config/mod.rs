//! Configuration file parsing for Flutter Perf
//!
//! Supports:
//! - `.fperf/config.toml` - Window sizes and report defaults

pub mod settings;
pub mod types;

pub use settings::{config_path, init_config_dir, load_settings};
pub use types::*;
