//! Flutter Perf - widget rebuild and repaint counters for Flutter apps
//!
//! This is the binary entry point. All logic lives in the workspace crates.

use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use fperf_app::{
    build_report, init_config_dir, load_settings, replay, replay_file, WidgetPerfTracker,
};
use fperf_core::{PerfMetric, PerfReportKind};
use tokio::io::BufReader;

/// Replay recorded VM Service events and list the most rebuilt or repainted widgets
#[derive(Parser, Debug)]
#[command(name = "fperf")]
#[command(about = "Widget rebuild and repaint counters for Flutter apps", long_about = None)]
struct Args {
    /// NDJSON file of VM Service stream events (`-` reads stdin)
    #[arg(value_name = "EVENTS", required_unless_present = "init")]
    events: Option<PathBuf>,

    /// Project directory holding `.fperf/config.toml`
    #[arg(long, value_name = "DIR")]
    project: Option<PathBuf>,

    /// Report kind: rebuild or repaint
    #[arg(long)]
    kind: Option<PerfReportKind>,

    /// Metric: last-frame, recent-frames, current-screen or total
    #[arg(long)]
    metric: Option<PerfMetric>,

    /// Number of widget locations to list (at least 1)
    #[arg(long)]
    top: Option<NonZeroUsize>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Write a default `.fperf/config.toml` and exit
    #[arg(long)]
    init: bool,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    fperf_core::logging::init()?;

    let project = args
        .project
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    if args.init {
        let path = init_config_dir(&project)?;
        eprintln!("Config: {}", path.display());
        return Ok(());
    }

    let settings = load_settings(&project);
    settings.validate()?;

    let kind = args.kind.unwrap_or(settings.report.kind);
    let metric = args.metric.unwrap_or(settings.report.metric);
    let top = args.top.map_or(settings.report.top, NonZeroUsize::get);

    let mut tracker = WidgetPerfTracker::new(settings.stats.clone())?;
    let summary = match args.events {
        Some(path) if path.as_os_str() == "-" => {
            replay(BufReader::new(tokio::io::stdin()), &mut tracker).await?
        }
        Some(path) => replay_file(&path, &mut tracker).await?,
        None => return Err(color_eyre::eyre::eyre!("no events file given")),
    };
    tracing::info!("Replayed {:?}", summary);

    let report = build_report(&tracker, kind, metric, top);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_table());
    }

    if summary.malformed > 0 {
        match fperf_core::logging::get_current_log_file() {
            Ok(log) => eprintln!(
                "Skipped {} malformed event line(s), see {}",
                summary.malformed,
                log.display()
            ),
            Err(_) => eprintln!("Skipped {} malformed event line(s)", summary.malformed),
        }
    }

    Ok(())
}
