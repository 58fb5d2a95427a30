//! actmon - headless activity monitor host.
//!
//! Starts the monitor, runs until Ctrl+C, then prints today's summary.

use actmon::logwriter::{format_duration, LogWriter};
use actmon::platform::{NativeInspector, ProcessWatcher, WindowInspector};
use actmon::store::TodayStatistics;
use actmon::{Monitor, MonitorConfig};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

fn init_tracing(writer: &Arc<LogWriter>) {
    let console = fmt::layer().with_filter(
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("actmon=info")),
    );
    let debug_file = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer.debug_writer())
        .with_filter(EnvFilter::new("actmon=debug"));

    tracing_subscriber::registry()
        .with(console)
        .with(debug_file)
        .init();
}

fn main() -> ExitCode {
    let config = match MonitorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("actmon: {e}");
            return ExitCode::FAILURE;
        }
    };

    let writer = Arc::new(LogWriter::new(config.log_dir.clone()));
    init_tracing(&writer);

    let inspector: Arc<dyn WindowInspector> = Arc::new(NativeInspector::new());
    let watcher = ProcessWatcher::new(Arc::clone(&inspector), config.process_watch_interval);
    let mut monitor = Monitor::with_writer(config, inspector, Box::new(watcher), writer);

    if let Err(e) = monitor.start() {
        tracing::error!(error = %e, "Monitoring could not start");
        eprintln!("actmon: {e}");
        return ExitCode::FAILURE;
    }

    println!("actmon is running, logging to {}", monitor.writer().dir().display());
    println!("Press Ctrl+C to stop.");

    let (tx, rx) = crossbeam_channel::bounded(1);
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = tx.try_send(());
    }) {
        tracing::error!(error = %e, "Cannot install the Ctrl+C handler");
        monitor.dispose();
        return ExitCode::FAILURE;
    }

    let _ = rx.recv();
    println!("\nShutting down...");
    monitor.dispose();

    print_summary(&monitor.today_statistics());
    ExitCode::SUCCESS
}

fn print_summary(stats: &TodayStatistics) {
    println!();
    println!("Activity on {}", stats.date);
    println!("{}", "=".repeat(60));
    println!(
        "   Applications: {} sessions, {}",
        stats.totals.application_sessions,
        format_duration(stats.totals.application_time)
    );
    println!(
        "   Browsers:     {} sessions, {}",
        stats.totals.browser_sessions,
        format_duration(stats.totals.browser_time)
    );
    println!("   Pages:        {}", stats.totals.distinct_urls);

    if !stats.applications.is_empty() {
        println!();
        println!("Top applications:");
        for (i, app) in stats.applications.iter().take(5).enumerate() {
            println!(
                "   {}. {} - {} ({} sessions)",
                i + 1,
                app.process_name,
                format_duration(app.total),
                app.session_count
            );
        }
    }

    if !stats.urls.is_empty() {
        println!();
        println!("Top pages:");
        for (i, url) in stats.urls.iter().take(5).enumerate() {
            println!(
                "   {}. [{}] {} - {}",
                i + 1,
                url.browser_name,
                url.url,
                format_duration(url.total)
            );
        }
    }
    println!("{}", "=".repeat(60));
}
