//! The monitoring engine.
//!
//! Owns the tick thread, the process event subscription and the two
//! trackers. Both event paths (tick and push) mutate tracker state under
//! one mutex and hand the resulting records to the [`LogWriter`] only
//! after the mutex is released.

use super::browser_tracker::BrowserTracker;
use super::session_tracker::SessionTracker;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::logwriter::LogWriter;
use crate::platform::{ProcessEvent, ProcessEventHandler, ProcessEventSource, WindowInspector};
use crate::store::{compute_today_statistics, ActivityRecord, SystemEvent, TodayStatistics};
use chrono::{DateTime, Local, NaiveDate};
use crossbeam_channel::{bounded, select, tick, Receiver, Sender};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Everything the tick and push paths mutate.
#[derive(Debug)]
struct TrackerState {
    sessions: SessionTracker,
    browsers: BrowserTracker,
    day: Option<NaiveDate>,
}

impl TrackerState {
    fn new(config: &MonitorConfig) -> Self {
        Self {
            sessions: SessionTracker::new(
                &config.browsers,
                config.focus_debounce,
                config.log_process_events,
            ),
            browsers: BrowserTracker::new(
                &config.browsers,
                &config.suppressed_markers,
                config.visit_retention,
                config.url_transition_policy,
            ),
            day: None,
        }
    }

    /// Drops yesterday's completed sessions on the first tick of a day.
    fn roll_over(&mut self, today: NaiveDate) {
        if self.day == Some(today) {
            return;
        }
        if self.day.is_some() {
            tracing::info!(%today, "New day, pruning completed sessions");
            self.sessions.prune_before(today);
            self.browsers.prune_before(today);
        }
        self.day = Some(today);
    }

    fn tick(&mut self, inspector: &dyn WindowInspector, now: DateTime<Local>) -> Vec<ActivityRecord> {
        self.roll_over(now.date_naive());
        let mut records = self.sessions.tick(inspector, now);
        records.extend(self.browsers.tick(inspector, now));
        records
    }

    fn apply(&mut self, event: &ProcessEvent, now: DateTime<Local>) -> Vec<ActivityRecord> {
        match event {
            ProcessEvent::Started(info) => self.sessions.on_process_started(info, now),
            ProcessEvent::Stopped(info) => self.sessions.on_process_stopped(info, now),
        }
    }

    fn close_all(&mut self, now: DateTime<Local>) -> Vec<ActivityRecord> {
        let mut records = self.sessions.close_all(now);
        records.extend(self.browsers.close_all(now));
        records
    }
}

fn lock(state: &Mutex<TrackerState>) -> MutexGuard<'_, TrackerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Ticker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

fn run_tick(state: &Mutex<TrackerState>, inspector: &dyn WindowInspector, writer: &LogWriter) {
    let now = Local::now();
    let records = lock(state).tick(inspector, now);
    writer.record_all(&records);
}

fn run_ticker(
    state: Arc<Mutex<TrackerState>>,
    inspector: Arc<dyn WindowInspector>,
    writer: Arc<LogWriter>,
    interval: Duration,
    stop_rx: Receiver<()>,
) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                let outcome = catch_unwind(AssertUnwindSafe(|| {
                    run_tick(&state, inspector.as_ref(), &writer)
                }));
                if outcome.is_err() {
                    tracing::error!("Monitoring tick panicked");
                }
            }
        }
    }

    tracing::debug!("Tick thread exiting");
}

fn process_event_handler(state: Arc<Mutex<TrackerState>>, writer: Arc<LogWriter>) -> ProcessEventHandler {
    Arc::new(move |event: ProcessEvent| {
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            let now = Local::now();
            let records = lock(&state).apply(&event, now);
            writer.record_all(&records);
        }));
        if outcome.is_err() {
            tracing::error!(?event, "Process event callback panicked");
        }
    })
}

/// Activity monitor lifecycle: `start`, `stop`, `dispose`.
///
/// Constructing a monitor does nothing observable; tracking begins with
/// [`start`](Self::start).
pub struct Monitor {
    config: MonitorConfig,
    inspector: Arc<dyn WindowInspector>,
    events: Box<dyn ProcessEventSource>,
    state: Arc<Mutex<TrackerState>>,
    writer: Arc<LogWriter>,
    ticker: Option<Ticker>,
    disposed: bool,
}

impl Monitor {
    pub fn new(
        config: MonitorConfig,
        inspector: Arc<dyn WindowInspector>,
        events: Box<dyn ProcessEventSource>,
    ) -> Self {
        let writer = Arc::new(LogWriter::new(config.log_dir.clone()));
        Self::with_writer(config, inspector, events, writer)
    }

    /// Like [`new`](Self::new), with a writer shared with the host (for
    /// example the one behind the Debug `tracing` layer).
    pub fn with_writer(
        config: MonitorConfig,
        inspector: Arc<dyn WindowInspector>,
        events: Box<dyn ProcessEventSource>,
        writer: Arc<LogWriter>,
    ) -> Self {
        let state = Arc::new(Mutex::new(TrackerState::new(&config)));
        Self {
            config,
            inspector,
            events,
            state,
            writer,
            ticker: None,
            disposed: false,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn writer(&self) -> &Arc<LogWriter> {
        &self.writer
    }

    pub fn is_running(&self) -> bool {
        self.ticker.is_some()
    }

    fn system(&self, event: SystemEvent) {
        self.writer.record(&ActivityRecord::System {
            event,
            at: Local::now(),
        });
    }

    /// Starts the tick timer and subscribes to process events.
    ///
    /// Calling it on a running monitor does nothing.
    pub fn start(&mut self) -> Result<()> {
        if self.disposed {
            return Err(MonitorError::Disposed);
        }
        if self.is_running() {
            return Ok(());
        }

        if let Err(e) = self.writer.ensure_dir() {
            tracing::warn!(dir = %self.writer.dir().display(), error = %e, "Cannot create log directory");
        }
        match serde_json::to_string(&self.config) {
            Ok(json) => tracing::debug!(config = %json, "Monitor configuration"),
            Err(e) => tracing::debug!(error = %e, "Cannot render configuration"),
        }

        self.system(SystemEvent::Startup);

        let handler = process_event_handler(Arc::clone(&self.state), Arc::clone(&self.writer));
        if let Err(e) = self.events.subscribe(handler) {
            tracing::error!(error = %e, "Process event subscription failed");
            self.system(SystemEvent::Shutdown);
            return Err(e);
        }

        let (stop_tx, stop_rx) = bounded(1);
        let state = Arc::clone(&self.state);
        let inspector = Arc::clone(&self.inspector);
        let writer = Arc::clone(&self.writer);
        let interval = self.config.poll_interval;

        let spawned = thread::Builder::new()
            .name("actmon-tick".to_string())
            .spawn(move || run_ticker(state, inspector, writer, interval, stop_rx));
        let handle = match spawned {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(error = %e, "Cannot start the tick thread");
                self.events.unsubscribe();
                self.system(SystemEvent::Shutdown);
                return Err(MonitorError::Timer(e));
            }
        };

        self.ticker = Some(Ticker { stop_tx, handle });
        tracing::info!(
            interval_ms = interval.as_millis() as u64,
            dir = %self.writer.dir().display(),
            "Activity monitor started"
        );
        Ok(())
    }

    /// Stops ticking, unsubscribes and closes everything still open.
    ///
    /// Calling it on a stopped monitor does nothing.
    pub fn stop(&mut self) {
        let Some(ticker) = self.ticker.take() else {
            return;
        };

        let _ = ticker.stop_tx.send(());
        if ticker.handle.join().is_err() {
            tracing::error!("Tick thread panicked");
        }
        self.events.unsubscribe();

        let records = lock(&self.state).close_all(Local::now());
        self.writer.record_all(&records);
        self.system(SystemEvent::Shutdown);

        tracing::info!(closed = records.len(), "Activity monitor stopped");
    }

    /// Stops the monitor and makes it unusable. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop();
        self.disposed = true;
    }

    /// Aggregated activity of the current local day, open sessions
    /// included.
    pub fn today_statistics(&self) -> TodayStatistics {
        let now = Local::now();
        let state = lock(&self.state);
        let tracker = &state.browsers;

        compute_today_statistics(
            state
                .sessions
                .completed_sessions()
                .iter()
                .chain(state.sessions.open_sessions()),
            tracker
                .completed_sessions()
                .iter()
                .chain(tracker.open_sessions()),
            |visit| tracker.should_log(visit),
            now,
        )
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.dispose();
    }
}
