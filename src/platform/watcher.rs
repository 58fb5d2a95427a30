//! Process start/stop notifications from process-table snapshots.
//!
//! A background thread snapshots the process table at a fixed interval and
//! pushes the difference to the subscribed handler. The first snapshot is
//! taken during [`subscribe`](ProcessEventSource::subscribe) and only serves
//! as the baseline.

use super::{
    display_process_name, ProcessEvent, ProcessEventHandler, ProcessEventSource, WindowInspector,
};
use crate::error::{MonitorError, Result};
use crate::store::ProcessInfo;
use chrono::Local;
use crossbeam_channel::{bounded, select, tick, Sender};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

type Snapshot = HashMap<u32, String>;

struct Worker {
    stop_tx: Sender<()>,
    handle: JoinHandle<()>,
}

/// [`ProcessEventSource`] backed by periodic process-table snapshots.
pub struct ProcessWatcher {
    inspector: Arc<dyn WindowInspector>,
    interval: Duration,
    worker: Option<Worker>,
}

impl ProcessWatcher {
    pub fn new(inspector: Arc<dyn WindowInspector>, interval: Duration) -> Self {
        Self {
            inspector,
            interval,
            worker: None,
        }
    }
}

fn snapshot(inspector: &dyn WindowInspector) -> Snapshot {
    inspector
        .processes()
        .into_iter()
        .map(|p| (p.pid, p.name))
        .collect()
}

/// Processes that appeared and disappeared between two snapshots.
///
/// A pid listed under a different name counts as a stop followed by a
/// start (pid reuse).
fn diff_snapshots(previous: &Snapshot, current: &Snapshot) -> (Vec<(u32, String)>, Vec<(u32, String)>) {
    let mut started: Vec<(u32, String)> = current
        .iter()
        .filter(|(pid, name)| previous.get(pid) != Some(name))
        .map(|(pid, name)| (*pid, name.clone()))
        .collect();
    let mut stopped: Vec<(u32, String)> = previous
        .iter()
        .filter(|(pid, name)| current.get(pid) != Some(name))
        .map(|(pid, name)| (*pid, name.clone()))
        .collect();

    started.sort_by_key(|(pid, _)| *pid);
    stopped.sort_by_key(|(pid, _)| *pid);
    (started, stopped)
}

fn deliver(handler: &ProcessEventHandler, event: ProcessEvent) {
    if catch_unwind(AssertUnwindSafe(|| handler(event))).is_err() {
        tracing::error!("Process event handler panicked");
    }
}

fn run(
    inspector: Arc<dyn WindowInspector>,
    interval: Duration,
    handler: ProcessEventHandler,
    mut previous: Snapshot,
    stop_rx: crossbeam_channel::Receiver<()>,
) {
    let ticker = tick(interval);

    loop {
        select! {
            recv(stop_rx) -> _ => break,
            recv(ticker) -> _ => {
                let current = snapshot(inspector.as_ref());
                if current.is_empty() {
                    // Failed sample
                    continue;
                }

                let (started, stopped) = diff_snapshots(&previous, &current);
                let now = Local::now();

                for (pid, name) in stopped {
                    deliver(&handler, ProcessEvent::Stopped(ProcessInfo {
                        process_name: display_process_name(&name),
                        process_id: pid,
                        start_time: None,
                        end_time: Some(now),
                        file_path: String::new(),
                    }));
                }
                for (pid, name) in started {
                    deliver(&handler, ProcessEvent::Started(ProcessInfo {
                        process_name: display_process_name(&name),
                        process_id: pid,
                        start_time: Some(now),
                        end_time: None,
                        file_path: inspector.process_path(pid).unwrap_or_default(),
                    }));
                }

                previous = current;
            }
        }
    }

    tracing::debug!("Process watcher thread exiting");
}

impl ProcessEventSource for ProcessWatcher {
    fn subscribe(&mut self, handler: ProcessEventHandler) -> Result<()> {
        if self.worker.is_some() {
            return Err(MonitorError::AlreadySubscribed);
        }

        let baseline = snapshot(self.inspector.as_ref());
        let (stop_tx, stop_rx) = bounded(1);
        let inspector = Arc::clone(&self.inspector);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("actmon-process-watcher".to_string())
            .spawn(move || run(inspector, interval, handler, baseline, stop_rx))
            .map_err(|e| MonitorError::EventSource(e.to_string()))?;

        tracing::debug!(
            interval_ms = self.interval.as_millis() as u64,
            "Process watcher subscribed"
        );
        self.worker = Some(Worker { stop_tx, handle });
        Ok(())
    }

    fn unsubscribe(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        let _ = worker.stop_tx.send(());
        if worker.handle.join().is_err() {
            tracing::error!("Process watcher thread panicked");
        }
        tracing::debug!("Process watcher unsubscribed");
    }

    fn is_subscribed(&self) -> bool {
        self.worker.is_some()
    }
}

impl Drop for ProcessWatcher {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
