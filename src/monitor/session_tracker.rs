//! Focus sessions of non-browser applications.
//!
//! Each process id has at most one open [`ApplicationSession`]. The
//! tracker is driven by two inputs: the poll tick, which watches the
//! foreground window, and pushed process notifications.

use crate::platform::{display_process_name, normalize_process_name, WindowInspector};
use crate::store::{ActivityRecord, AppEvent, ApplicationSession, ProcessInfo, WindowHandle};
use chrono::{DateTime, Duration, Local};
use std::collections::{HashMap, HashSet};

/// Open/closed application sessions, keyed by process id.
#[derive(Debug)]
pub struct SessionTracker {
    browsers: HashSet<String>,
    debounce: Duration,
    log_process_events: bool,
    last_foreground: Option<WindowHandle>,
    last_activity: Option<DateTime<Local>>,
    open: HashMap<u32, ApplicationSession>,
    /// Sessions closed today, oldest first.
    completed: Vec<ApplicationSession>,
}

impl SessionTracker {
    pub fn new(browsers: &[String], debounce: std::time::Duration, log_process_events: bool) -> Self {
        Self {
            browsers: browsers.iter().map(|b| normalize_process_name(b)).collect(),
            debounce: Duration::from_std(debounce).unwrap_or_else(|_| Duration::minutes(1)),
            log_process_events,
            last_foreground: None,
            last_activity: None,
            open: HashMap::new(),
            completed: Vec::new(),
        }
    }

    pub fn is_browser(&self, process_name: &str) -> bool {
        self.browsers.contains(&normalize_process_name(process_name))
    }

    pub fn open_sessions(&self) -> impl Iterator<Item = &ApplicationSession> {
        self.open.values()
    }

    pub fn open_session(&self, pid: u32) -> Option<&ApplicationSession> {
        self.open.get(&pid)
    }

    pub fn completed_sessions(&self) -> &[ApplicationSession] {
        &self.completed
    }

    fn finish(&mut self, mut session: ApplicationSession, now: DateTime<Local>) -> ApplicationSession {
        session.close(now);
        self.completed.push(session.clone());
        session
    }

    /// Examines the foreground window.
    ///
    /// Nothing is mutated unless the window's owner could be resolved.
    pub fn tick(&mut self, inspector: &dyn WindowInspector, now: DateTime<Local>) -> Vec<ActivityRecord> {
        let Some(hwnd) = inspector.foreground_window() else {
            return Vec::new();
        };
        if !inspector.is_visible(hwnd) {
            return Vec::new();
        }

        if self.last_foreground == Some(hwnd) {
            let recent = self
                .last_activity
                .is_some_and(|last| now - last <= self.debounce);
            if recent {
                return Vec::new();
            }
        }

        let pid = inspector.owning_process_id(hwnd);
        if pid == 0 {
            return Vec::new();
        }
        let Some(raw_name) = inspector.process_name(pid) else {
            tracing::debug!(pid, "Foreground process name unavailable, skipping tick");
            return Vec::new();
        };
        let title = inspector.title(hwnd);

        self.last_foreground = Some(hwnd);
        self.last_activity = Some(now);

        if self.is_browser(&raw_name) {
            return Vec::new();
        }

        let mut records = Vec::new();
        match self.open.get(&pid) {
            None => {
                let session = ApplicationSession::new(
                    display_process_name(&raw_name),
                    title,
                    pid,
                    inspector.process_path(pid).unwrap_or_default(),
                    now,
                );
                tracing::debug!(pid, process = %session.process_name, title = %session.window_title, "Application activated");
                self.open.insert(pid, session.clone());
                records.push(ActivityRecord::Application {
                    event: AppEvent::Activated,
                    session,
                });
            }
            Some(existing) if existing.window_title != title => {
                let next = ApplicationSession::new(
                    existing.process_name.clone(),
                    title,
                    pid,
                    existing.file_path.clone(),
                    now,
                );
                let Some(previous) = self.open.insert(pid, next.clone()) else {
                    return records;
                };
                let previous = self.finish(previous, now);
                tracing::debug!(pid, from = %previous.window_title, to = %next.window_title, "Window title changed");
                records.push(ActivityRecord::Application {
                    event: AppEvent::WindowChanged,
                    session: previous,
                });
                records.push(ActivityRecord::Application {
                    event: AppEvent::NewWindow,
                    session: next,
                });
            }
            Some(_) => {}
        }
        records
    }

    /// Handles a pushed process start.
    pub fn on_process_started(&mut self, info: &ProcessInfo, now: DateTime<Local>) -> Vec<ActivityRecord> {
        if !self.log_process_events || self.is_browser(&info.process_name) {
            return Vec::new();
        }
        vec![ActivityRecord::Application {
            event: AppEvent::Opened,
            session: ApplicationSession::from_process(info, now),
        }]
    }

    /// Handles a pushed process exit.
    ///
    /// A tracked open session for the pid is closed; otherwise a standalone
    /// entry is built from the notification itself.
    pub fn on_process_stopped(&mut self, info: &ProcessInfo, now: DateTime<Local>) -> Vec<ActivityRecord> {
        if self.is_browser(&info.process_name) {
            return Vec::new();
        }

        if let Some(session) = self.open.remove(&info.process_id) {
            let session = self.finish(session, now);
            tracing::debug!(pid = info.process_id, process = %session.process_name, "Tracked application closed");
            return vec![ActivityRecord::Application {
                event: AppEvent::Closed,
                session,
            }];
        }

        if !self.log_process_events {
            return Vec::new();
        }
        let mut session = ApplicationSession::from_process(info, now);
        session.close(info.end_time.unwrap_or(now));
        vec![ActivityRecord::Application {
            event: AppEvent::Closed,
            session,
        }]
    }

    /// Force-closes every open session.
    pub fn close_all(&mut self, now: DateTime<Local>) -> Vec<ActivityRecord> {
        let mut pids: Vec<u32> = self.open.keys().copied().collect();
        pids.sort_unstable();

        let mut records = Vec::with_capacity(pids.len());
        for pid in pids {
            if let Some(session) = self.open.remove(&pid) {
                records.push(ActivityRecord::Application {
                    event: AppEvent::AutoClosed,
                    session: self.finish(session, now),
                });
            }
        }
        self.last_foreground = None;
        self.last_activity = None;
        records
    }

    /// Drops completed sessions that ended before `today`.
    pub fn prune_before(&mut self, today: chrono::NaiveDate) {
        self.completed
            .retain(|s| s.end_time.unwrap_or(s.start_time).date_naive() >= today);
    }
}
