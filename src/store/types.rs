//! Data types for activity tracking.
//!
//! Defines the session and visit records kept by the trackers and the
//! [`ActivityRecord`]s they hand to the log writer.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};

/// Opaque OS window handle (HWND on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl std::fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Elapsed time between two instants, clamped at zero.
pub fn span(start: DateTime<Local>, end: DateTime<Local>) -> Duration {
    (end - start).max(Duration::zero())
}

/// A focus session of a non-browser application.
///
/// Created when a window of the process first takes the foreground and
/// closed when its title changes or the process exits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationSession {
    /// Process name without the `.exe` extension.
    pub process_name: String,

    /// Title of the foreground window at session start.
    pub window_title: String,

    pub process_id: u32,

    pub start_time: DateTime<Local>,

    /// `None` while the session is open.
    pub end_time: Option<DateTime<Local>>,

    /// Full executable path, empty when it could not be resolved.
    pub file_path: String,
}

impl ApplicationSession {
    pub fn new(
        process_name: String,
        window_title: String,
        process_id: u32,
        file_path: String,
        now: DateTime<Local>,
    ) -> Self {
        Self {
            process_name,
            window_title,
            process_id,
            start_time: now,
            end_time: None,
            file_path,
        }
    }

    /// Builds a session record from a pushed process notification.
    pub fn from_process(info: &ProcessInfo, now: DateTime<Local>) -> Self {
        Self {
            process_name: info.process_name.clone(),
            window_title: String::new(),
            process_id: info.process_id,
            start_time: info.start_time.unwrap_or(now),
            end_time: info.end_time,
            file_path: info.file_path.clone(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Sets the end time. Closing twice keeps the first end time.
    pub fn close(&mut self, now: DateTime<Local>) {
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }

    /// Duration so far, measured against `now` while still open.
    pub fn duration(&self, now: DateTime<Local>) -> Duration {
        span(self.start_time, self.end_time.unwrap_or(now))
    }
}

/// Lifecycle events written to the Applications log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppEvent {
    Activated,
    WindowChanged,
    NewWindow,
    Opened,
    Closed,
    AutoClosed,
}

impl AppEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Activated => "Activated",
            Self::WindowChanged => "WindowChanged",
            Self::NewWindow => "NewWindow",
            Self::Opened => "Opened",
            Self::Closed => "Closed",
            Self::AutoClosed => "AutoClosed",
        }
    }
}

/// A period during which one browser window displayed one classified URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlVisit {
    pub url: String,
    pub title: String,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    #[serde(skip)]
    pub window_handle: WindowHandle,
}

impl UrlVisit {
    pub fn new(url: String, title: String, window_handle: WindowHandle, now: DateTime<Local>) -> Self {
        Self {
            url,
            title,
            start_time: now,
            end_time: None,
            window_handle,
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    pub fn close(&mut self, now: DateTime<Local>) {
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }

    /// Restarts a closed visit in place.
    pub fn reopen(&mut self, now: DateTime<Local>) {
        self.start_time = now;
        self.end_time = None;
    }

    pub fn duration(&self, now: DateTime<Local>) -> Duration {
        span(self.start_time, self.end_time.unwrap_or(now))
    }
}

/// Presence of one browser executable, with every visit observed in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserSession {
    pub browser_name: String,
    pub start_time: DateTime<Local>,
    pub end_time: Option<DateTime<Local>>,
    pub visits: Vec<UrlVisit>,
}

impl BrowserSession {
    pub fn new(browser_name: String, now: DateTime<Local>) -> Self {
        Self {
            browser_name,
            start_time: now,
            end_time: None,
            visits: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Closes the session and every visit still open in it.
    pub fn close(&mut self, now: DateTime<Local>) {
        for visit in self.visits.iter_mut().filter(|v| v.is_open()) {
            visit.close(now);
        }
        if self.end_time.is_none() {
            self.end_time = Some(now);
        }
    }

    pub fn duration(&self, now: DateTime<Local>) -> Duration {
        span(self.start_time, self.end_time.unwrap_or(now))
    }
}

/// Per-URL totals listed in the aggregated browser entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSummary {
    pub url: String,
    /// Title of the most recent visit.
    pub title: String,
    pub visit_count: u32,
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

/// Information pushed by the process event source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub process_name: String,
    pub process_id: u32,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
    pub file_path: String,
}

/// Events written to the System log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemEvent {
    Startup,
    Shutdown,
}

impl SystemEvent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Startup => "Startup",
            Self::Shutdown => "Shutdown",
        }
    }
}

/// Secondary visit transitions, logged only under
/// [`UrlTransitionPolicy::Logged`](crate::config::UrlTransitionPolicy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrlTransition {
    /// A closed visit became current again.
    Reopened,
    /// The visit ended because another window took the focus.
    Switched,
}

impl UrlTransition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Reopened => "UrlReopened",
            Self::Switched => "UrlSwitched",
        }
    }
}

/// A state transition to be persisted by the log writer.
///
/// Trackers produce these while holding the tracker lock; the engine
/// writes them after releasing it.
#[derive(Debug, Clone, PartialEq)]
pub enum ActivityRecord {
    Application {
        event: AppEvent,
        session: ApplicationSession,
    },
    UrlOpened {
        browser: String,
        visit: UrlVisit,
    },
    UrlTransition {
        transition: UrlTransition,
        browser: String,
        visit: UrlVisit,
    },
    BrowserSession {
        session: BrowserSession,
        urls: Vec<UrlSummary>,
    },
    System {
        event: SystemEvent,
        at: DateTime<Local>,
    },
}

pub(crate) mod duration_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.num_seconds().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::seconds(i64::deserialize(deserializer)?))
    }
}
