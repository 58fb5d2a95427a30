//! Browser presence and per-window URL visits.
//!
//! Every tick the process table is checked for each allow-listed browser.
//! A browser that appears gets a [`BrowserSession`]; one that disappears
//! has its session closed and summarised in a single Browser entry. The
//! visible windows of running browsers are classified into URL keys and
//! tracked as [`UrlVisit`]s, deduplicated per (browser, url, window).

use super::classify::{classify_title, is_suppressed};
use crate::config::UrlTransitionPolicy;
use crate::platform::{normalize_process_name, WindowInspector, WindowSnapshot};
use crate::store::{
    ActivityRecord, BrowserSession, UrlSummary, UrlTransition, UrlVisit, WindowHandle,
};
use chrono::{DateTime, Duration, Local};
use std::collections::{HashMap, HashSet};

/// Identity of a trackable visit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VisitKey {
    pub browser: String,
    pub url: String,
    pub window: WindowHandle,
}

#[derive(Debug)]
pub struct BrowserTracker {
    browsers: Vec<String>,
    suppressed_markers: Vec<String>,
    retention: Duration,
    policy: UrlTransitionPolicy,
    /// Open sessions by browser name.
    sessions: HashMap<String, BrowserSession>,
    /// Dedup map into `sessions[key.browser].visits`.
    active: HashMap<VisitKey, usize>,
    known_windows: HashMap<WindowHandle, String>,
    /// Sessions closed today.
    completed: Vec<BrowserSession>,
}

impl BrowserTracker {
    pub fn new(
        browsers: &[String],
        suppressed_markers: &[String],
        retention: std::time::Duration,
        policy: UrlTransitionPolicy,
    ) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for name in browsers.iter().map(|b| normalize_process_name(b)) {
            if !normalized.contains(&name) {
                normalized.push(name);
            }
        }

        Self {
            browsers: normalized,
            suppressed_markers: suppressed_markers.to_vec(),
            retention: Duration::from_std(retention).unwrap_or_else(|_| Duration::minutes(5)),
            policy,
            sessions: HashMap::new(),
            active: HashMap::new(),
            known_windows: HashMap::new(),
            completed: Vec::new(),
        }
    }

    pub fn session(&self, browser: &str) -> Option<&BrowserSession> {
        self.sessions.get(browser)
    }

    pub fn open_sessions(&self) -> impl Iterator<Item = &BrowserSession> {
        self.sessions.values()
    }

    pub fn completed_sessions(&self) -> &[BrowserSession] {
        &self.completed
    }

    pub fn visit(&self, key: &VisitKey) -> Option<&UrlVisit> {
        let index = *self.active.get(key)?;
        self.sessions.get(&key.browser)?.visits.get(index)
    }

    pub fn tracked_keys(&self) -> impl Iterator<Item = &VisitKey> {
        self.active.keys()
    }

    /// Whether a visit is written to the log.
    pub fn should_log(&self, visit: &UrlVisit) -> bool {
        !is_suppressed(&visit.title, &visit.url, &self.suppressed_markers)
    }

    fn visit_mut(&mut self, key: &VisitKey) -> Option<&mut UrlVisit> {
        let index = *self.active.get(key)?;
        self.sessions.get_mut(&key.browser)?.visits.get_mut(index)
    }

    pub fn tick(&mut self, inspector: &dyn WindowInspector, now: DateTime<Local>) -> Vec<ActivityRecord> {
        let processes = inspector.processes();
        if processes.is_empty() {
            // Failed sample; never a real process table
            return Vec::new();
        }

        let mut pids_by_name: HashMap<String, HashSet<u32>> = HashMap::new();
        for process in processes {
            let name = normalize_process_name(&process.name);
            if self.browsers.contains(&name) {
                pids_by_name.entry(name).or_default().insert(process.pid);
            }
        }

        let foreground = inspector.foreground_window();
        let mut observed: Vec<(String, WindowSnapshot)> = Vec::new();
        let mut current_windows: HashSet<WindowHandle> = HashSet::new();

        for browser in self.browsers.clone() {
            let Some(pids) = pids_by_name.get(&browser) else {
                continue;
            };

            if !self.sessions.contains_key(&browser) {
                tracing::debug!(browser = %browser, "Browser started");
                self.sessions
                    .insert(browser.clone(), BrowserSession::new(browser.clone(), now));
            }

            for window in inspector.enumerate_windows(pids) {
                current_windows.insert(window.handle);
                if !self.known_windows.contains_key(&window.handle) {
                    tracing::debug!(browser = %browser, window = %window.handle, title = %window.title, "New browser window");
                    self.known_windows.insert(window.handle, window.title.clone());
                }
                // IME candidate popups and the like are not pages
                if is_suppressed(&window.class_name, "", &self.suppressed_markers) {
                    continue;
                }
                observed.push((browser.clone(), window));
            }
        }

        let mut closed_windows: HashSet<WindowHandle> = HashSet::new();
        self.known_windows.retain(|handle, title| {
            let alive = current_windows.contains(handle);
            if !alive {
                tracing::debug!(window = %handle, title = %title, "Browser window closed");
                closed_windows.insert(*handle);
            }
            alive
        });

        let focus = foreground.filter(|h| current_windows.contains(h));
        let mut records = Vec::new();
        let mut seen: HashSet<VisitKey> = HashSet::new();

        if !closed_windows.is_empty() {
            self.close_where(
                |key| closed_windows.contains(&key.window),
                UrlTransition::Switched,
                now,
                &mut records,
            );
        }

        for (browser, window) in &observed {
            if window.title.trim().is_empty() {
                continue;
            }
            let key = self.observe(browser, window, focus, now, &mut records);
            seen.insert(key);
        }

        if let Some(focused) = focus {
            self.close_where(|key| key.window != focused, UrlTransition::Switched, now, &mut records);
        }

        let ended: Vec<String> = self
            .sessions
            .keys()
            .filter(|b| !pids_by_name.contains_key(*b))
            .cloned()
            .collect();
        for browser in ended {
            if let Some(record) = self.end_session(&browser, now) {
                tracing::debug!(browser = %browser, "Browser closed");
                records.push(record);
            }
        }

        self.evict_stale(&seen, now);
        records
    }

    /// Applies one classified window observation and returns its key.
    fn observe(
        &mut self,
        browser: &str,
        window: &WindowSnapshot,
        focus: Option<WindowHandle>,
        now: DateTime<Local>,
        records: &mut Vec<ActivityRecord>,
    ) -> VisitKey {
        let classified = classify_title(&window.title, browser);
        let key = VisitKey {
            browser: browser.to_string(),
            url: classified.url.clone(),
            window: window.handle,
        };

        // A window shows one URL at a time
        let current = key.clone();
        self.close_where(
            |k| k.window == current.window && *k != current,
            UrlTransition::Switched,
            now,
            records,
        );

        let in_background = focus.is_some_and(|f| f != window.handle);
        let policy = self.policy;

        match self.active.get(&key).copied() {
            None => {
                let Some(session) = self.sessions.get_mut(browser) else {
                    return key;
                };
                let visit = UrlVisit::new(classified.url, classified.title, window.handle, now);
                session.visits.push(visit.clone());
                self.active.insert(key.clone(), session.visits.len() - 1);

                if self.should_log(&visit) {
                    tracing::debug!(browser, url = %visit.url, title = %visit.title, "New URL visit");
                    records.push(ActivityRecord::UrlOpened {
                        browser: browser.to_string(),
                        visit,
                    });
                } else {
                    tracing::debug!(browser, url = %visit.url, title = %visit.title, "Ignoring URL visit");
                }
            }
            Some(_) => {
                let Some(visit) = self.visit_mut(&key) else {
                    return key;
                };
                if visit.title != classified.title {
                    tracing::debug!(from = %visit.title, to = %classified.title, "Page title updated");
                    visit.title = classified.title;
                }
                if !visit.is_open() && !in_background {
                    visit.reopen(now);
                    tracing::debug!(browser, url = %visit.url, "URL visit reopened");
                    let snapshot = visit.clone();
                    if policy == UrlTransitionPolicy::Logged && self.should_log(&snapshot) {
                        records.push(ActivityRecord::UrlTransition {
                            transition: UrlTransition::Reopened,
                            browser: browser.to_string(),
                            visit: snapshot,
                        });
                    }
                }
            }
        }

        key
    }

    /// Closes open visits whose key matches `predicate`.
    fn close_where<F>(
        &mut self,
        predicate: F,
        transition: UrlTransition,
        now: DateTime<Local>,
        records: &mut Vec<ActivityRecord>,
    ) where
        F: Fn(&VisitKey) -> bool,
    {
        let mut targets: Vec<VisitKey> = self
            .active
            .keys()
            .filter(|k| predicate(k))
            .cloned()
            .collect();
        targets.sort();

        for key in targets {
            let Some(visit) = self.visit_mut(&key) else {
                continue;
            };
            if !visit.is_open() {
                continue;
            }
            visit.close(now);
            tracing::debug!(browser = %key.browser, url = %key.url, "URL visit ended");
            let snapshot = visit.clone();
            if self.policy == UrlTransitionPolicy::Logged && self.should_log(&snapshot) {
                records.push(ActivityRecord::UrlTransition {
                    transition,
                    browser: key.browser.clone(),
                    visit: snapshot,
                });
            }
        }
    }

    /// Closes a browser session and builds its aggregated entry.
    fn end_session(&mut self, browser: &str, now: DateTime<Local>) -> Option<ActivityRecord> {
        let mut session = self.sessions.remove(browser)?;
        session.close(now);
        self.active.retain(|key, _| key.browser != browser);

        let urls = self.summarize(&session, now);
        self.completed.push(session.clone());
        Some(ActivityRecord::BrowserSession { session, urls })
    }

    /// Per-URL totals of the loggable visits, in order of first appearance.
    pub fn summarize(&self, session: &BrowserSession, now: DateTime<Local>) -> Vec<UrlSummary> {
        let mut summaries: Vec<UrlSummary> = Vec::new();
        for visit in session.visits.iter().filter(|v| self.should_log(v)) {
            let duration = visit.duration(now);
            match summaries.iter_mut().find(|s| s.url == visit.url) {
                Some(summary) => {
                    summary.visit_count += 1;
                    summary.total = summary.total + duration;
                    summary.title = visit.title.clone();
                }
                None => summaries.push(UrlSummary {
                    url: visit.url.clone(),
                    title: visit.title.clone(),
                    visit_count: 1,
                    total: duration,
                }),
            }
        }
        summaries
    }

    /// Drops closed visits older than the retention period from the dedup
    /// map, unless their window still shows them.
    fn evict_stale(&mut self, seen: &HashSet<VisitKey>, now: DateTime<Local>) {
        let retention = self.retention;
        let sessions = &self.sessions;
        self.active.retain(|key, index| {
            if seen.contains(key) {
                return true;
            }
            match sessions.get(&key.browser).and_then(|s| s.visits.get(*index)) {
                Some(visit) => match visit.end_time {
                    Some(end) => now - end <= retention,
                    None => true,
                },
                None => false,
            }
        });
    }

    /// Closes every browser session and visit.
    pub fn close_all(&mut self, now: DateTime<Local>) -> Vec<ActivityRecord> {
        let mut browsers: Vec<String> = self.sessions.keys().cloned().collect();
        browsers.sort();

        let records = browsers
            .iter()
            .filter_map(|b| self.end_session(b, now))
            .collect();
        self.active.clear();
        self.known_windows.clear();
        records
    }

    pub fn prune_before(&mut self, today: chrono::NaiveDate) {
        self.completed
            .retain(|s| s.end_time.unwrap_or(s.start_time).date_naive() >= today);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MonitorConfig;
    use crate::platform::fake::FakeInspector;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 2, 14, 0, 0).unwrap()
    }

    fn tracker_with(policy: UrlTransitionPolicy) -> BrowserTracker {
        let config = MonitorConfig::default();
        BrowserTracker::new(
            &config.browsers,
            &config.suppressed_markers,
            config.visit_retention,
            policy,
        )
    }

    fn tracker() -> BrowserTracker {
        tracker_with(UrlTransitionPolicy::Suppressed)
    }

    /// A process table with one unrelated process so samples are never empty.
    fn inspector() -> FakeInspector {
        let inspector = FakeInspector::new();
        inspector.add_process(1, "explorer.exe");
        inspector
    }

    fn opened_urls(records: &[ActivityRecord]) -> Vec<String> {
        records
            .iter()
            .filter_map(|r| match r {
                ActivityRecord::UrlOpened { visit, .. } => Some(visit.url.clone()),
                _ => None,
            })
            .collect()
    }

    fn key(browser: &str, url: &str, window: isize) -> VisitKey {
        VisitKey {
            browser: browser.to_string(),
            url: url.to_string(),
            window: WindowHandle(window),
        }
    }

    #[test]
    fn test_browser_appearance_opens_session() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        let mut tracker = tracker();

        assert!(tracker.tick(&inspector, t0()).is_empty());
        let session = tracker.session("chrome").unwrap();
        assert!(session.is_open());
        assert_eq!(session.start_time, t0());
    }

    #[test]
    fn test_new_url_logged_once() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "https://example.com/page - Google Chrome");
        let mut tracker = tracker();

        let first = tracker.tick(&inspector, t0());
        let second = tracker.tick(&inspector, t0() + Duration::seconds(2));

        assert_eq!(opened_urls(&first), vec!["https://example.com/page".to_string()]);
        assert!(opened_urls(&second).is_empty());
        assert_eq!(tracker.session("chrome").unwrap().visits.len(), 1);
    }

    #[test]
    fn test_same_url_in_two_windows_tracked_separately() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Docs - Google Chrome");
        inspector.add_window(501, 50, "Docs - Google Chrome");
        let mut tracker = tracker();

        let records = tracker.tick(&inspector, t0());

        assert_eq!(opened_urls(&records).len(), 2);
        assert!(tracker.visit(&key("chrome", "Docs", 500)).is_some());
        assert!(tracker.visit(&key("chrome", "Docs", 501)).is_some());
    }

    #[test]
    fn test_new_tab_tracked_but_not_logged() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "New Tab - Google Chrome");
        inspector.add_process(60, "firefox.exe");
        inspector.add_window(600, 60, "new tab — Mozilla Firefox");
        let mut tracker = tracker();

        let records = tracker.tick(&inspector, t0());

        assert!(opened_urls(&records).is_empty());
        assert!(tracker.visit(&key("chrome", "New Tab", 500)).is_some());
        assert_eq!(tracker.tracked_keys().count(), 2);
    }

    #[test]
    fn test_focus_closes_other_windows_without_logging() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "Beta - Google Chrome");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        inspector.focus(Some(501));
        let records = tracker.tick(&inspector, t0() + Duration::seconds(2));

        assert!(records.is_empty());
        assert!(!tracker.visit(&key("chrome", "Alpha", 500)).unwrap().is_open());
        assert!(tracker.visit(&key("chrome", "Beta", 501)).unwrap().is_open());

        // Background window stays closed while another window has focus
        tracker.tick(&inspector, t0() + Duration::seconds(4));
        assert!(!tracker.visit(&key("chrome", "Alpha", 500)).unwrap().is_open());
    }

    #[test]
    fn test_switching_back_reopens_in_place_silently() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "Beta - Google Chrome");
        let mut tracker = tracker();

        inspector.focus(Some(500));
        tracker.tick(&inspector, t0());
        inspector.focus(Some(501));
        tracker.tick(&inspector, t0() + Duration::seconds(2));
        inspector.focus(Some(500));
        let records = tracker.tick(&inspector, t0() + Duration::seconds(4));

        assert!(records.is_empty());
        let alpha = tracker.visit(&key("chrome", "Alpha", 500)).unwrap();
        assert!(alpha.is_open());
        assert_eq!(alpha.start_time, t0() + Duration::seconds(4));
        assert_eq!(tracker.session("chrome").unwrap().visits.len(), 2);
    }

    #[test]
    fn test_logged_policy_emits_transitions() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "Beta - Google Chrome");
        let mut tracker = tracker_with(UrlTransitionPolicy::Logged);

        inspector.focus(Some(500));
        tracker.tick(&inspector, t0());
        inspector.focus(Some(501));
        let records = tracker.tick(&inspector, t0() + Duration::seconds(2));

        let transitions: Vec<(UrlTransition, String)> = records
            .iter()
            .filter_map(|r| match r {
                ActivityRecord::UrlTransition { transition, visit, .. } => {
                    Some((*transition, visit.url.clone()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (UrlTransition::Reopened, "Beta".to_string()),
                (UrlTransition::Switched, "Alpha".to_string()),
            ]
        );
    }

    #[test]
    fn test_title_change_within_same_key_is_silent() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Inbox https://mail.example.com - Google Chrome");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        inspector.set_title(500, "Inbox (2) https://mail.example.com - Google Chrome");
        let records = tracker.tick(&inspector, t0() + Duration::seconds(2));

        assert!(records.is_empty());
        let visit = tracker.visit(&key("chrome", "https://mail.example.com", 500)).unwrap();
        assert_eq!(visit.title, "Inbox (2) https://mail.example.com");
    }

    #[test]
    fn test_navigation_closes_previous_visit_of_window() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "First - Google Chrome");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        inspector.set_title(500, "Second - Google Chrome");
        let records = tracker.tick(&inspector, t0() + Duration::seconds(2));

        assert_eq!(opened_urls(&records), vec!["Second".to_string()]);
        assert!(!tracker.visit(&key("chrome", "First", 500)).unwrap().is_open());
        assert!(tracker.visit(&key("chrome", "Second", 500)).unwrap().is_open());
    }

    #[test]
    fn test_browser_exit_closes_and_aggregates() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "New Tab - Google Chrome");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        inspector.remove_process(50);
        let records = tracker.tick(&inspector, t0() + Duration::minutes(10));

        assert_eq!(records.len(), 1);
        match &records[0] {
            ActivityRecord::BrowserSession { session, urls } => {
                assert_eq!(session.browser_name, "chrome");
                assert_eq!(session.end_time, Some(t0() + Duration::minutes(10)));
                assert!(session.visits.iter().all(|v| !v.is_open()));
                assert_eq!(urls.len(), 1);
                assert_eq!(urls[0].url, "Alpha");
                assert_eq!(urls[0].total, Duration::minutes(10));
            }
            other => panic!("unexpected record {other:?}"),
        }
        assert!(tracker.session("chrome").is_none());
        assert_eq!(tracker.tracked_keys().count(), 0);
        assert_eq!(tracker.completed_sessions().len(), 1);
    }

    #[test]
    fn test_summary_merges_visits_of_same_url() {
        let tracker = tracker();
        let mut session = BrowserSession::new("firefox".to_string(), t0());
        for (window, minutes) in [(1, 3), (2, 4)] {
            let mut visit = UrlVisit::new("Docs".to_string(), format!("Docs {window}"), WindowHandle(window), t0());
            visit.close(t0() + Duration::minutes(minutes));
            session.visits.push(visit);
        }

        let urls = tracker.summarize(&session, t0());

        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].visit_count, 2);
        assert_eq!(urls[0].total, Duration::minutes(7));
        assert_eq!(urls[0].title, "Docs 2");
    }

    #[test]
    fn test_empty_process_sample_changes_nothing() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        let empty = FakeInspector::new();
        assert!(tracker.tick(&empty, t0() + Duration::seconds(2)).is_empty());
        assert!(tracker.session("chrome").is_some());
    }

    #[test]
    fn test_stale_closed_visits_evicted() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        inspector.set_title(500, "Beta - Google Chrome");
        tracker.tick(&inspector, t0() + Duration::seconds(2));
        assert!(tracker.visit(&key("chrome", "Alpha", 500)).is_some());

        tracker.tick(&inspector, t0() + Duration::minutes(4));
        assert!(tracker.visit(&key("chrome", "Alpha", 500)).is_some());

        tracker.tick(&inspector, t0() + Duration::minutes(6));
        assert!(tracker.visit(&key("chrome", "Alpha", 500)).is_none());
        // Still part of the session's history
        assert_eq!(tracker.session("chrome").unwrap().visits.len(), 2);
    }

    #[test]
    fn test_close_all_leaves_nothing_open() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_process(60, "msedge.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(600, 60, "Beta - Microsoft Edge");
        let mut tracker = tracker();
        tracker.tick(&inspector, t0());

        let records = tracker.close_all(t0() + Duration::minutes(1));

        assert_eq!(records.len(), 2);
        assert_eq!(tracker.open_sessions().count(), 0);
        assert!(tracker
            .completed_sessions()
            .iter()
            .flat_map(|s| s.visits.iter())
            .all(|v| !v.is_open()));
        assert!(tracker.close_all(t0()).is_empty());
    }

    #[test]
    fn test_closed_window_ends_its_visit() {
        let inspector = inspector();
        inspector.add_process(10, "notepad.exe");
        inspector.add_window(900, 10, "notes");
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "Beta - Google Chrome");
        let mut tracker = tracker();

        inspector.focus(Some(501));
        tracker.tick(&inspector, t0());

        inspector.remove_window(501);
        inspector.focus(Some(900));
        let closed_at = t0() + Duration::minutes(1);
        tracker.tick(&inspector, closed_at);
        let beta = tracker.visit(&key("chrome", "Beta", 501)).unwrap();
        assert_eq!(beta.end_time, Some(closed_at));

        for minute in 2..=120 {
            tracker.tick(&inspector, t0() + Duration::minutes(minute));
        }
        assert!(tracker.visit(&key("chrome", "Beta", 501)).is_none());

        inspector.remove_process(50);
        let records = tracker.tick(&inspector, t0() + Duration::minutes(121));
        let urls = records
            .iter()
            .find_map(|r| match r {
                ActivityRecord::BrowserSession { urls, .. } => Some(urls.clone()),
                _ => None,
            })
            .unwrap();
        let beta = urls.iter().find(|s| s.url == "Beta").unwrap();
        assert_eq!(beta.total, Duration::minutes(1));
    }

    #[test]
    fn test_ime_candidate_window_not_tracked() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(502, 50, "ime popup");
        inspector.set_class(502, "IME CandidateWindow");
        let mut tracker = tracker();

        let records = tracker.tick(&inspector, t0());

        assert_eq!(opened_urls(&records), vec!["Alpha".to_string()]);
        assert_eq!(tracker.tracked_keys().count(), 1);
        assert_eq!(tracker.session("chrome").unwrap().visits.len(), 1);
    }

    #[test]
    fn test_background_window_not_relogged_after_retention() {
        let inspector = inspector();
        inspector.add_process(50, "chrome.exe");
        inspector.add_window(500, 50, "Alpha - Google Chrome");
        inspector.add_window(501, 50, "Beta - Google Chrome");
        inspector.focus(Some(501));
        let mut tracker = tracker();

        assert_eq!(opened_urls(&tracker.tick(&inspector, t0())).len(), 2);
        for minute in 1..=15 {
            let records = tracker.tick(&inspector, t0() + Duration::minutes(minute));
            assert!(opened_urls(&records).is_empty(), "re-logged at minute {minute}");
        }

        let alpha = tracker.visit(&key("chrome", "Alpha", 500)).unwrap();
        assert_eq!(alpha.end_time, Some(t0()));
        assert_eq!(tracker.session("chrome").unwrap().visits.len(), 2);
    }
}
