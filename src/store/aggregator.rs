//! Statistics aggregation over today's sessions.
//!
//! Computed on demand for the host shell; nothing here is persisted.

use super::types::{duration_secs, span, ApplicationSession, BrowserSession, UrlVisit};
use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// Focus time of one application.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppUsage {
    pub process_name: String,
    pub session_count: u32,
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

/// Running time of one browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrowserUsage {
    pub browser_name: String,
    pub session_count: u32,
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

/// Time spent on one URL key in one browser.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UrlUsage {
    pub browser_name: String,
    pub url: String,
    pub title: String,
    pub visit_count: u32,
    #[serde(with = "duration_secs")]
    pub total: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    #[serde(with = "duration_secs")]
    pub application_time: Duration,
    #[serde(with = "duration_secs")]
    pub browser_time: Duration,
    pub application_sessions: u32,
    pub browser_sessions: u32,
    pub distinct_urls: u32,
}

/// Aggregated activity of the current local day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TodayStatistics {
    pub date: NaiveDate,
    /// Sorted by total time, longest first.
    pub applications: Vec<AppUsage>,
    pub browsers: Vec<BrowserUsage>,
    pub urls: Vec<UrlUsage>,
    pub totals: Totals,
}

impl TodayStatistics {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Whether an interval ending at `end` (or still running) overlaps `day`.
fn touches_day(start: DateTime<Local>, end: Option<DateTime<Local>>, now: DateTime<Local>, day: NaiveDate) -> bool {
    start.date_naive() <= day && end.unwrap_or(now).date_naive() >= day
}

/// Builds today's statistics from completed and open sessions.
///
/// `should_log` filters the URL visits that are counted, so the figures
/// agree with what the Browser log lists.
pub fn compute_today_statistics<'a, A, B, F>(
    applications: A,
    browsers: B,
    should_log: F,
    now: DateTime<Local>,
) -> TodayStatistics
where
    A: IntoIterator<Item = &'a ApplicationSession>,
    B: IntoIterator<Item = &'a BrowserSession>,
    F: Fn(&UrlVisit) -> bool,
{
    let today = now.date_naive();

    let mut apps: HashMap<String, AppUsage> = HashMap::new();
    for session in applications
        .into_iter()
        .filter(|s| touches_day(s.start_time, s.end_time, now, today))
    {
        let entry = apps
            .entry(session.process_name.clone())
            .or_insert_with(|| AppUsage {
                process_name: session.process_name.clone(),
                session_count: 0,
                total: Duration::zero(),
            });
        entry.session_count += 1;
        entry.total = entry.total + session.duration(now);
    }

    let mut browser_usage: HashMap<String, BrowserUsage> = HashMap::new();
    let mut urls: HashMap<(String, String), UrlUsage> = HashMap::new();
    for session in browsers
        .into_iter()
        .filter(|s| touches_day(s.start_time, s.end_time, now, today))
    {
        let entry = browser_usage
            .entry(session.browser_name.clone())
            .or_insert_with(|| BrowserUsage {
                browser_name: session.browser_name.clone(),
                session_count: 0,
                total: Duration::zero(),
            });
        entry.session_count += 1;
        entry.total = entry.total + session.duration(now);

        for visit in session.visits.iter().filter(|v| should_log(v)) {
            let usage = urls
                .entry((session.browser_name.clone(), visit.url.clone()))
                .or_insert_with(|| UrlUsage {
                    browser_name: session.browser_name.clone(),
                    url: visit.url.clone(),
                    title: visit.title.clone(),
                    visit_count: 0,
                    total: Duration::zero(),
                });
            usage.visit_count += 1;
            usage.total = usage.total + span(visit.start_time, visit.end_time.unwrap_or(now));
            usage.title = visit.title.clone();
        }
    }

    let mut applications: Vec<AppUsage> = apps.into_values().collect();
    applications.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.process_name.cmp(&b.process_name)));
    let mut browsers: Vec<BrowserUsage> = browser_usage.into_values().collect();
    browsers.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.browser_name.cmp(&b.browser_name)));
    let mut urls: Vec<UrlUsage> = urls.into_values().collect();
    urls.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.url.cmp(&b.url)));

    let totals = Totals {
        application_time: applications.iter().fold(Duration::zero(), |acc, a| acc + a.total),
        browser_time: browsers.iter().fold(Duration::zero(), |acc, b| acc + b.total),
        application_sessions: applications.iter().map(|a| a.session_count).sum(),
        browser_sessions: browsers.iter().map(|b| b.session_count).sum(),
        distinct_urls: urls.len() as u32,
    };

    TodayStatistics {
        date: today,
        applications,
        browsers,
        urls,
        totals,
    }
}
