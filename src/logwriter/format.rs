//! Text rendering of activity records.
//!
//! Every entry has the same shape: a `[yyyy-MM-dd HH:mm:ss]` header line,
//! `Key: value` lines, then a dashed separator. The layout is stable so the
//! files can be diffed and grepped without a schema.

use super::LogCategory;
use crate::store::{
    span, ActivityRecord, ApplicationSession, BrowserSession, UrlSummary, UrlVisit,
};
use chrono::{DateTime, Duration, Local};
use std::fmt::Write;

const WIDE_SEPARATOR: usize = 60;
const NARROW_SEPARATOR: usize = 40;

/// Shown in place of an end time while a session is still open.
pub const RUNNING: &str = "running";

/// Shown in place of an end time while a visit is still open.
pub const VISITING: &str = "visiting";

/// Formats a duration as `hh:mm:ss`. Hours are not wrapped at 24.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.num_seconds().max(0);
    format!(
        "{:02}:{:02}:{:02}",
        total / 3600,
        (total % 3600) / 60,
        total % 60
    )
}

fn clock(t: DateTime<Local>) -> String {
    t.format("%H:%M:%S").to_string()
}

fn header(out: &mut String, now: DateTime<Local>) {
    let _ = writeln!(out, "[{}]", now.format("%Y-%m-%d %H:%M:%S"));
}

fn separator(out: &mut String, width: usize) {
    out.push_str(&"-".repeat(width));
    out.push('\n');
}

/// Renders a record and picks its target category.
pub fn format_record(record: &ActivityRecord, now: DateTime<Local>) -> (LogCategory, String) {
    match record {
        ActivityRecord::Application { event, session } => (
            LogCategory::Applications,
            format_application(event.as_str(), session, now),
        ),
        ActivityRecord::UrlOpened { browser, visit } => (
            LogCategory::Browser,
            format_visit("UrlOpened", browser, visit, now),
        ),
        ActivityRecord::UrlTransition {
            transition,
            browser,
            visit,
        } => (
            LogCategory::Browser,
            format_visit(transition.as_str(), browser, visit, now),
        ),
        ActivityRecord::BrowserSession { session, urls } => {
            (LogCategory::Browser, format_browser_session(session, urls, now))
        }
        ActivityRecord::System { event, at } => {
            let mut out = String::new();
            header(&mut out, now);
            let _ = writeln!(out, "Category: System");
            let _ = writeln!(out, "Event: {}", event.as_str());
            let _ = writeln!(out, "Details: {}", at.format("%Y-%m-%d %H:%M:%S"));
            separator(&mut out, WIDE_SEPARATOR);
            (LogCategory::System, out)
        }
    }
}

fn format_application(event: &str, app: &ApplicationSession, now: DateTime<Local>) -> String {
    let mut out = String::new();
    header(&mut out, now);
    let _ = writeln!(out, "Event: {event}");
    let _ = writeln!(out, "Process: {}", app.process_name);
    if !app.window_title.is_empty() && app.window_title != "Unknown" {
        let _ = writeln!(out, "Title: {}", app.window_title);
    }
    let _ = writeln!(out, "PID: {}", app.process_id);
    let _ = writeln!(out, "Start: {}", clock(app.start_time));
    match app.end_time {
        Some(end) => {
            let _ = writeln!(out, "End: {}", clock(end));
            let _ = writeln!(
                out,
                "Duration: {}",
                format_duration(span(app.start_time, end))
            );
        }
        None => {
            let _ = writeln!(out, "End: {RUNNING}");
        }
    }
    if !app.file_path.is_empty() {
        let _ = writeln!(out, "Path: {}", app.file_path);
    }
    separator(&mut out, WIDE_SEPARATOR);
    out
}

fn format_visit(event: &str, browser: &str, visit: &UrlVisit, now: DateTime<Local>) -> String {
    let mut out = String::new();
    header(&mut out, now);
    let _ = writeln!(out, "Event: {event}");
    let _ = writeln!(out, "Browser: {browser}");
    let _ = writeln!(out, "URL: {}", visit.url);
    let _ = writeln!(out, "Title: {}", visit.title);
    let _ = writeln!(out, "Start: {}", clock(visit.start_time));
    match visit.end_time {
        Some(end) => {
            let _ = writeln!(out, "End: {}", clock(end));
        }
        None => {
            let _ = writeln!(out, "End: {VISITING}");
        }
    }
    separator(&mut out, NARROW_SEPARATOR);
    out
}

fn format_browser_session(
    session: &BrowserSession,
    urls: &[UrlSummary],
    now: DateTime<Local>,
) -> String {
    let mut out = String::new();
    header(&mut out, now);
    let _ = writeln!(out, "Event: BrowserSession");
    let _ = writeln!(out, "Browser: {}", session.browser_name);
    let _ = writeln!(out, "Start: {}", clock(session.start_time));
    match session.end_time {
        Some(end) => {
            let _ = writeln!(out, "End: {}", clock(end));
            let _ = writeln!(
                out,
                "Total Duration: {}",
                format_duration(span(session.start_time, end))
            );
        }
        None => {
            let _ = writeln!(out, "End: {RUNNING}");
        }
    }
    if !urls.is_empty() {
        let _ = writeln!(out, "Visits:");
        for summary in urls {
            let _ = writeln!(out, "  URL: {}", summary.url);
            let _ = writeln!(out, "    Title: {}", summary.title);
            let _ = writeln!(out, "    Count: {}", summary.visit_count);
            let _ = writeln!(out, "    Duration: {}", format_duration(summary.total));
        }
    }
    separator(&mut out, WIDE_SEPARATOR);
    out
}
