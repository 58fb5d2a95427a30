//! Browser window title classification.
//!
//! A browser window only exposes its title, so the visited "URL" is
//! recovered heuristically by an ordered rule list:
//!
//! 1. strip the browser's product suffix (`" - Google Chrome"` ...),
//! 2. take the remainder as an absolute http(s) URL, or search it for an
//!    embedded `http(s)://` / `www.` token,
//! 3. otherwise map it to a fixed bucket by keyword,
//! 4. otherwise use the title itself, truncated, as the key.
//!
//! Classification is a pure function of its inputs.

use once_cell::sync::Lazy;
use regex::Regex;

/// Fallback keys are cut to this many characters.
pub const TRUNCATE_AT: usize = 30;

/// Key used when classification yields nothing.
pub const FALLBACK_URL: &str = "Browsing";

/// Result of classifying one window title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classified {
    /// Page title with the browser suffix removed.
    pub title: String,
    /// Extracted URL or logical key.
    pub url: String,
}

struct Suffix {
    browsers: &'static [&'static str],
    text: &'static str,
}

const SUFFIXES: &[Suffix] = &[
    Suffix { browsers: &["chrome"], text: " - Google Chrome" },
    Suffix { browsers: &["chrome"], text: " — Google Chrome" },
    Suffix { browsers: &["chrome"], text: " – Google Chrome" },
    Suffix { browsers: &["firefox"], text: " - Mozilla Firefox" },
    Suffix { browsers: &["firefox"], text: " — Mozilla Firefox" },
    Suffix { browsers: &["firefox"], text: " – Mozilla Firefox" },
    Suffix { browsers: &["msedge", "edge"], text: " - Microsoft\u{200b} Edge" },
    Suffix { browsers: &["msedge", "edge"], text: " - Microsoft Edge" },
    Suffix { browsers: &["msedge", "edge"], text: " — Microsoft Edge" },
    Suffix { browsers: &["msedge", "edge"], text: " – Microsoft Edge" },
    Suffix { browsers: &["iexplore"], text: " - Internet Explorer" },
    Suffix { browsers: &["brave"], text: " - Brave" },
    Suffix { browsers: &["opera"], text: " - Opera" },
    Suffix { browsers: &["safari"], text: " - Safari" },
    Suffix { browsers: &["vivaldi"], text: " - Vivaldi" },
];

fn strip_suffix_ignore_ascii_case<'a>(title: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = title.len().checked_sub(suffix.len())?;
    if title.is_char_boundary(cut) && title[cut..].eq_ignore_ascii_case(suffix) {
        Some(&title[..cut])
    } else {
        None
    }
}

/// Removes a known browser product suffix, trying the suffixes of
/// `browser_name` first.
pub fn strip_browser_suffix<'a>(window_title: &'a str, browser_name: &str) -> &'a str {
    let own = SUFFIXES.iter().filter(|s| s.browsers.contains(&browser_name));
    let others = SUFFIXES.iter().filter(|s| !s.browsers.contains(&browser_name));

    own.chain(others)
        .find_map(|s| strip_suffix_ignore_ascii_case(window_title, s.text))
        .map(str::trim)
        .unwrap_or(window_title)
}

static EMBEDDED_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(https?://[^\s]+|www\.[^\s]+\.[a-z]{2,}(/[^\s]*)?)")
        .expect("embedded URL pattern is valid")
});

/// URL extraction rules, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlRule {
    /// The whole candidate is an absolute http(s) URL.
    Absolute,
    /// The candidate contains an `http(s)://` or `www.` token.
    Embedded,
}

pub const URL_RULES: &[UrlRule] = &[UrlRule::Absolute, UrlRule::Embedded];

impl UrlRule {
    pub fn extract(self, candidate: &str) -> Option<String> {
        match self {
            Self::Absolute => {
                let parsed = url::Url::parse(candidate).ok()?;
                matches!(parsed.scheme(), "http" | "https").then(|| candidate.to_string())
            }
            Self::Embedded => EMBEDDED_URL.find(candidate).map(|m| m.as_str().to_string()),
        }
    }
}

/// Finds a URL in a page title.
pub fn extract_url(candidate: &str) -> Option<String> {
    if candidate.is_empty() {
        return None;
    }
    URL_RULES.iter().find_map(|rule| rule.extract(candidate))
}

/// A logical category for browser-internal pages.
#[derive(Debug)]
pub struct Bucket {
    pub label: &'static str,
    /// Substrings that select this bucket (case-sensitive).
    pub keywords: &'static [&'static str],
    /// Whole titles that select this bucket.
    pub exact: &'static [&'static str],
    /// The page title is replaced by the label as well.
    pub replaces_title: bool,
}

pub const NEW_TAB: &str = "New Tab";

pub const BUCKETS: &[Bucket] = &[
    Bucket {
        label: NEW_TAB,
        keywords: &["新标签页", "New Tab"],
        exact: &["about:blank"],
        replaces_title: true,
    },
    Bucket {
        label: "Browser Settings",
        keywords: &["设置", "Settings"],
        exact: &[],
        replaces_title: false,
    },
    Bucket {
        label: "History",
        keywords: &["历史记录", "History"],
        exact: &[],
        replaces_title: false,
    },
    Bucket {
        label: "Downloads",
        keywords: &["下载", "Downloads"],
        exact: &[],
        replaces_title: false,
    },
    Bucket {
        label: "Bookmarks",
        keywords: &["书签", "Bookmarks", "Favorites"],
        exact: &[],
        replaces_title: false,
    },
    Bucket {
        label: "Extensions",
        keywords: &["扩展", "Extensions"],
        exact: &[],
        replaces_title: false,
    },
];

impl Bucket {
    pub fn matches(&self, title: &str) -> bool {
        self.exact.contains(&title) || self.keywords.iter().any(|k| title.contains(k))
    }
}

/// First `TRUNCATE_AT` characters of `title`, with `...` when cut.
pub fn truncate_key(title: &str) -> String {
    if title.chars().count() > TRUNCATE_AT {
        let head: String = title.chars().take(TRUNCATE_AT).collect();
        format!("{head}...")
    } else {
        title.to_string()
    }
}

/// Classifies a browser window title into a page title and URL key.
pub fn classify_title(window_title: &str, browser_name: &str) -> Classified {
    let title = strip_browser_suffix(window_title, browser_name).to_string();

    if let Some(url) = extract_url(&title) {
        return Classified { title, url };
    }

    if let Some(bucket) = BUCKETS.iter().find(|b| b.matches(&title)) {
        let title = if bucket.replaces_title {
            bucket.label.to_string()
        } else {
            title
        };
        return Classified {
            title,
            url: bucket.label.to_string(),
        };
    }

    let url = truncate_key(&title);
    let url = if url.trim().is_empty() {
        FALLBACK_URL.to_string()
    } else {
        url
    };
    Classified { title, url }
}

/// Whether a visit with this title and URL key is suppressed from the log.
///
/// Matching is a case-insensitive substring test against `markers`.
pub fn is_suppressed(title: &str, url: &str, markers: &[String]) -> bool {
    let title = title.to_lowercase();
    let url = url.to_lowercase();
    markers.iter().any(|marker| {
        let marker = marker.to_lowercase();
        title.contains(&marker) || url.contains(&marker)
    })
}
