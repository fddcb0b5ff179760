//! Heuristic-based mobile rule detection.
//!
//! A rule is considered mobile-related when its raw text matches any of:
//! - a mobile keyword (mobile, android, ios, app, tablet), case-insensitive
//! - a vendor package name (`com.google`, `com.samsung`, ...)
//! - an app package suffix (`.apk`, `.ipa`, `.app`)
//! - an app store URL fragment
//!
//! Keywords are plain substring matches, so "app" also hits `apple.com` and
//! `whatsapp.net`.

use once_cell::sync::Lazy;
use regex::Regex;

/// Keywords that mark a rule as mobile-related.
const MOBILE_KEYWORDS: &[&str] = &["mobile", "android", "ios", "app", "tablet"];

/// Vendors whose reverse-DNS package names identify mobile apps.
const MOBILE_VENDORS: &[&str] = &[
    "google", "android", "huawei", "xiaomi", "oppo", "vivo", "samsung",
];

static KEYWORD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("(?i){}", MOBILE_KEYWORDS.join("|"))).expect("valid keyword pattern")
});

static VENDOR_PACKAGE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"com\.({})", MOBILE_VENDORS.join("|")))
        .expect("valid vendor pattern")
});

static PACKAGE_SUFFIX_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.(apk|ipa|app)$").expect("valid suffix pattern"));

static APP_STORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"play\.google\.com|apps\.apple\.com").expect("valid app store pattern")
});

/// Check if a raw rule looks mobile-related.
///
/// # Example
/// ```
/// use blockingmachine::mobile_heuristic::is_mobile_heuristic;
///
/// assert!(is_mobile_heuristic("||ads.mobile-tracker.com^"));
/// assert!(is_mobile_heuristic("||cdn.example.com/game.apk"));
/// assert!(!is_mobile_heuristic("||doubleclick.net^"));
/// ```
pub fn is_mobile_heuristic(rule: &str) -> bool {
    if rule.is_empty() {
        return false;
    }

    KEYWORD_PATTERN.is_match(rule)
        || VENDOR_PACKAGE_PATTERN.is_match(rule)
        || PACKAGE_SUFFIX_PATTERN.is_match(rule)
        || APP_STORE_PATTERN.is_match(rule)
}
