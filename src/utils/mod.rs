use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::OnceLock;

use colored::{ColoredString, Colorize};
use regex::Regex;

static VERBOSITY: AtomicU8 = AtomicU8::new(0);

pub fn set_verbosity(level: u8) {
    VERBOSITY.store(level, Ordering::Relaxed);
}

pub fn verbosity() -> u8 {
    VERBOSITY.load(Ordering::Relaxed)
}

fn tagged(tag: ColoredString, message: &str) {
    eprintln!(
        "{}{}{} {}",
        "[".bold().white(),
        tag,
        "]".bold().white(),
        message
    );
}

/// Progress line, shown with `-v`.
pub fn info(message: &str) {
    if verbosity() > 0 {
        tagged("INF".bold().blue(), message);
    }
}

/// Extra detail, shown with `-vv`.
pub fn debug(message: &str) {
    if verbosity() > 1 {
        tagged("DBG".bold().magenta(), message);
    }
}

pub fn warn(message: &str) {
    tagged("WRN".bold().yellow(), message);
}

pub fn error(message: &str) {
    tagged("ERR".bold().red(), message);
}

pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn slug_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^a-z0-9_-]+").expect("static slug pattern"))
}

/// Lower-case identifier safe for element ids.
pub fn slugify(value: &str) -> String {
    let lower = value.to_lowercase();
    let slug = slug_pattern().replace_all(&lower, "-");
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "item".to_string()
    } else {
        slug.to_string()
    }
}

/// Split a comma separated list, dropping blanks.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
