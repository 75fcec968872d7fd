//! Line predicates for the round-trip document format.
//!
//! A document is a sequence of entries, each a path line followed by a fenced
//! block:
//!
//! ````text
//! src/main.py
//! ```python
//! print("hi")
//! ```
//! ````
//!
//! These helpers classify single lines. They carry no state; the restorer
//! composes them into its scanner.

use once_cell::sync::Lazy;
use regex::Regex;

static OPENING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(`{3,}|~{3,})\s*(\S*).*$").expect("valid regex"));

static CLOSING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(`{3,}|~{3,})\s*$").expect("valid regex"));

static SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(={3,}|-{3,}|\*{3,}|_{3,})\s*$").expect("valid regex"));

static HEADING_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+").expect("valid regex"));

static PATH_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:file(?:name)?|path)\s*:\s*").expect("valid regex"));

/// An opening fence: its marker character and run length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fence {
    pub marker: char,
    pub len: usize,
}

impl Fence {
    /// A bare fence of the same character and at least the same length.
    pub fn is_closed_by(&self, line: &str) -> bool {
        CLOSING_FENCE.captures(line).is_some_and(|caps| {
            let run = &caps[1];
            run.starts_with(self.marker) && run.len() >= self.len
        })
    }
}

/// Parses an opening fence. The language tag, if any, is returned but the
/// restorer ignores it.
pub fn parse_opening_fence(line: &str) -> Option<(Fence, &str)> {
    let caps = OPENING_FENCE.captures(line)?;
    let run = caps.get(1)?.as_str();
    let marker = run.chars().next()?;
    let info = caps.get(2).map_or("", |m| m.as_str());

    // A backtick fence's info string may not contain backticks.
    if marker == '`' && line.trim_start()[run.len()..].contains('`') {
        return None;
    }

    Some((
        Fence {
            marker,
            len: run.len(),
        },
        info,
    ))
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Horizontal rules and `====` banners placed between entries.
pub fn is_separator(line: &str) -> bool {
    SEPARATOR.is_match(line)
}

/// Turns a candidate path line into a path, undoing the decoration a text
/// generator tends to add (`## path`, `**path**`, `` `path` ``, `File: path`,
/// `path:`). Returns `None` for lines that read as prose.
pub fn clean_path_candidate(line: &str) -> Option<String> {
    let mut s = line.trim();

    s = HEADING_MARKER.find(s).map_or(s, |m| &s[m.end()..]);

    s = PATH_LABEL
        .find(s)
        .map_or(s, |m| &s[m.end()..])
        .trim();

    let has_space = s.contains(char::is_whitespace);
    if has_space && (s.ends_with(':') || s.ends_with('.')) {
        return None;
    }

    s = s.strip_suffix(':').unwrap_or(s).trim_end();
    s = strip_wrapping(s, "**");
    s = strip_wrapping(s, "`");

    while let Some(rest) = s.strip_prefix("./") {
        s = rest;
    }

    if s.is_empty() || s.contains('`') {
        return None;
    }

    Some(s.to_string())
}

fn strip_wrapping<'a>(s: &'a str, wrap: &str) -> &'a str {
    s.strip_prefix(wrap)
        .and_then(|inner| inner.strip_suffix(wrap))
        .map_or(s, str::trim)
}
