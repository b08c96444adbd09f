//! Status code resolution: normalize `D.D.D` codes and find them in free text.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::phrases::TABLE;
use crate::model::Action;

static REPLY_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{3})\s+(.*)$").expect("reply prefix regex"));

static ENHANCED_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d\.\d\.\d)\s").expect("enhanced prefix regex"));

static ENHANCED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[245]\.[0-7]\.[0-8]").expect("enhanced code regex"));

static BARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[245][0-7][0-8]").expect("bare code regex"));

static RFC1893_IN_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\W([245]\.[0-7]\.[0-8])\W").expect("rfc1893 regex"));

static RFC821_REPLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\]?: ([45][01257][012345]) ").expect("rfc821 reply regex"));

static RFC821_PHRASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([45][01257][012345]) (?:.*?)(?:denied|inactive|deactivated|rejected|disabled|unknown|no such|not (?:our|activated|a valid))+",
    )
    .expect("rfc821 phrase regex")
});

/// Normalize a status string to the `D.D.D` form.
///
/// Accepts an enhanced code (`5.1.1`), an enhanced code behind a reply code
/// (`550 5.1.1 user unknown`), or a bare reply code (`550`, which becomes
/// `5.5.0`). Returns `None` when nothing in the RFC-1893 shape is found.
pub fn format_status_code(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut candidate = text;
    if let Some(caps) = REPLY_PREFIX_RE.captures(text) {
        let rest = caps.get(2).map_or("", |m| m.as_str());
        if !ENHANCED_RE.is_match(rest) {
            candidate = caps.get(1).map_or(text, |m| m.as_str());
        } else {
            candidate = rest;
        }
    } else if let Some(caps) = ENHANCED_PREFIX_RE.captures(text) {
        candidate = caps.get(1).map_or(text, |m| m.as_str());
    }

    if let Some(m) = ENHANCED_RE.find(candidate) {
        return Some(m.as_str().to_string());
    }

    BARE_RE.find(candidate).map(|m| {
        let digits: Vec<String> = m.as_str().chars().map(String::from).collect();
        digits.join(".")
    })
}

/// Map a reply code to the enhanced code class it implies.
fn remap_reply_code(code: &str) -> &str {
    match code {
        "450" | "550" | "551" | "554" => "511",
        "452" | "552" => "422",
        "421" => "432",
        other => other,
    }
}

/// Find a status code for a message by scanning its body line by line.
///
/// Per trimmed line, in order: the phrase table, an RFC-1893 code
/// surrounded by non-word characters, then a legacy 3-digit reply code.
/// The first line that yields a code decides. A line whose RFC-1893 hit
/// also mentions `Message-ID` stops the scan with no result.
pub fn resolve_from_body(body: &str) -> Option<String> {
    for line in body.split("\r\n") {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(hit) = TABLE.lookup(line) {
            if let Some(code) = format_status_code(hit.candidate) {
                debug!(code = %code, entry = hit.entry, "status code found via phrase table");
                return Some(code);
            }
        }

        if let Some(caps) = RFC1893_IN_TEXT_RE.captures(line) {
            if line.to_lowercase().contains("message-id") {
                debug!(line, "status-like text in a Message-ID line, giving up");
                return None;
            }
            if let Some(code) = format_status_code(&caps[1]) {
                debug!(code = %code, "status code found via RFC 1893 pattern");
                return Some(code);
            }
        }

        let reply = RFC821_REPLY_RE
            .captures(line)
            .or_else(|| RFC821_PHRASE_RE.captures(line));
        if let Some(caps) = reply {
            if let Some(code) = format_status_code(remap_reply_code(&caps[1])) {
                debug!(code = %code, reply = &caps[1], "status code converted from RFC 821 reply");
                return Some(code);
            }
        }
    }

    None
}

/// Action implied by a status code: `2` success, `4` transient, `5` failed.
pub fn action_for_status(status: &str) -> Option<Action> {
    let status = format_status_code(status)?;
    match status.as_bytes().first() {
        Some(b'2') => Some(Action::Success),
        Some(b'4') => Some(Action::Transient),
        Some(b'5') => Some(Action::Failed),
        _ => None,
    }
}
