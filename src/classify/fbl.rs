//! Feedback-loop (spam complaint) handling.
//!
//! Two shapes are understood: ARF reports (`message/feedback-report` in the
//! machine part, original message in the returned part) and Hotmail's
//! format, which carries the complaint data as headers of the first part.

use std::sync::LazyLock;

use regex::Regex;

use super::Envelope;
use crate::model::FeedbackReport;
use crate::parser::header::HOTMAIL_RECIPIENT;
use crate::parser::{extract_email, parse_lines, HeaderMap};

static FORWARD_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)fw:").expect("forward prefix regex"));

static UNDISCLOSED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Undisclosed|redacted").expect("undisclosed regex"));

/// Status and action every complaint recipient gets.
pub const FBL_STATUS: &str = "5.7.1";

/// Whether the message is a feedback-loop report.
pub fn is_fbl(env: &Envelope) -> bool {
    let arf = env
        .header
        .content_type()
        .and_then(|ct| ct.report_type())
        .is_some_and(|rt| rt.to_lowercase().contains("feedback-report"));
    let scomp = env
        .header
        .text("X-Loop")
        .is_some_and(|v| v.contains("scomp"));

    arf || scomp || is_hotmail_fbl(env)
}

/// Hotmail complaints carry `X-HmXmrOriginalRecipient` in the first part.
pub fn is_hotmail_fbl(env: &Envelope) -> bool {
    env.sections
        .first_parsed
        .as_ref()
        .is_some_and(|first| first.contains(HOTMAIL_RECIPIENT))
}

/// The subject with every `Fw:` removed.
pub fn clean_subject(subject: &str) -> String {
    FORWARD_PREFIX_RE.replace_all(subject, "").trim().to_string()
}

/// Recover the complaint details.
pub fn feedback_report(env: &Envelope) -> FeedbackReport {
    match env.sections.first_parsed.as_ref() {
        Some(first) if first.contains(HOTMAIL_RECIPIENT) => hotmail_report(first),
        _ => arf_report(env),
    }
}

fn field(map: &HeaderMap, name: &str) -> Option<String> {
    map.non_empty(name).map(|v| v.trim().to_string())
}

fn hotmail_report(first: &HeaderMap) -> FeedbackReport {
    let address = |name: &str| {
        field(first, name).map(|raw| extract_email(&raw).unwrap_or(raw))
    };

    FeedbackReport {
        feedback_type: Some("abuse".to_string()),
        user_agent: Some("Hotmail FBL".to_string()),
        original_mail_from: address("X-Sid-Pra"),
        original_rcpt_to: address(HOTMAIL_RECIPIENT),
        received_date: field(first, "Date"),
    }
}

fn arf_report(env: &Envelope) -> FeedbackReport {
    let parse = |section: &Option<String>| {
        section
            .as_deref()
            .map(|s| parse_lines(s.split("\r\n")))
            .unwrap_or_default()
    };
    let machine = parse(&env.sections.machine);
    let returned = parse(&env.sections.returned);

    let removal = field(&machine, "Removal-Recipient");
    let mail_from =
        field(&machine, "Original-Mail-From").or_else(|| field(&returned, "From"));

    let mut rcpt_to = field(&machine, "Original-Rcpt-To")
        .or_else(|| removal.clone())
        .or_else(|| field(&returned, "To"));
    // The intended recipient is hidden; the removal address is the real one.
    if removal.is_some() && mail_from.as_deref().is_some_and(|f| UNDISCLOSED_RE.is_match(f)) {
        rcpt_to = removal;
    }

    let received_date =
        field(&machine, "Received-Date").or_else(|| field(&machine, "Arrival-Date"));

    FeedbackReport {
        feedback_type: field(&machine, "Feedback-Type"),
        user_agent: field(&machine, "User-Agent"),
        original_mail_from: mail_from.as_deref().and_then(extract_email),
        original_rcpt_to: rcpt_to.as_deref().and_then(extract_email),
        received_date,
    }
}
