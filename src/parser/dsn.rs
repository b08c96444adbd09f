//! RFC 1894 delivery-status parsing.
//!
//! The machine-readable part of a DSN is a MIME sub-header, a per-message
//! block, and one block per recipient, separated by blank lines.

use serde::Serialize;
use tracing::{debug, trace};

use super::address::extract_email;
use super::header::{parse_lines, HeaderMap};
use crate::model::Action;
use crate::resolve::{action_for_status, format_status_code};

/// Status forced onto recipients whose diagnostic says "try again" but whose
/// `Action:` says `failed`.
const TRANSIENT_CORRECTION_STATUS: &str = "4.3.0";

/// A `type; address` compound field (`Final-Recipient`, `Reporting-MTA`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypedAddress {
    #[serde(rename = "type")]
    pub addr_type: Option<String>,
    pub addr: Option<String>,
}

/// `Diagnostic-Code: type; text`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticCode {
    #[serde(rename = "type")]
    pub code_type: String,
    pub text: String,
}

/// One per-recipient block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerRecipient {
    /// Every field of the block as parsed.
    pub fields: HeaderMap,
    pub final_recipient: Option<TypedAddress>,
    pub original_recipient: Option<TypedAddress>,
    pub diagnostic_code: Option<DiagnosticCode>,
    pub action: Option<Action>,
    /// `Status:` as written (not yet normalized).
    pub status: Option<String>,
}

impl PerRecipient {
    /// The affected address: `Original-Recipient` if it has one, otherwise
    /// `Final-Recipient`.
    pub fn email(&self) -> Option<String> {
        let addr = |field: &Option<TypedAddress>| {
            field
                .as_ref()
                .and_then(|f| f.addr.as_deref())
                .filter(|a| !a.is_empty())
                .and_then(extract_email)
        };
        addr(&self.original_recipient).or_else(|| addr(&self.final_recipient))
    }
}

/// A parsed delivery-status section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DsnReport {
    pub mime_header: HeaderMap,
    pub per_message: HeaderMap,
    pub reporting_mta: Option<TypedAddress>,
    pub postfix_sender: Option<TypedAddress>,
    pub per_recipient: Vec<PerRecipient>,
}

/// Parse the machine section of a DSN.
///
/// Segment 0 is the MIME sub-header. Segment 1 is the per-message block
/// unless it already reads like a recipient block. Blank and stray `--`
/// segments are skipped; every other segment is one recipient.
pub fn parse_dsn(machine: &str) -> DsnReport {
    let mut report = DsnReport::default();

    for (i, segment) in machine.split("\r\n\r\n").enumerate() {
        let segment = segment.trim();
        if i == 0 {
            report.mime_header = parse_lines(segment.split("\r\n"));
        } else if i == 1 && !is_recipient_block(segment) {
            report.per_message = parse_lines(segment.split("\r\n"));
        } else if segment.is_empty() || segment == "--" {
            continue;
        } else {
            report.per_recipient.push(parse_per_recipient(segment));
        }
    }

    report.reporting_mta = report
        .per_message
        .non_empty("Reporting-MTA")
        .map(|v| split_type_addr(&v));
    report.postfix_sender = report
        .per_message
        .non_empty("X-Postfix-Sender")
        .map(|v| split_type_addr(&v));

    trace!(
        recipients = report.per_recipient.len(),
        reporting_mta = ?report.reporting_mta,
        "parsed delivery-status section"
    );
    report
}

fn is_recipient_block(segment: &str) -> bool {
    segment.split("\r\n").any(|line| {
        let line = line.trim_start().to_lowercase();
        line.starts_with("final-recipient:") || line.starts_with("original-recipient:")
    })
}

fn parse_per_recipient(block: &str) -> PerRecipient {
    let fields = parse_lines(block.split("\r\n"));

    let final_recipient = fields
        .text("Final-Recipient")
        .map(|v| format_final_recipient(&v));
    let original_recipient = fields
        .text("Original-Recipient")
        .map(|v| format_original_recipient(&v));
    let diagnostic_code = fields
        .text("Diagnostic-Code")
        .map(|v| format_diagnostic_code(&v));
    let action_text = fields.text("Action").map(|v| v.into_owned());
    let mut action = action_text.as_deref().and_then(Action::from_dsn);
    let mut status = fields.non_empty("Status").map(|v| v.into_owned());

    if let Some(diag) = &diagnostic_code {
        let diag_action = format_status_code(&diag.text).and_then(|s| action_for_status(&s));
        let says_failed = action_text
            .as_deref()
            .is_some_and(|a| a.to_lowercase().contains("failed"));
        if diag_action == Some(Action::Transient) && says_failed {
            debug!(diagnostic = %diag.text, "transient diagnostic under a failed action, correcting");
            action = Some(Action::Transient);
            status = Some(TRANSIENT_CORRECTION_STATUS.to_string());
        }
    }

    PerRecipient {
        fields,
        final_recipient,
        original_recipient,
        diagnostic_code,
        action,
        status,
    }
}

fn non_empty_trimmed(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
}

/// `Final-Recipient` comes as `rfc822; addr` or, from some servers,
/// `addr; rfc822`. An `@` in the first token means address-first.
fn format_final_recipient(value: &str) -> TypedAddress {
    let parts: Vec<&str> = value.split(';').collect();
    let first = parts.first().copied().unwrap_or("");

    if first.contains('@') {
        TypedAddress {
            addr: extract_email(first),
            addr_type: non_empty_trimmed(parts.get(1).copied())
                .or_else(|| Some("unknown".to_string())),
        }
    } else {
        TypedAddress {
            addr: parts.get(1).and_then(|p| extract_email(p)),
            addr_type: non_empty_trimmed(Some(first)),
        }
    }
}

/// `Original-Recipient` is always `type; addr`.
fn format_original_recipient(value: &str) -> TypedAddress {
    let parts: Vec<&str> = value.split(';').collect();
    TypedAddress {
        addr: parts.get(1).and_then(|p| extract_email(p)),
        addr_type: non_empty_trimmed(parts.first().copied()),
    }
}

fn format_diagnostic_code(value: &str) -> DiagnosticCode {
    match value.split_once(';') {
        Some((code_type, text)) => DiagnosticCode {
            code_type: code_type.trim().to_string(),
            text: text.trim().to_string(),
        },
        None => DiagnosticCode {
            code_type: value.trim().to_string(),
            text: String::new(),
        },
    }
}

/// Per-message `type; value` fields keep the value verbatim.
fn split_type_addr(value: &str) -> TypedAddress {
    let mut parts = value.split(';');
    TypedAddress {
        addr_type: non_empty_trimmed(parts.next()),
        addr: non_empty_trimmed(parts.next()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MACHINE: &str = "\r\nContent-Type: message/delivery-status\r\n\r\n\
        Reporting-MTA: dns; mx.example.net\r\n\
        X-Postfix-Sender: rfc822; sender@example.org\r\n\
        Arrival-Date: Mon, 1 Jan 2024 10:00:00 +0000\r\n\r\n\
        Final-Recipient: rfc822; user@example.com\r\n\
        Original-Recipient: rfc822;orig@example.com\r\n\
        Action: failed\r\n\
        Status: 5.1.1\r\n\
        Diagnostic-Code: smtp; 550 5.1.1 user unknown\r\n\r\n\
        Final-Recipient: rfc822; other@example.com\r\n\
        Action: failed\r\n\
        Status: 5.0.0\r\n\r\n--";

    #[test]
    fn test_parse_dsn_segments() {
        let report = parse_dsn(MACHINE);
        assert_eq!(
            report.mime_header.text("Content-Type").as_deref(),
            Some("message/delivery-status")
        );
        assert_eq!(report.per_recipient.len(), 2);
        assert_eq!(
            report.reporting_mta,
            Some(TypedAddress {
                addr_type: Some("dns".into()),
                addr: Some("mx.example.net".into()),
            })
        );
        assert_eq!(
            report.postfix_sender.and_then(|s| s.addr).as_deref(),
            Some("sender@example.org")
        );
    }

    #[test]
    fn test_per_recipient_fields() {
        let report = parse_dsn(MACHINE);
        let first = &report.per_recipient[0];
        assert_eq!(first.action, Some(Action::Failed));
        assert_eq!(first.status.as_deref(), Some("5.1.1"));
        assert_eq!(
            first.diagnostic_code,
            Some(DiagnosticCode {
                code_type: "smtp".into(),
                text: "550 5.1.1 user unknown".into(),
            })
        );
        // Original-Recipient wins over Final-Recipient.
        assert_eq!(first.email().as_deref(), Some("orig@example.com"));
        assert_eq!(report.per_recipient[1].email().as_deref(), Some("other@example.com"));
    }

    #[test]
    fn test_no_per_message_block() {
        let machine = "Content-Type: message/delivery-status\r\n\r\n\
            Final-Recipient: rfc822; a@x.com\r\nAction: failed\r\n\r\n\
            Final-Recipient: rfc822; b@x.com\r\nAction: failed";
        let report = parse_dsn(machine);
        assert!(report.per_message.is_empty());
        assert_eq!(report.per_recipient.len(), 2);
    }

    #[test]
    fn test_blank_segments_are_not_recipients() {
        let machine = "Content-Type: message/delivery-status\r\n\r\n\
            Reporting-MTA: dns; mx.example.net\r\n\r\n\
            Final-Recipient: rfc822; a@x.com\r\nAction: failed\r\nStatus: 5.1.1\r\n\r\n\r\n\r\n--";
        let report = parse_dsn(machine);
        assert_eq!(report.per_recipient.len(), 1);
        assert_eq!(report.per_recipient[0].email().as_deref(), Some("a@x.com"));
    }

    #[test]
    fn test_final_recipient_address_first() {
        let fr = format_final_recipient("<user@example.com>; rfc822");
        assert_eq!(fr.addr.as_deref(), Some("user@example.com"));
        assert_eq!(fr.addr_type.as_deref(), Some("rfc822"));

        let fr = format_final_recipient("user@example.com");
        assert_eq!(fr.addr_type.as_deref(), Some("unknown"));
    }

    #[test]
    fn test_final_recipient_type_first() {
        let fr = format_final_recipient("RFC822; <user@example.com>");
        assert_eq!(fr.addr.as_deref(), Some("user@example.com"));
        assert_eq!(fr.addr_type.as_deref(), Some("RFC822"));
    }

    #[test]
    fn test_malformed_recipient_is_partial() {
        let fr = format_final_recipient("rfc822");
        assert_eq!(fr.addr, None);
        assert_eq!(fr.addr_type.as_deref(), Some("rfc822"));
    }

    #[test]
    fn test_diagnostic_splits_on_first_semicolon() {
        let diag = format_diagnostic_code("smtp; 550 no; really");
        assert_eq!(diag.code_type, "smtp");
        assert_eq!(diag.text, "550 no; really");
    }

    #[test]
    fn test_transient_correction() {
        let machine = "Content-Type: message/delivery-status\r\n\r\n\
            Final-Recipient: rfc822; a@x.com\r\n\
            Action: failed\r\n\
            Status: 5.0.0\r\n\
            Diagnostic-Code: smtp; 421 4.2.1 try again later";
        let report = parse_dsn(machine);
        let rcpt = &report.per_recipient[0];
        assert_eq!(rcpt.action, Some(Action::Transient));
        assert_eq!(rcpt.status.as_deref(), Some("4.3.0"));
    }

    #[test]
    fn test_no_correction_for_permanent_diagnostic() {
        let report = parse_dsn(MACHINE);
        assert_eq!(report.per_recipient[0].action, Some(Action::Failed));
    }
}
