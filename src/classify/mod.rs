//! Message classification.
//!
//! [`classify`] normalizes the message, runs the first matching rule from
//! [`rules::RULES`], then resolves every extracted recipient:
//!
//! 1. status: normalized if the rule supplied one, otherwise found in the body
//! 2. action: derived from the status if missing
//! 3. category: looked up from the status while still unrecognized, which
//!    also sets `bounce_type` and `remove`

pub mod fbl;
pub mod rules;

use tracing::{debug, trace};

use crate::model::{BounceCategory, Mail, Recipient, Token};
use crate::parser::{
    normalize_content, parse_body_sections, parse_header, split_message, BodySections, HeaderMap,
};
use crate::resolve::{action_for_status, category_for_status, format_status_code, resolve_from_body};

pub use rules::{Extraction, Rule, RULES};

/// A parsed message, as seen by the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub header: HeaderMap,
    /// Normalized body text.
    pub body: String,
    pub sections: BodySections,
}

impl Envelope {
    /// Build from an already split header block and body.
    pub fn new(header_text: &str, body_text: &str) -> Self {
        let header_text = normalize_content(header_text);
        let body = normalize_content(body_text);
        Self::from_normalized(&header_text, body)
    }

    /// Build from a whole message: normalize, then split on the first blank line.
    pub fn from_raw(raw: &str) -> Self {
        let normalized = normalize_content(raw);
        let (header_text, body) = split_message(&normalized);
        Self::from_normalized(header_text, body.to_string())
    }

    pub(crate) fn from_normalized(header_text: &str, body: String) -> Self {
        let header = parse_header(header_text);
        let sections = parse_body_sections(&header, &body);
        trace!(fields = header.len(), sectioned = !sections.is_empty(), "parsed envelope");
        Self {
            header,
            body,
            sections,
        }
    }
}

/// Classify a message given as separate header and body text.
pub fn classify(token: impl Into<Token>, header_text: &str, body_text: &str) -> Mail {
    classify_envelope(token.into(), &Envelope::new(header_text, body_text))
}

/// Classify a whole message.
pub fn classify_raw(token: impl Into<Token>, raw: &str) -> Mail {
    classify_envelope(token.into(), &Envelope::from_raw(raw))
}

/// Classify a parsed message.
pub fn classify_envelope(token: Token, env: &Envelope) -> Mail {
    let raw_subject = env.header.text("Subject").map(|s| s.into_owned());

    let Some(rule) = RULES.iter().find(|rule| (rule.matches)(env)) else {
        debug!(%token, "no rule matched, message left unprocessed");
        return Mail::unprocessed(token, raw_subject);
    };
    debug!(%token, rule = rule.name, "rule engaged");

    let extraction = (rule.extract)(env);
    let recipients = extraction
        .recipients
        .into_iter()
        .map(|recipient| resolve_recipient(recipient, &env.body))
        .collect();

    Mail {
        token,
        processed: true,
        subject: extraction
            .subject
            .filter(|s| !s.is_empty())
            .or(raw_subject),
        mail_type: extraction.mail_type,
        recipients,
        feedback: extraction.feedback,
    }
}

/// Status, then action, then category.
fn resolve_recipient(mut recipient: Recipient, body: &str) -> Recipient {
    recipient.status = match recipient.status.as_deref() {
        Some(status) if !status.trim().is_empty() => format_status_code(status),
        _ => resolve_from_body(body),
    };

    if recipient.action.is_none() {
        recipient.action = recipient.status.as_deref().and_then(action_for_status);
    }

    if recipient.bounce_category == BounceCategory::Unrecognized {
        if let Some(category) = recipient.status.as_deref().and_then(category_for_status) {
            recipient.apply_category(category);
        }
    }

    trace!(?recipient, "resolved recipient");
    recipient
}
