//! The ordered extraction rules.
//!
//! Several predicates can hold for the same message (an FBL with a
//! bounce-looking subject, a DSN that also lists `X-Failed-Recipients`), so
//! [`RULES`] is evaluated top to bottom and the first match wins.

use std::sync::LazyLock;

use regex::Regex;

use super::fbl;
use super::Envelope;
use crate::model::{BounceCategory, FeedbackReport, MailType, Recipient};
use crate::parser::{find_emails, parse_dsn};

static BOUNCE_SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)(mail delivery failed|failure notice|warning: message|delivery status notif|",
        r"delivery failure|delivery problem|spam eater|returned mail|undeliverable|",
        r"delivery errors|mail status report|mail system error|failure delivery|",
        r"delivery notification|delivery has failed|undelivered mail|returned email|",
        r"returning message to sender|returned to sender|message delayed|",
        r"mdaemon notification|mailserver notification|mail delivery system|",
        r"nondeliverable mail|mail transaction failed)",
        r"|auto.{0,20}reply|vacation|(out|away|on holiday).*office",
    ))
    .expect("bounce subject regex")
});

static AUTOREPLY_SUBJECT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)auto.{0,20}reply|vacation|(out|away|on holiday).*office")
        .expect("autoreply subject regex")
});

/// What a rule pulled out of a message, before status resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub mail_type: Option<MailType>,
    pub subject: Option<String>,
    pub recipients: Vec<Recipient>,
    pub feedback: Option<FeedbackReport>,
}

/// One classification rule: a predicate and the extraction it selects.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Envelope) -> bool,
    pub extract: fn(&Envelope) -> Extraction,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Rules in evaluation order.
pub static RULES: [Rule; 6] = [
    Rule {
        name: "feedback_loop",
        matches: fbl::is_fbl,
        extract: extract_fbl,
    },
    Rule {
        name: "autoreply",
        matches: is_autoreply,
        extract: extract_autoreply,
    },
    Rule {
        name: "rfc1892_report",
        matches: is_rfc1892_report,
        extract: extract_dsn,
    },
    Rule {
        name: "x_failed_recipients",
        matches: has_failed_recipients,
        extract: extract_failed_recipients,
    },
    Rule {
        name: "first_body_part",
        matches: is_multipart_bounce,
        extract: extract_first_part,
    },
    Rule {
        name: "other_bounce",
        matches: is_bounce,
        extract: extract_whole_body,
    },
];

// ── Predicates ──────────────────────────────────────────────────────

/// Bounce-looking subject, or an `auto_reply` marker in `Precedence`/`From`.
pub fn is_bounce(env: &Envelope) -> bool {
    let subject = env
        .header
        .text("Subject")
        .is_some_and(|s| BOUNCE_SUBJECT_RE.is_match(&s));
    let marker = |name: &str| {
        env.header
            .text(name)
            .is_some_and(|v| v.contains("auto_reply"))
    };

    subject || marker("Precedence") || marker("From")
}

pub fn is_autoreply(env: &Envelope) -> bool {
    env.header
        .non_empty("Subject")
        .is_some_and(|s| AUTOREPLY_SUBJECT_RE.is_match(&s))
}

/// `multipart/report; report-type=delivery-status` with a boundary.
pub fn is_rfc1892_report(env: &Envelope) -> bool {
    env.header.content_type().is_some_and(|ct| {
        ct.mime_type == "multipart/report"
            && ct.report_type() == Some("delivery-status")
            && ct.boundary().is_some()
    })
}

pub fn has_failed_recipients(env: &Envelope) -> bool {
    env.header.non_empty("X-Failed-Recipients").is_some()
}

fn is_multipart_bounce(env: &Envelope) -> bool {
    env.header
        .content_type()
        .is_some_and(|ct| ct.boundary().is_some())
        && is_bounce(env)
}

// ── Extractors ──────────────────────────────────────────────────────

fn bounce_with(recipients: Vec<Recipient>) -> Extraction {
    Extraction {
        mail_type: Some(MailType::Bounce),
        recipients,
        ..Extraction::default()
    }
}

fn extract_fbl(env: &Envelope) -> Extraction {
    let feedback = fbl::feedback_report(env);

    let mut recipient = Recipient::new(feedback.original_rcpt_to.clone());
    recipient.status = Some(fbl::FBL_STATUS.to_string());
    recipient.action = Some(crate::model::Action::Failed);

    Extraction {
        mail_type: Some(MailType::Fbl),
        subject: env.header.text("Subject").map(|s| fbl::clean_subject(&s)),
        recipients: vec![recipient],
        feedback: Some(feedback),
    }
}

fn extract_autoreply(_env: &Envelope) -> Extraction {
    Extraction {
        recipients: vec![Recipient::with_category(BounceCategory::Autoreply)],
        ..Extraction::default()
    }
}

fn extract_dsn(env: &Envelope) -> Extraction {
    let report = parse_dsn(env.sections.machine.as_deref().unwrap_or(""));

    let recipients = report
        .per_recipient
        .iter()
        .map(|per| {
            let mut recipient = Recipient::new(per.email());
            recipient.status = per.status.clone();
            recipient.action = per.action;
            recipient
        })
        .collect();

    bounce_with(recipients)
}

fn extract_failed_recipients(env: &Envelope) -> Extraction {
    let recipients = env
        .header
        .text("X-Failed-Recipients")
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(|addr| Recipient::new(Some(addr.to_string())))
                .collect()
        })
        .unwrap_or_default();

    bounce_with(recipients)
}

fn emails_to_recipients(text: &str) -> Vec<Recipient> {
    find_emails(text)
        .into_iter()
        .map(|addr| Recipient::new(Some(addr)))
        .collect()
}

fn extract_first_part(env: &Envelope) -> Extraction {
    bounce_with(emails_to_recipients(
        env.sections.first.as_deref().unwrap_or(""),
    ))
}

fn extract_whole_body(env: &Envelope) -> Extraction {
    bounce_with(emails_to_recipients(&env.body))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(raw: &str) -> Option<&'static str> {
        let env = Envelope::from_raw(raw);
        RULES.iter().find(|r| (r.matches)(&env)).map(|r| r.name)
    }

    #[test]
    fn test_rule_order() {
        let names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            [
                "feedback_loop",
                "autoreply",
                "rfc1892_report",
                "x_failed_recipients",
                "first_body_part",
                "other_bounce"
            ]
        );
    }

    #[test]
    fn test_bounce_subjects() {
        for subject in [
            "Undeliverable: Hello",
            "Mail delivery failed: returning message to sender",
            "failure notice",
            "Delivery Status Notification (Failure)",
            "Returned mail: see transcript for details",
        ] {
            let raw = format!("Subject: {subject}\r\n\r\nbody");
            assert_eq!(first_match(&raw), Some("other_bounce"), "{subject}");
        }
    }

    #[test]
    fn test_autoreply_subjects() {
        for subject in [
            "Out of office auto-reply",
            "Auto Reply: hello",
            "On vacation",
            "I am away from the office",
        ] {
            let raw = format!("Subject: {subject}\r\n\r\nbody");
            assert_eq!(first_match(&raw), Some("autoreply"), "{subject}");
        }
    }

    #[test]
    fn test_precedence_marker() {
        let raw = "Subject: hi\r\nPrecedence: auto_reply\r\n\r\nbody";
        assert_eq!(first_match(raw), Some("other_bounce"));
    }

    #[test]
    fn test_from_marker() {
        let raw = "Subject: hi\r\nFrom: Robot <auto_reply@example.com>\r\n\r\nbody";
        assert!(is_bounce(&Envelope::from_raw(raw)));
        assert_eq!(first_match(raw), Some("other_bounce"));
    }

    #[test]
    fn test_dsn_beats_failed_recipients() {
        let raw = "X-Failed-Recipients: a@x.com\r\n\
            Content-Type: multipart/report; report-type=delivery-status; boundary=\"b1\"\r\n\r\nx";
        assert_eq!(first_match(raw), Some("rfc1892_report"));
    }

    #[test]
    fn test_report_needs_delivery_status_type() {
        let raw = "Content-Type: multipart/report; report-type=disposition-notification; boundary=b1\r\n\r\nx";
        assert_eq!(first_match(raw), None);
    }

    #[test]
    fn test_multipart_bounce_uses_first_part() {
        let raw = "Subject: Undeliverable: hi\r\n\
            Content-Type: multipart/mixed; boundary=\"sep\"\r\n\r\n\
            --sep\r\nCould not deliver to a@x.com\r\n--sep\r\nTo: other@y.com\r\n--sep--";
        let env = Envelope::from_raw(raw);
        assert!(is_multipart_bounce(&env));
        let extraction = extract_first_part(&env);
        let emails: Vec<_> = extraction
            .recipients
            .iter()
            .filter_map(|r| r.email.as_deref())
            .collect();
        assert_eq!(emails, ["a@x.com"]);
    }

    #[test]
    fn test_failed_recipients_drops_empty_entries() {
        let env = Envelope::from_raw("X-Failed-Recipients: a@x.com, ,b@y.com,\r\n\r\nbody");
        let extraction = extract_failed_recipients(&env);
        let emails: Vec<_> = extraction
            .recipients
            .iter()
            .filter_map(|r| r.email.as_deref())
            .collect();
        assert_eq!(emails, ["a@x.com", "b@y.com"]);
    }

    #[test]
    fn test_plain_message_matches_nothing() {
        assert_eq!(first_match("Subject: Lunch?\r\nFrom: bob@x.com\r\n\r\nSee you"), None);
    }
}
