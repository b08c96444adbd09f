//! Message-level classification result.

use serde::Serialize;

use super::recipient::Recipient;

/// Opaque message identifier supplied by the caller: a sequence number in a
/// mailbox, or a file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Token {
    Sequence(u64),
    Name(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Sequence(n) => write!(f, "#{n}"),
            Token::Name(name) => f.write_str(name),
        }
    }
}

impl From<u64> for Token {
    fn from(n: u64) -> Self {
        Token::Sequence(n)
    }
}

impl From<&str> for Token {
    fn from(name: &str) -> Self {
        Token::Name(name.to_string())
    }
}

impl From<String> for Token {
    fn from(name: String) -> Self {
        Token::Name(name)
    }
}

/// What kind of report the message is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MailType {
    Bounce,
    Fbl,
}

impl MailType {
    pub fn as_str(self) -> &'static str {
        match self {
            MailType::Bounce => "bounce",
            MailType::Fbl => "fbl",
        }
    }
}

/// The feedback-report fields recovered from a feedback-loop message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeedbackReport {
    pub feedback_type: Option<String>,
    pub user_agent: Option<String>,
    /// Sender of the reported message (address only).
    pub original_mail_from: Option<String>,
    /// Complaining recipient (address only).
    pub original_rcpt_to: Option<String>,
    pub received_date: Option<String>,
}

/// Classification of one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mail {
    pub token: Token,
    /// `false` when no extraction rule matched the message.
    pub processed: bool,
    pub subject: Option<String>,
    #[serde(rename = "type")]
    pub mail_type: Option<MailType>,
    pub recipients: Vec<Recipient>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<FeedbackReport>,
}

/// Caller policy for messages the classifier could not handle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispositionPolicy {
    /// Unprocessed messages are candidates for deletion.
    pub purge_unprocessed: bool,
}

/// What the caller should do with a message after classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Disposition {
    /// Processed, and at least one recipient should be removed.
    HardBounce,
    /// Processed, nothing to remove.
    Processed,
    /// No rule matched.
    Unprocessed { purge: bool },
}

impl Mail {
    /// An unprocessed result with no recipients.
    pub fn unprocessed(token: Token, subject: Option<String>) -> Self {
        Self {
            token,
            processed: false,
            subject,
            mail_type: None,
            recipients: Vec::new(),
            feedback: None,
        }
    }

    /// Whether any recipient is marked for removal.
    pub fn has_removable_recipient(&self) -> bool {
        self.recipients.iter().any(|r| r.remove)
    }

    pub fn disposition(&self, policy: &DispositionPolicy) -> Disposition {
        if !self.processed {
            Disposition::Unprocessed {
                purge: policy.purge_unprocessed,
            }
        } else if self.has_removable_recipient() {
            Disposition::HardBounce
        } else {
            Disposition::Processed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BounceCategory;

    fn mail_with(recipients: Vec<Recipient>) -> Mail {
        Mail {
            token: Token::Sequence(1),
            processed: true,
            subject: None,
            mail_type: Some(MailType::Bounce),
            recipients,
            feedback: None,
        }
    }

    #[test]
    fn test_disposition_hard_bounce() {
        let mut r = Recipient::new(Some("a@b.com".into()));
        r.apply_category(BounceCategory::Unknown);
        let mail = mail_with(vec![r]);
        assert!(mail.has_removable_recipient());
        assert_eq!(mail.disposition(&DispositionPolicy::default()), Disposition::HardBounce);
    }

    #[test]
    fn test_disposition_processed() {
        let mut r = Recipient::new(Some("a@b.com".into()));
        r.apply_category(BounceCategory::Full);
        let mail = mail_with(vec![r]);
        assert_eq!(mail.disposition(&DispositionPolicy::default()), Disposition::Processed);
    }

    #[test]
    fn test_disposition_unprocessed_follows_policy() {
        let mail = Mail::unprocessed(Token::from("x.eml"), None);
        let keep = DispositionPolicy::default();
        let purge = DispositionPolicy {
            purge_unprocessed: true,
        };
        assert_eq!(mail.disposition(&keep), Disposition::Unprocessed { purge: false });
        assert_eq!(mail.disposition(&purge), Disposition::Unprocessed { purge: true });
    }

    #[test]
    fn test_mail_serializes_type_key() {
        let mail = mail_with(Vec::new());
        let json = serde_json::to_value(&mail).unwrap();
        assert_eq!(json["type"], "bounce");
        assert_eq!(json["token"], 1);
        assert!(json.get("feedback").is_none());
    }

    #[test]
    fn test_token_display() {
        assert_eq!(Token::Sequence(7).to_string(), "#7");
        assert_eq!(Token::from("a.eml").to_string(), "a.eml");
    }
}
