//! Per-recipient classification result.

use serde::Serialize;

use super::category::{BounceCategory, BounceType};

/// Delivery outcome for one recipient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Success,
    Transient,
    Failed,
}

impl Action {
    /// Read a DSN `Action:` field value.
    ///
    /// `failed`, `delayed`/`transient`, and `delivered`/`relayed`/`expanded`
    /// are understood; anything else is `None`.
    pub fn from_dsn(value: &str) -> Option<Self> {
        let value = value.trim().to_lowercase();
        // Servers sometimes append a comment: "failed (bad mailbox)".
        let word = value.split_whitespace().next().unwrap_or("");
        match word {
            "failed" => Some(Action::Failed),
            "delayed" | "transient" => Some(Action::Transient),
            "delivered" | "relayed" | "expanded" | "success" => Some(Action::Success),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Success => "success",
            Action::Transient => "transient",
            Action::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One affected address with its resolved status.
///
/// `bounce_category`, `bounce_type` and `remove` only change together,
/// through [`Recipient::apply_category`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recipient {
    pub email: Option<String>,
    /// Normalized `D.D.D` status code.
    pub status: Option<String>,
    pub action: Option<Action>,
    pub bounce_category: BounceCategory,
    pub bounce_type: Option<BounceType>,
    pub remove: bool,
}

impl Default for Recipient {
    fn default() -> Self {
        Self::with_category(BounceCategory::Unrecognized)
    }
}

impl Recipient {
    /// A recipient for `email` with nothing resolved yet.
    pub fn new(email: Option<String>) -> Self {
        Self {
            email,
            ..Self::default()
        }
    }

    /// An address-less recipient already tagged with `category`.
    pub fn with_category(category: BounceCategory) -> Self {
        let rule = category.rule();
        Self {
            email: None,
            status: None,
            action: None,
            bounce_category: category,
            bounce_type: rule.bounce_type,
            remove: rule.remove,
        }
    }

    /// Set the category together with its type and removal flag.
    pub fn apply_category(&mut self, category: BounceCategory) {
        let rule = category.rule();
        self.bounce_category = category;
        self.bounce_type = rule.bounce_type;
        self.remove = rule.remove;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_recipient_state() {
        let r = Recipient::default();
        assert_eq!(r.bounce_category, BounceCategory::Unrecognized);
        assert!(!r.remove);
        assert_eq!(r.status, None);
        assert_eq!(r.action, None);
        assert_eq!(r.bounce_type, None);
        assert_eq!(r.email, None);
    }

    #[test]
    fn test_apply_category_couples_fields() {
        let mut r = Recipient::new(Some("a@b.com".into()));
        r.apply_category(BounceCategory::Unknown);
        assert_eq!(r.bounce_type, Some(BounceType::Hard));
        assert!(r.remove);

        r.apply_category(BounceCategory::Full);
        assert_eq!(r.bounce_type, Some(BounceType::Soft));
        assert!(!r.remove);
    }

    #[test]
    fn test_autoreply_recipient() {
        let r = Recipient::with_category(BounceCategory::Autoreply);
        assert_eq!(r.bounce_type, Some(BounceType::Autoreply));
        assert!(!r.remove);
        assert!(r.email.is_none());
    }

    #[test]
    fn test_action_from_dsn() {
        assert_eq!(Action::from_dsn("failed"), Some(Action::Failed));
        assert_eq!(Action::from_dsn(" Failed (bad mailbox)"), Some(Action::Failed));
        assert_eq!(Action::from_dsn("delayed"), Some(Action::Transient));
        assert_eq!(Action::from_dsn("relayed"), Some(Action::Success));
        assert_eq!(Action::from_dsn("bogus"), None);
        assert_eq!(Action::from_dsn(""), None);
    }

    #[test]
    fn test_action_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Action::Transient).unwrap(), "\"transient\"");
    }
}
