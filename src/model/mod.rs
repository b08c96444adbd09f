//! Classification result types: mails, recipients, categories.

pub mod category;
pub mod mail;
pub mod recipient;

pub use category::{BounceCategory, BounceType, RuleCategory};
pub use mail::{Disposition, DispositionPolicy, FeedbackReport, Mail, MailType, Token};
pub use recipient::{Action, Recipient};
