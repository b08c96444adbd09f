//! Bounce categories and the disposition rule attached to each.

use serde::Serialize;

/// Why a message bounced.
///
/// Every new recipient starts as [`BounceCategory::Unrecognized`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceCategory {
    Antispam,
    Autoreply,
    Concurrent,
    ContentReject,
    CommandReject,
    Defer,
    Delayed,
    DnsLoop,
    DnsUnknown,
    Full,
    Inactive,
    InternalError,
    LatinOnly,
    Other,
    Oversize,
    Timeout,
    Unknown,
    #[default]
    Unrecognized,
    UserReject,
    Warning,
}

/// Coarse bounce kind, derived from the category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BounceType {
    Autoreply,
    Blocked,
    Generic,
    Hard,
    Soft,
    Temporary,
}

/// The `{remove, bounce_type}` pair bound to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RuleCategory {
    /// The recipient address should be dropped from mailing lists.
    pub remove: bool,
    pub bounce_type: Option<BounceType>,
}

impl BounceCategory {
    pub const ALL: [BounceCategory; 20] = [
        BounceCategory::Antispam,
        BounceCategory::Autoreply,
        BounceCategory::Concurrent,
        BounceCategory::ContentReject,
        BounceCategory::CommandReject,
        BounceCategory::Defer,
        BounceCategory::Delayed,
        BounceCategory::DnsLoop,
        BounceCategory::DnsUnknown,
        BounceCategory::Full,
        BounceCategory::Inactive,
        BounceCategory::InternalError,
        BounceCategory::LatinOnly,
        BounceCategory::Other,
        BounceCategory::Oversize,
        BounceCategory::Timeout,
        BounceCategory::Unknown,
        BounceCategory::Unrecognized,
        BounceCategory::UserReject,
        BounceCategory::Warning,
    ];

    /// The disposition rule for this category.
    pub fn rule(self) -> RuleCategory {
        use BounceCategory::*;

        let (remove, bounce_type) = match self {
            Antispam => (false, Some(BounceType::Blocked)),
            Autoreply => (false, Some(BounceType::Autoreply)),
            Concurrent => (false, Some(BounceType::Soft)),
            ContentReject => (false, Some(BounceType::Soft)),
            CommandReject => (true, Some(BounceType::Hard)),
            Defer => (false, Some(BounceType::Soft)),
            Delayed => (false, Some(BounceType::Temporary)),
            DnsLoop => (true, Some(BounceType::Hard)),
            DnsUnknown => (true, Some(BounceType::Hard)),
            Full => (false, Some(BounceType::Soft)),
            Inactive => (true, Some(BounceType::Hard)),
            InternalError => (false, Some(BounceType::Temporary)),
            LatinOnly => (false, Some(BounceType::Soft)),
            Other => (true, Some(BounceType::Generic)),
            Oversize => (false, Some(BounceType::Soft)),
            Timeout => (false, Some(BounceType::Soft)),
            Unknown => (true, Some(BounceType::Hard)),
            Unrecognized => (false, None),
            UserReject => (true, Some(BounceType::Hard)),
            Warning => (false, Some(BounceType::Soft)),
        };

        RuleCategory {
            remove,
            bounce_type,
        }
    }

    /// The snake_case tag used in output.
    pub fn as_str(self) -> &'static str {
        use BounceCategory::*;

        match self {
            Antispam => "antispam",
            Autoreply => "autoreply",
            Concurrent => "concurrent",
            ContentReject => "content_reject",
            CommandReject => "command_reject",
            Defer => "defer",
            Delayed => "delayed",
            DnsLoop => "dns_loop",
            DnsUnknown => "dns_unknown",
            Full => "full",
            Inactive => "inactive",
            InternalError => "internal_error",
            LatinOnly => "latin_only",
            Other => "other",
            Oversize => "oversize",
            Timeout => "timeout",
            Unknown => "unknown",
            Unrecognized => "unrecognized",
            UserReject => "user_reject",
            Warning => "warning",
        }
    }
}

impl std::fmt::Display for BounceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl BounceType {
    pub fn as_str(self) -> &'static str {
        match self {
            BounceType::Autoreply => "autoreply",
            BounceType::Blocked => "blocked",
            BounceType::Generic => "generic",
            BounceType::Hard => "hard",
            BounceType::Soft => "soft",
            BounceType::Temporary => "temporary",
        }
    }
}

impl std::fmt::Display for BounceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unrecognized() {
        assert_eq!(BounceCategory::default(), BounceCategory::Unrecognized);
        let rule = BounceCategory::Unrecognized.rule();
        assert!(!rule.remove);
        assert_eq!(rule.bounce_type, None);
    }

    #[test]
    fn test_only_unrecognized_has_no_type() {
        for cat in BounceCategory::ALL {
            let rule = cat.rule();
            assert_eq!(rule.bounce_type.is_none(), cat == BounceCategory::Unrecognized, "{cat}");
        }
    }

    #[test]
    fn test_removal_matches_hard_or_generic() {
        for cat in BounceCategory::ALL {
            let rule = cat.rule();
            let hardish = matches!(rule.bounce_type, Some(BounceType::Hard | BounceType::Generic));
            assert_eq!(rule.remove, hardish, "{cat}");
        }
    }

    #[test]
    fn test_serialized_tags() {
        assert_eq!(
            serde_json::to_string(&BounceCategory::ContentReject).unwrap(),
            "\"content_reject\""
        );
        assert_eq!(serde_json::to_string(&BounceType::Hard).unwrap(), "\"hard\"");
        for cat in BounceCategory::ALL {
            assert_eq!(serde_json::to_string(&cat).unwrap(), format!("\"{}\"", cat.as_str()));
        }
    }
}
