//! Status code to bounce category.

use crate::model::BounceCategory;

/// Normalized status codes with a known category. Everything else leaves
/// the recipient unrecognized.
const STATUS_CATEGORIES: &[(&str, BounceCategory)] = &[
    ("4.0.0", BounceCategory::InternalError),
    ("4.2.0", BounceCategory::Defer),
    ("4.2.2", BounceCategory::Full),
    ("4.3.2", BounceCategory::Defer),
    ("4.4.7", BounceCategory::Timeout),
    ("4.5.1", BounceCategory::CommandReject),
    ("5.0.0", BounceCategory::Unknown),
    ("5.1.1", BounceCategory::Unknown),
    ("5.1.2", BounceCategory::Unknown),
    ("5.1.3", BounceCategory::Unknown),
    ("5.1.4", BounceCategory::Unknown),
    ("5.1.6", BounceCategory::Unknown),
    ("5.1.8", BounceCategory::Antispam),
    ("5.2.0", BounceCategory::Full),
    ("5.2.1", BounceCategory::UserReject),
    ("5.2.2", BounceCategory::Full),
    ("5.2.3", BounceCategory::Unknown),
    ("5.3.1", BounceCategory::Oversize),
    ("5.3.4", BounceCategory::Oversize),
    ("5.4.4", BounceCategory::Unknown),
    ("5.4.6", BounceCategory::Antispam),
    ("5.5.0", BounceCategory::ContentReject),
    ("5.5.2", BounceCategory::ContentReject),
    ("5.5.3", BounceCategory::ContentReject),
    ("5.5.4", BounceCategory::ContentReject),
    ("5.6.2", BounceCategory::ContentReject),
    ("5.7.0", BounceCategory::UserReject),
    ("5.7.1", BounceCategory::UserReject),
];

/// Category for a normalized status code, if the code is mapped.
pub fn category_for_status(status: &str) -> Option<BounceCategory> {
    STATUS_CATEGORIES
        .iter()
        .find(|(code, _)| *code == status)
        .map(|(_, category)| *category)
}
