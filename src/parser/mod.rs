//! Message parsing: normalization, header fields, body sections, addresses,
//! and delivery-status reports.

pub mod address;
pub mod dsn;
pub mod header;
pub mod normalize;
pub mod sections;

pub use address::{extract_email, find_emails};
pub use dsn::{parse_dsn, DiagnosticCode, DsnReport, PerRecipient, TypedAddress};
pub use header::{
    canonical_name, parse_header, parse_header_lines, parse_lines, ContentType, HeaderMap,
    HeaderValue,
};
pub use normalize::{decode_bytes, normalize_content, split_message};
pub use sections::{parse_body_sections, BodySections};
