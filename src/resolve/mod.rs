//! Status and category resolution.
//!
//! - [`status`]: normalize `D.D.D` codes, find one in a message body, derive
//!   the action
//! - [`category`]: status code to bounce category
//! - [`explain`]: RFC 1893 prose for a status code

pub mod category;
pub mod explain;
mod phrases;
pub mod status;

pub use category::category_for_status;
pub use explain::{explain_status_code, StatusExplanation, Subcode};
pub use phrases::PHRASES;
pub use status::{action_for_status, format_status_code, resolve_from_body};
