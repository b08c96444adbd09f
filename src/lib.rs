//! `bouncescan` — classify bounce, feedback-loop and autoreply e-mails.
//!
//! This crate provides the classification engine: it decides whether a
//! message is a delivery bounce, a spam complaint or an autoreply, extracts
//! the affected recipients, and resolves a normalized `D.D.D` status code,
//! an action, and a bounce category for each of them. Fetching messages and
//! acting on the result (delete, move) are left to the caller through
//! [`source::MessageSource`] and [`source::MessageDisposer`].

pub mod classify;
pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod resolve;
pub mod source;

pub use classify::{classify, classify_raw};
pub use resolve::explain_status_code;
