//! ICS file generation and parsing.
//!
//! The local store keeps one VEVENT per .ics file (RFC 5545).

mod generate;
mod parse;

pub use generate::generate_ics;
pub use parse::parse_event;
