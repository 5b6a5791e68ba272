//! Timestamped output for actions and errors.
//!
//! The reporter owns both writers, so callers decide where output goes
//! (stdout/stderr for the CLI, buffers in tests).

use std::fmt;
use std::io::{self, Stderr, Stdout, Write};

use chrono::{DateTime, SecondsFormat, Utc};

use crate::event::Event;

/// Heading of an action block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionVerb {
    WouldCreate,
    Created,
    WouldDelete,
    Deleted,
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionVerb::WouldCreate => write!(f, "Would create event"),
            ActionVerb::Created => write!(f, "Created event"),
            ActionVerb::WouldDelete => write!(f, "Would delete event"),
            ActionVerb::Deleted => write!(f, "Deleted event"),
        }
    }
}

pub struct Reporter<O: Write, E: Write> {
    out: O,
    err: E,
    clock: fn() -> DateTime<Utc>,
}

impl Reporter<Stdout, Stderr> {
    pub fn stdio() -> Self {
        Reporter::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> Reporter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Reporter {
            out,
            err,
            clock: Utc::now,
        }
    }

    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    fn timestamp(&self) -> String {
        (self.clock)().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// Print one action block to the output writer.
    pub fn action(&mut self, verb: ActionVerb, event: &Event) {
        let block = format!(
            "-----[{}] {}-----\nTitle: {}\nStart: {}\nEnd: {}\n",
            self.timestamp(),
            verb,
            event.display_title(),
            event.display_start(),
            event.display_end(),
        );
        if let Err(e) = self.out.write_all(block.as_bytes()) {
            tracing::error!(error = %e, "could not write action report");
        }
    }

    /// Print a timestamped line to the error writer.
    pub fn error(&mut self, message: impl fmt::Display) {
        let line = format!("[{}] {}\n", self.timestamp(), message);
        if let Err(e) = self.err.write_all(line.as_bytes()) {
            tracing::error!(error = %e, %message, "could not write error report");
        }
    }

    pub fn flush(&mut self) {
        let _ = self.out.flush();
        let _ = self.err.flush();
    }

    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_action_block_format() {
        let mut reporter = Reporter::new(Vec::new(), Vec::new()).with_clock(fixed);
        let event = Event {
            title: Some("Lunch".to_string()),
            ..Event::default()
        };

        reporter.action(ActionVerb::WouldCreate, &event);
        let (out, err) = reporter.into_inner();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "-----[2025-03-01T08:30:00Z] Would create event-----\n\
             Title: Lunch\n\
             Start: No start date\n\
             End: No end date\n"
        );
        assert!(err.is_empty());
    }

    #[test]
    fn test_errors_go_to_error_writer() {
        let mut reporter = Reporter::new(Vec::new(), Vec::new()).with_clock(fixed);

        reporter.error("Access to calendar was denied.");
        let (out, err) = reporter.into_inner();

        assert!(out.is_empty());
        assert_eq!(
            String::from_utf8(err).unwrap(),
            "[2025-03-01T08:30:00Z] Access to calendar was denied.\n"
        );
    }
}
