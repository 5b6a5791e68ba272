//! Calendar stores hold the calendars calsync reads from and writes to.

pub mod local;
pub mod memory;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::authorization::AccessResponder;
use crate::date_window::DateWindow;
use crate::error::{CalSyncError, CalSyncResult, Side};
use crate::event::Event;

pub use local::LocalStore;
pub use memory::MemoryStore;

/// Separates the account title from the calendar title on the command line.
pub const ACCOUNT_SEPARATOR: char = '→';

/// A calendar as listed by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarInfo {
    /// Store-specific identifier
    pub id: String,
    pub account: String,
    pub title: String,
}

impl fmt::Display for CalendarInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.account, ACCOUNT_SEPARATOR, self.title)
    }
}

/// `account→calendar` as given by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarRef {
    pub account: String,
    pub calendar: String,
}

impl CalendarRef {
    /// Exactly two non-empty parts, or nothing. Empty pieces between
    /// repeated separators are skipped.
    pub fn parse(spec: &str) -> Option<Self> {
        let mut parts = spec.split(ACCOUNT_SEPARATOR).filter(|s| !s.is_empty());
        let account = parts.next()?;
        let calendar = parts.next()?;
        if parts.next().is_some() {
            return None;
        }
        Some(CalendarRef {
            account: account.to_string(),
            calendar: calendar.to_string(),
        })
    }

    pub fn matches(&self, info: &CalendarInfo) -> bool {
        info.account == self.account && info.title == self.calendar
    }
}

/// Backend holding calendars.
///
/// Every method except `request_access` may only be called after access was
/// granted (see [`crate::authorization::request_access`]).
pub trait CalendarStore: Send + Sync {
    /// Start an access request. The answer goes through `responder`, exactly
    /// once, possibly from another thread.
    fn request_access(&self, responder: AccessResponder);

    fn calendars(&self) -> CalSyncResult<Vec<CalendarInfo>>;

    /// Events of `calendar` overlapping `window`, ordered by start.
    fn events(&self, calendar: &CalendarInfo, window: &DateWindow) -> CalSyncResult<Vec<Event>>;

    /// Persist `event` as a new event and return it as stored.
    fn create_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<Event>;

    /// Remove the event with `event.uid`.
    fn delete_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<()>;
}

/// Locate the calendar named by `spec` (exact account and calendar title).
pub fn find_calendar<S>(store: &S, spec: &str, side: Side) -> CalSyncResult<CalendarInfo>
where
    S: CalendarStore + ?Sized,
{
    let not_found = || CalSyncError::CalendarNotFound {
        side,
        spec: spec.to_string(),
    };

    let wanted = CalendarRef::parse(spec).ok_or_else(not_found)?;

    store
        .calendars()?
        .into_iter()
        .find(|info| wanted.matches(info))
        .ok_or_else(not_found)
}
