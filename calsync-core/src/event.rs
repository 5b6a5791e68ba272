//! Provider-neutral event types.
//!
//! Stores convert whatever they hold into these types, and everything else
//! (key derivation, reconciliation, reporting) works exclusively with them.

use std::fmt;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::marker::SYNC_MARKER;

pub const UNTITLED: &str = "Untitled";
pub const NO_START_DATE: &str = "No start date";
pub const NO_END_DATE: &str = "No end date";

/// A calendar event as seen in one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Handle assigned by the store that holds the event.
    /// Never used to match events across calendars.
    pub uid: String,
    pub title: Option<String>,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTime {
    /// All-day event date
    Date(NaiveDate),
    DateTimeUtc(DateTime<Utc>),
    /// No timezone attached; interpreted in the local zone
    DateTimeFloating(NaiveDateTime),
    DateTimeZoned {
        datetime: NaiveDateTime,
        tzid: String,
    },
}

impl Event {
    pub fn new(title: impl Into<String>, start: EventTime, end: EventTime) -> Self {
        Event {
            uid: new_uid(),
            title: Some(title.into()),
            start: Some(start),
            end: Some(end),
            notes: None,
        }
    }

    /// The event calsync writes into a target calendar for this source event.
    ///
    /// Only title and times are carried over. Notes hold nothing but the marker.
    pub fn synced_copy(&self) -> Event {
        Event {
            uid: new_uid(),
            title: self.title.clone(),
            start: self.start.clone(),
            end: self.end.clone(),
            notes: Some(SYNC_MARKER.to_string()),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    pub fn display_start(&self) -> String {
        self.start
            .as_ref()
            .map(EventTime::to_string)
            .unwrap_or_else(|| NO_START_DATE.to_string())
    }

    pub fn display_end(&self) -> String {
        self.end
            .as_ref()
            .map(EventTime::to_string)
            .unwrap_or_else(|| NO_END_DATE.to_string())
    }

    /// Start as a UTC instant, used for window membership and ordering.
    pub fn start_utc(&self) -> Option<DateTime<Utc>> {
        self.start.as_ref().and_then(EventTime::to_utc)
    }

    pub fn end_utc(&self) -> Option<DateTime<Utc>> {
        self.end.as_ref().and_then(EventTime::to_utc)
    }
}

fn new_uid() -> String {
    format!("{}@calsync", uuid::Uuid::new_v4())
}

impl EventTime {
    /// The absolute instant, when the value carries one on its own.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            EventTime::DateTimeUtc(dt) => Some(*dt),
            EventTime::DateTimeZoned { datetime, tzid } => {
                let tz: chrono_tz::Tz = tzid.parse().ok()?;
                tz.from_local_datetime(datetime)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            EventTime::Date(_) | EventTime::DateTimeFloating(_) => None,
        }
    }

    /// Convert to UTC, resolving dates and floating times in the local zone.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        if let Some(instant) = self.instant() {
            return Some(instant);
        }
        let naive = match self {
            EventTime::Date(d) => d.and_hms_opt(0, 0, 0)?,
            EventTime::DateTimeFloating(dt) => *dt,
            EventTime::DateTimeZoned { datetime, .. } => *datetime,
            EventTime::DateTimeUtc(dt) => return Some(*dt),
        };
        Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for EventTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(instant) = self.instant() {
            return write!(f, "{}", instant.format("%Y-%m-%d %H:%M:%S +0000"));
        }
        match self {
            EventTime::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            EventTime::DateTimeFloating(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            EventTime::DateTimeZoned { datetime, tzid } => {
                write!(f, "{} {}", datetime.format("%Y-%m-%d %H:%M:%S"), tzid)
            }
            EventTime::DateTimeUtc(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S +0000")),
        }
    }
}
