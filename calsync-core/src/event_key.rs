//! Identity keys for matching events across calendars.

use std::fmt;

use crate::event::Event;

/// ASCII unit separator. Titles and rendered timestamps never contain it.
const KEY_SEPARATOR: char = '\u{1f}';

/// Identity of a logical event: its title, start and end.
///
/// Notes, uid and the calendar an event lives in play no part in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey(String);

impl EventKey {
    pub fn of(event: &Event) -> Self {
        let mut key = String::new();
        key.push_str(event.display_title());
        key.push(KEY_SEPARATOR);
        key.push_str(&event.display_start());
        key.push(KEY_SEPARATOR);
        key.push_str(&event.display_end());
        EventKey(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.replace(KEY_SEPARATOR, "|"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn utc(h: u32) -> EventTime {
        EventTime::DateTimeUtc(Utc.with_ymd_and_hms(2025, 3, 20, h, 0, 0).unwrap())
    }

    #[test]
    fn test_key_ignores_notes_and_uid() {
        let a = Event::new("Review", utc(10), utc(11));
        let mut b = Event::new("Review", utc(10), utc(11));
        b.notes = Some("[synced]".to_string());

        assert_ne!(a.uid, b.uid);
        assert_eq!(EventKey::of(&a), EventKey::of(&b));
    }

    #[test]
    fn test_key_differs_on_each_field() {
        let base = Event::new("Review", utc(10), utc(11));

        assert_ne!(EventKey::of(&base), EventKey::of(&Event::new("review", utc(10), utc(11))));
        assert_ne!(EventKey::of(&base), EventKey::of(&Event::new("Review ", utc(10), utc(11))));
        assert_ne!(EventKey::of(&base), EventKey::of(&Event::new("Review", utc(9), utc(11))));
        assert_ne!(EventKey::of(&base), EventKey::of(&Event::new("Review", utc(10), utc(12))));
    }

    #[test]
    fn test_missing_fields_use_sentinels() {
        let key = EventKey::of(&Event::default());

        assert_eq!(key.to_string(), "Untitled|No start date|No end date");
    }

    #[test]
    fn test_missing_title_matches_literal_untitled() {
        let mut untitled = Event::new("x", utc(10), utc(11));
        untitled.title = None;
        let literal = Event::new("Untitled", utc(10), utc(11));

        assert_eq!(EventKey::of(&untitled), EventKey::of(&literal));
    }

    #[test]
    fn test_pipe_in_title_does_not_collide() {
        let date = |d| EventTime::Date(NaiveDate::from_ymd_opt(2025, 3, d).unwrap());
        let mut a = Event::new("a|2025-03-01", date(2), date(3));
        a.end = None;
        let mut b = Event::new("a", date(1), date(2));
        b.end = None;

        assert_ne!(EventKey::of(&a), EventKey::of(&b));
    }
}
