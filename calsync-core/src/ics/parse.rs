//! ICS file parsing using the icalendar crate's parser.

use crate::event::{Event, EventTime};
use icalendar::{
    CalendarDateTime, DatePerhapsTime,
    parser::{Component, read_calendar, unfold},
};

/// Parse ICS content into an Event.
///
/// Only UID is required. SUMMARY, DTSTART, DTEND and DESCRIPTION stay `None`
/// when absent so the key deriver sees exactly what the file holds.
pub fn parse_event(content: &str) -> Option<Event> {
    let unfolded = unfold(content);
    let calendar = read_calendar(&unfolded).ok()?;
    let vevent = calendar.components.iter().find(|c| c.name == "VEVENT")?;

    let uid = vevent.find_prop("UID")?.val.to_string();

    Some(Event {
        uid,
        title: vevent.find_prop("SUMMARY").map(|p| unescape_text(&p.val.to_string())),
        start: time_prop(vevent, "DTSTART"),
        end: time_prop(vevent, "DTEND"),
        notes: vevent
            .find_prop("DESCRIPTION")
            .map(|p| unescape_text(&p.val.to_string())),
    })
}

fn time_prop(vevent: &Component<'_>, name: &str) -> Option<EventTime> {
    let prop = vevent.find_prop(name)?;
    DatePerhapsTime::try_from(prop).ok().map(to_event_time)
}

/// Convert icalendar's DatePerhapsTime to our EventTime, preserving timezone info
fn to_event_time(dpt: DatePerhapsTime) -> EventTime {
    match dpt {
        DatePerhapsTime::Date(d) => EventTime::Date(d),
        DatePerhapsTime::DateTime(cal_dt) => match cal_dt {
            CalendarDateTime::Utc(dt) => EventTime::DateTimeUtc(dt),
            CalendarDateTime::Floating(naive) => EventTime::DateTimeFloating(naive),
            CalendarDateTime::WithTimezone { date_time, tzid } => EventTime::DateTimeZoned {
                datetime: date_time,
                tzid,
            },
        },
    }
}

/// Undo RFC 5545 TEXT escaping (`\n`, `\,`, `\;`, `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
