//! The time horizon both snapshots of a run are read with.

use chrono::{DateTime, Days, Duration, Local, NaiveDate, TimeZone, Utc};

use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;

pub const DEFAULT_WINDOW_DAYS: u32 = 30;

/// Half-open interval `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl DateWindow {
    /// `[startOfToday, startOfToday + days)` in the local zone.
    pub fn today(days: u32) -> CalSyncResult<Self> {
        let today = Local::now().date_naive();
        Self::for_day(today, &Local, days).ok_or_else(|| {
            CalSyncError::DateWindow(format!("cannot compute {days} days from {today}"))
        })
    }

    /// Window starting at local midnight of `day` in `tz`.
    ///
    /// Days are added on the calendar, so a window crossing a DST change ends
    /// at local midnight rather than at a fixed number of hours.
    pub fn for_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz, days: u32) -> Option<Self> {
        let last = day.checked_add_days(Days::new(days.into()))?;
        Some(DateWindow {
            start: start_of_day(day, tz)?,
            end: start_of_day(last, tz)?,
        })
    }

    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Option<Self> {
        (start <= end).then_some(DateWindow { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }

    /// True when the event starts in the window or is still running at its
    /// start. A missing end counts as the start. Undated events are never in.
    pub fn contains_event(&self, event: &Event) -> bool {
        let Some(start) = event.start_utc() else {
            return false;
        };
        let end = event.end_utc().unwrap_or(start);
        start < self.end && (start >= self.start || end > self.start)
    }
}

/// First valid local instant of `day`. Zones that skip midnight on DST days
/// resolve to the first minute that exists.
fn start_of_day<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    (0..=180)
        .find_map(|minutes| {
            tz.from_local_datetime(&(midnight + Duration::minutes(minutes)))
                .earliest()
        })
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventTime;
    use chrono_tz::America::New_York;

    fn window() -> DateWindow {
        DateWindow::for_day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), &Utc, 30).unwrap()
    }

    fn spanning(start: DateTime<Utc>, end: DateTime<Utc>) -> Event {
        Event::new(
            "Standup",
            EventTime::DateTimeUtc(start),
            EventTime::DateTimeUtc(end),
        )
    }

    fn starting_at(instant: DateTime<Utc>) -> Event {
        spanning(instant, instant + Duration::hours(1))
    }

    #[test]
    fn test_window_spans_thirty_days_from_midnight() {
        let w = window();

        assert_eq!(w.start(), Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(w.end(), Utc.with_ymd_and_hms(2025, 3, 31, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_start_inclusive_end_exclusive() {
        let w = window();

        assert!(w.contains_event(&starting_at(w.start())));
        assert!(w.contains_event(&starting_at(w.end() - Duration::seconds(1))));
        assert!(!w.contains_event(&starting_at(w.end())));
        assert!(!w.contains_event(&spanning(w.start() - Duration::hours(1), w.start())));
    }

    #[test]
    fn test_event_running_at_window_start_is_inside() {
        let w = window();
        let began = w.start() - Duration::hours(2);

        assert!(w.contains_event(&spanning(began, w.start() + Duration::hours(1))));
        assert!(w.contains_event(&spanning(began, began + Duration::days(3))));
        assert!(w.contains_event(&spanning(began, w.end() + Duration::days(1))));
    }

    #[test]
    fn test_instant_event_uses_start_as_end() {
        let w = window();
        let mut at_start = starting_at(w.start());
        at_start.end = None;
        let mut before = starting_at(w.start() - Duration::minutes(1));
        before.end = None;

        assert!(w.contains_event(&at_start));
        assert!(!w.contains_event(&before));
    }

    #[test]
    fn test_undated_event_is_outside() {
        assert!(!window().contains_event(&Event::default()));
    }

    #[test]
    fn test_window_across_dst_ends_at_local_midnight() {
        // DST starts 2025-03-09 in New York
        let w = DateWindow::for_day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), &New_York, 30)
            .unwrap();

        assert_eq!(w.start(), Utc.with_ymd_and_hms(2025, 3, 1, 5, 0, 0).unwrap());
        assert_eq!(w.end(), Utc.with_ymd_and_hms(2025, 3, 31, 4, 0, 0).unwrap());
    }

    #[test]
    fn test_new_rejects_inverted_bounds() {
        let w = window();

        assert!(DateWindow::new(w.end(), w.start()).is_none());
        assert_eq!(DateWindow::new(w.start(), w.end()), Some(w));
    }

    #[test]
    fn test_today_starts_at_local_midnight() {
        let w = DateWindow::today(DEFAULT_WINDOW_DAYS).unwrap();
        let local_start = w.start().with_timezone(&Local);

        assert_eq!(local_start.date_naive(), Local::now().date_naive());
        assert!(w.contains(&Utc::now()));
    }
}
