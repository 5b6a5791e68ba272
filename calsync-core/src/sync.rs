//! One complete run: authorize, resolve, snapshot, reconcile, apply.

use std::io::Write;
use std::time::Duration;

use crate::apply::{ApplyReport, Mode, apply};
use crate::authorization::{DEFAULT_AUTH_TIMEOUT, request_access};
use crate::date_window::{DEFAULT_WINDOW_DAYS, DateWindow};
use crate::error::{CalSyncResult, Side};
use crate::reconcile::reconcile;
use crate::report::Reporter;
use crate::store::{CalendarStore, find_calendar};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub mode: Mode,
    pub window_days: u32,
    pub auth_timeout: Duration,
    /// Use this window instead of one computed from today
    pub window: Option<DateWindow>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            mode: Mode::Live,
            window_days: DEFAULT_WINDOW_DAYS,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
            window: None,
        }
    }
}

/// Mirror `source` into `target` (both `account→calendar`).
///
/// Any `Err` is fatal for the run. Failures of individual actions are
/// reported through `reporter` and recorded in the returned report.
pub async fn run_sync<S, O, E>(
    store: &S,
    source: &str,
    target: &str,
    options: &SyncOptions,
    reporter: &mut Reporter<O, E>,
) -> CalSyncResult<ApplyReport>
where
    S: CalendarStore + ?Sized,
    O: Write,
    E: Write,
{
    request_access(store, options.auth_timeout).await?;

    let source_calendar = find_calendar(store, source, Side::Source)?;
    let target_calendar = find_calendar(store, target, Side::Target)?;

    let window = match options.window {
        Some(window) => window,
        None => DateWindow::today(options.window_days)?,
    };
    tracing::debug!(start = %window.start(), end = %window.end(), "sync window");

    let source_events = store.events(&source_calendar, &window)?;
    let target_events = store.events(&target_calendar, &window)?;

    let plan = reconcile(&source_events, &target_events);
    tracing::info!(
        source = %source_calendar,
        target = %target_calendar,
        creations = plan.creations.len(),
        deletions = plan.deletions.len(),
        "reconciled"
    );

    Ok(apply(store, &target_calendar, &plan, options.mode, reporter))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalSyncError;
    use crate::event::{Event, EventTime};
    use crate::marker::SYNC_MARKER;
    use crate::store::MemoryStore;
    use crate::store::memory::AccessBehavior;
    use chrono::{Duration as ChronoDuration, NaiveDate, TimeZone, Utc};

    fn window() -> DateWindow {
        DateWindow::for_day(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(), &Utc, 30).unwrap()
    }

    fn options(mode: Mode) -> SyncOptions {
        SyncOptions {
            mode,
            window: Some(window()),
            ..SyncOptions::default()
        }
    }

    fn at(title: &str, day: u32) -> Event {
        let start = Utc.with_ymd_and_hms(2025, 3, day, 9, 0, 0).unwrap();
        Event::new(
            title,
            EventTime::DateTimeUtc(start),
            EventTime::DateTimeUtc(start + ChronoDuration::hours(1)),
        )
    }

    async fn run(
        store: &MemoryStore,
        source: &str,
        target: &str,
        mode: Mode,
    ) -> CalSyncResult<ApplyReport> {
        let mut reporter = Reporter::new(Vec::new(), Vec::new());
        run_sync(store, source, target, &options(mode), &mut reporter).await
    }

    #[tokio::test]
    async fn test_full_run_then_rerun_is_noop() {
        let store = MemoryStore::new();
        let work = store.add_calendar("iCloud", "Work");
        let mirror = store.add_calendar("Google", "Mirror");
        store.insert(&work, at("Planning", 3));
        store.insert(&work, at("Retro", 14));
        store.insert(&work, at("Next month", 31));
        let mut orphan = at("Cancelled", 5);
        orphan.notes = Some(SYNC_MARKER.to_string());
        store.insert(&mirror, orphan);
        store.insert(&mirror, at("Dentist", 6));

        let first = run(&store, "iCloud→Work", "Google→Mirror", Mode::Live)
            .await
            .unwrap();
        assert_eq!((first.created(), first.deleted(), first.failed()), (2, 1, 0));

        let second = run(&store, "iCloud→Work", "Google→Mirror", Mode::Live)
            .await
            .unwrap();
        assert!(second.outcomes.is_empty());

        let titles: Vec<_> = store
            .events(&mirror, &window())
            .unwrap()
            .iter()
            .map(|e| e.display_title().to_string())
            .collect();
        assert_eq!(titles, vec!["Planning", "Dentist", "Retro"]);
    }

    #[tokio::test]
    async fn test_events_running_at_midnight_are_mirrored_and_cleaned_up() {
        let store = MemoryStore::new();
        let work = store.add_calendar("iCloud", "Work");
        let mirror = store.add_calendar("Google", "Mirror");
        let began = window().start() - ChronoDuration::hours(2);
        let spanning = |title: &str| {
            Event::new(
                title,
                EventTime::DateTimeUtc(began),
                EventTime::DateTimeUtc(began + ChronoDuration::days(3)),
            )
        };
        store.insert(&work, spanning("Offsite"));
        let mut orphan = spanning("Cancelled trip");
        orphan.notes = Some(SYNC_MARKER.to_string());
        store.insert(&mirror, orphan);

        let report = run(&store, "iCloud→Work", "Google→Mirror", Mode::Live)
            .await
            .unwrap();

        assert_eq!((report.created(), report.deleted()), (1, 1));
        let titles: Vec<_> = store
            .all_events(&mirror)
            .iter()
            .map(|e| e.display_title().to_string())
            .collect();
        assert_eq!(titles, vec!["Offsite"]);
    }

    #[tokio::test]
    async fn test_dry_run_leaves_target_untouched() {
        let store = MemoryStore::new();
        let work = store.add_calendar("iCloud", "Work");
        let mirror = store.add_calendar("Google", "Mirror");
        store.insert(&work, at("Planning", 3));

        let report = run(&store, "iCloud→Work", "Google→Mirror", Mode::DryRun)
            .await
            .unwrap();

        assert_eq!(report.planned(), 1);
        assert!(store.all_events(&mirror).is_empty());
    }

    #[tokio::test]
    async fn test_denied_access_stops_before_lookup() {
        let store = MemoryStore::new().with_access(AccessBehavior::Deny);

        let err = run(&store, "a→b", "c→d", Mode::Live)
            .await
            .unwrap_err();

        assert!(matches!(err, CalSyncError::AuthorizationDenied));
    }

    #[tokio::test]
    async fn test_missing_calendars_are_fatal_per_side() {
        let store = MemoryStore::new();
        store.add_calendar("iCloud", "Work");

        let err = run(&store, "iCloud→Play", "iCloud→Work", Mode::Live)
            .await
            .unwrap_err();
        assert!(matches!(err, CalSyncError::CalendarNotFound { side: Side::Source, .. }));

        let err = run(&store, "iCloud→Work", "iCloud→Play", Mode::Live)
            .await
            .unwrap_err();
        assert!(matches!(err, CalSyncError::CalendarNotFound { side: Side::Target, .. }));
    }
}
