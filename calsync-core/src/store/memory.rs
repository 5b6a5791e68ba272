//! In-process calendar store.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::authorization::AccessResponder;
use crate::date_window::DateWindow;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::store::{CalendarInfo, CalendarStore};

/// How a [`MemoryStore`] answers access requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessBehavior {
    #[default]
    Grant,
    Deny,
    /// Answer granted from a freshly spawned thread
    GrantFromThread,
    /// Drop the responder without answering
    Drop,
    /// Hold on to the responder and never answer
    Ignore,
}

#[derive(Default)]
struct MemoryState {
    calendars: Vec<(CalendarInfo, Vec<Event>)>,
    failing_creates: HashSet<String>,
    failing_deletes: HashSet<String>,
    unanswered: Vec<AccessResponder>,
}

#[derive(Default)]
pub struct MemoryStore {
    access: AccessBehavior,
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_access(mut self, access: AccessBehavior) -> Self {
        self.access = access;
        self
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_calendar(&self, account: &str, title: &str) -> CalendarInfo {
        let mut state = self.state();
        let info = CalendarInfo {
            id: format!("memory-{}", state.calendars.len()),
            account: account.to_string(),
            title: title.to_string(),
        };
        state.calendars.push((info.clone(), Vec::new()));
        info
    }

    /// Add an event directly, bypassing failure injection.
    pub fn insert(&self, calendar: &CalendarInfo, event: Event) {
        if let Some(events) = self.state().calendar_mut(calendar) {
            events.push(event);
        }
    }

    /// Every event of `calendar`, in insertion order, regardless of any window.
    pub fn all_events(&self, calendar: &CalendarInfo) -> Vec<Event> {
        self.state()
            .calendars
            .iter()
            .find(|(info, _)| info.id == calendar.id)
            .map(|(_, events)| events.clone())
            .unwrap_or_default()
    }

    /// Make `create_event` fail for events with this title.
    pub fn fail_creating(&self, title: &str) {
        self.state().failing_creates.insert(title.to_string());
    }

    /// Make `delete_event` fail for events with this title.
    pub fn fail_deleting(&self, title: &str) {
        self.state().failing_deletes.insert(title.to_string());
    }
}

impl MemoryState {
    fn calendar_mut(&mut self, calendar: &CalendarInfo) -> Option<&mut Vec<Event>> {
        self.calendars
            .iter_mut()
            .find(|(info, _)| info.id == calendar.id)
            .map(|(_, events)| events)
    }
}

fn unknown_calendar(calendar: &CalendarInfo) -> CalSyncError {
    CalSyncError::Store(format!("unknown calendar {calendar}"))
}

impl CalendarStore for MemoryStore {
    fn request_access(&self, responder: AccessResponder) {
        match self.access {
            AccessBehavior::Grant => responder.grant(),
            AccessBehavior::Deny => responder.deny(),
            AccessBehavior::GrantFromThread => {
                std::thread::spawn(move || responder.grant());
            }
            AccessBehavior::Drop => drop(responder),
            AccessBehavior::Ignore => self.state().unanswered.push(responder),
        }
    }

    fn calendars(&self) -> CalSyncResult<Vec<CalendarInfo>> {
        Ok(self
            .state()
            .calendars
            .iter()
            .map(|(info, _)| info.clone())
            .collect())
    }

    fn events(&self, calendar: &CalendarInfo, window: &DateWindow) -> CalSyncResult<Vec<Event>> {
        let mut events: Vec<Event> = self
            .all_events(calendar)
            .into_iter()
            .filter(|e| window.contains_event(e))
            .collect();
        events.sort_by_key(Event::start_utc);
        Ok(events)
    }

    fn create_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<Event> {
        let mut state = self.state();
        if state.failing_creates.contains(event.display_title()) {
            return Err(CalSyncError::Store(format!(
                "refusing to save '{}'",
                event.display_title()
            )));
        }
        let events = state
            .calendar_mut(calendar)
            .ok_or_else(|| unknown_calendar(calendar))?;
        events.push(event.clone());
        Ok(event.clone())
    }

    fn delete_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<()> {
        let mut state = self.state();
        if state.failing_deletes.contains(event.display_title()) {
            return Err(CalSyncError::Store(format!(
                "refusing to remove '{}'",
                event.display_title()
            )));
        }
        let events = state
            .calendar_mut(calendar)
            .ok_or_else(|| unknown_calendar(calendar))?;
        let position = events
            .iter()
            .position(|e| e.uid == event.uid)
            .ok_or_else(|| CalSyncError::EventNotFound(event.uid.clone()))?;
        events.remove(position);
        Ok(())
    }
}
