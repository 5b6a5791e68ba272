//! Calendar store backed by a directory tree of .ics files.
//!
//! ```text
//! <root>/
//!   <account title>/
//!     <calendar title>/
//!       2025-03-20T1500_team-sync.ics
//! ```
//!
//! Hidden entries (leading `.`) are ignored at every level.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::authorization::{AccessDecision, AccessResponder};
use crate::date_window::DateWindow;
use crate::error::{CalSyncError, CalSyncResult};
use crate::event::Event;
use crate::ics::{generate_ics, parse_event};
use crate::store::{CalendarInfo, CalendarStore};

const MAX_FILENAME_SUFFIX: usize = 1000;

#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        LocalStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn calendar_path(&self, calendar: &CalendarInfo) -> PathBuf {
        self.root.join(&calendar.account).join(&calendar.title)
    }

    /// Every parseable event file in `dir`, in filename order.
    fn read_events(&self, dir: &Path) -> CalSyncResult<Vec<(PathBuf, Event)>> {
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "ics"))
            .collect();
        paths.sort();

        let mut events = Vec::with_capacity(paths.len());
        for path in paths {
            let content = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable event file");
                    continue;
                }
            };
            match parse_event(&content) {
                Some(event) => events.push((path, event)),
                None => tracing::warn!(path = %path.display(), "skipping unparseable event file"),
            }
        }
        Ok(events)
    }
}

fn visible_dirs(dir: &Path) -> CalSyncResult<Vec<(String, PathBuf)>> {
    let mut dirs: Vec<(String, PathBuf)> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter_map(|path| {
            let name = path.file_name()?.to_str()?.to_string();
            (!name.starts_with('.')).then_some((name, path))
        })
        .collect();
    dirs.sort();
    Ok(dirs)
}

fn access_decision(root: &Path) -> AccessDecision {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() && !meta.permissions().readonly() => AccessDecision::Granted,
        Ok(_) => {
            tracing::debug!(root = %root.display(), "calendar directory is not a writable directory");
            AccessDecision::Denied
        }
        Err(e) => {
            tracing::debug!(root = %root.display(), error = %e, "calendar directory unavailable");
            AccessDecision::Denied
        }
    }
}

/// Base filename for a new event: start stamp and title slug.
fn filename_base(event: &Event) -> String {
    let stamp = event
        .start_utc()
        .map(|start| start.format("%Y-%m-%dT%H%M").to_string())
        .unwrap_or_else(|| "undated".to_string());
    let slug = slug::slugify(event.display_title());
    if slug.is_empty() {
        format!("{stamp}_event")
    } else {
        format!("{stamp}_{slug}")
    }
}

impl CalendarStore for LocalStore {
    fn request_access(&self, responder: AccessResponder) {
        let root = self.root.clone();
        std::thread::spawn(move || responder.respond(access_decision(&root)));
    }

    fn calendars(&self) -> CalSyncResult<Vec<CalendarInfo>> {
        let mut calendars = Vec::new();
        for (account, account_path) in visible_dirs(&self.root)? {
            for (title, _) in visible_dirs(&account_path)? {
                calendars.push(CalendarInfo {
                    id: format!("{account}/{title}"),
                    account: account.clone(),
                    title,
                });
            }
        }
        Ok(calendars)
    }

    fn events(&self, calendar: &CalendarInfo, window: &DateWindow) -> CalSyncResult<Vec<Event>> {
        let dir = self.calendar_path(calendar);
        let mut events: Vec<Event> = self
            .read_events(&dir)?
            .into_iter()
            .map(|(_, event)| event)
            .filter(|event| window.contains_event(event))
            .collect();
        events.sort_by_key(Event::start_utc);

        tracing::debug!(calendar = %calendar, count = events.len(), "read snapshot");
        Ok(events)
    }

    fn create_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<Event> {
        let dir = self.calendar_path(calendar);
        let content = generate_ics(event)?;
        let base = filename_base(event);

        for n in 1..=MAX_FILENAME_SUFFIX {
            let filename = if n == 1 {
                format!("{base}.ics")
            } else {
                format!("{base}-{n}.ics")
            };
            let path = dir.join(&filename);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    fill_new_file(&path, file, content.as_bytes())?;
                    tracing::debug!(path = %path.display(), "wrote event");
                    return Ok(event.clone());
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(CalSyncError::Store(format!(
            "too many filename collisions for '{base}'"
        )))
    }

    fn delete_event(&self, calendar: &CalendarInfo, event: &Event) -> CalSyncResult<()> {
        let dir = self.calendar_path(calendar);
        let (path, _) = self
            .read_events(&dir)?
            .into_iter()
            .find(|(_, stored)| stored.uid == event.uid)
            .ok_or_else(|| CalSyncError::EventNotFound(event.uid.clone()))?;

        std::fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "removed event");
        Ok(())
    }
}

/// Write `content` into the freshly created `path`, removing it again when
/// the write fails so no truncated event stays behind.
fn fill_new_file(path: &Path, mut file: impl Write, content: &[u8]) -> std::io::Result<()> {
    let written = file.write_all(content).and_then(|()| file.flush());
    drop(file);
    if let Err(e) = written {
        if let Err(cleanup) = std::fs::remove_file(path) {
            tracing::warn!(path = %path.display(), error = %cleanup, "could not remove partial event file");
        }
        return Err(e);
    }
    Ok(())
}
