//! The ownership marker stamped into events calsync creates.

use crate::event::Event;

/// Literal written to the notes of every mirrored event.
pub const SYNC_MARKER: &str = "[synced]";

/// Exact, case-sensitive substring match on the notes field.
pub fn is_marked(event: &Event) -> bool {
    event
        .notes
        .as_deref()
        .is_some_and(|notes| notes.contains(SYNC_MARKER))
}
