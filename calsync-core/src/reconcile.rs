//! One-way reconciliation of a source snapshot into a target snapshot.
//!
//! Given both snapshots, decide which source events are missing from the
//! target and which calsync-created target events no longer exist in the
//! source. Nothing here touches a store or the clock.

use std::collections::HashSet;

use crate::event::Event;
use crate::event_key::EventKey;
use crate::marker::is_marked;

/// Actions needed to bring a target in line with a source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// Source events to copy into the target, in source order.
    pub creations: Vec<Event>,
    /// Marked target events to remove, in target order.
    pub deletions: Vec<Event>,
}

impl Reconciliation {
    pub fn is_empty(&self) -> bool {
        self.creations.is_empty() && self.deletions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.creations.len() + self.deletions.len()
    }
}

/// Compute creations and deletions from two snapshots.
///
/// A source event whose key matches any target event, marked or not, is
/// already satisfied. Source events sharing a key produce a single creation
/// (the first one). Unmarked target events are never deleted.
pub fn reconcile(source: &[Event], target: &[Event]) -> Reconciliation {
    let target_keys: HashSet<EventKey> = target.iter().map(EventKey::of).collect();
    let mut planned: HashSet<EventKey> = HashSet::new();

    let creations = source
        .iter()
        .filter(|event| {
            let key = EventKey::of(event);
            !target_keys.contains(&key) && planned.insert(key)
        })
        .cloned()
        .collect();

    let source_keys: HashSet<EventKey> = source.iter().map(EventKey::of).collect();

    let deletions = target
        .iter()
        .filter(|event| is_marked(event) && !source_keys.contains(&EventKey::of(event)))
        .cloned()
        .collect();

    Reconciliation {
        creations,
        deletions,
    }
}
