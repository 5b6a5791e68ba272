//! Core of calsync: one-way mirroring of one calendar into another.
//!
//! - `event`, `event_key` and `marker` define what an event is, how two
//!   events are recognized as the same, and which events calsync owns
//! - `reconcile` decides what to create and delete
//! - `store` holds calendars (`LocalStore` on disk, `MemoryStore` in memory)
//! - `apply`, `report` and `sync` carry a run out

pub mod apply;
pub mod authorization;
pub mod config;
pub mod date_window;
pub mod error;
pub mod event;
pub mod event_key;
pub mod ics;
pub mod marker;
pub mod reconcile;
pub mod report;
pub mod store;
pub mod sync;

pub use apply::{ApplyReport, Mode};
pub use error::{CalSyncError, CalSyncResult, Side};
pub use event::{Event, EventTime};
pub use event_key::EventKey;
pub use reconcile::{Reconciliation, reconcile};
