//! Carrying out a reconciliation against the target calendar.

use std::fmt;
use std::io::Write;

use crate::error::CalSyncError;
use crate::event::Event;
use crate::reconcile::Reconciliation;
use crate::report::{ActionVerb, Reporter};
use crate::store::{CalendarInfo, CalendarStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Report intended actions, change nothing
    DryRun,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Create,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Create => write!(f, "create"),
            ActionKind::Delete => write!(f, "delete"),
        }
    }
}

/// What happened to a single action.
#[derive(Debug)]
pub enum ActionOutcome {
    /// Dry-run: reported, not performed
    Planned { kind: ActionKind, event: Event },
    Applied { kind: ActionKind, event: Event },
    Failed {
        kind: ActionKind,
        event: Event,
        error: CalSyncError,
    },
}

impl ActionOutcome {
    pub fn kind(&self) -> ActionKind {
        match self {
            ActionOutcome::Planned { kind, .. }
            | ActionOutcome::Applied { kind, .. }
            | ActionOutcome::Failed { kind, .. } => *kind,
        }
    }

    pub fn event(&self) -> &Event {
        match self {
            ActionOutcome::Planned { event, .. }
            | ActionOutcome::Applied { event, .. }
            | ActionOutcome::Failed { event, .. } => event,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ActionOutcome::Failed { .. })
    }
}

#[derive(Debug, Default)]
pub struct ApplyReport {
    pub outcomes: Vec<ActionOutcome>,
}

impl ApplyReport {
    fn count(&self, wanted: ActionKind, pred: impl Fn(&ActionOutcome) -> bool) -> usize {
        self.outcomes
            .iter()
            .filter(|o| o.kind() == wanted && pred(o))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(ActionKind::Create, |o| matches!(o, ActionOutcome::Applied { .. }))
    }

    pub fn deleted(&self) -> usize {
        self.count(ActionKind::Delete, |o| matches!(o, ActionOutcome::Applied { .. }))
    }

    pub fn planned(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, ActionOutcome::Planned { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_failure()).count()
    }
}

/// Perform (or, in dry-run, report) every creation, then every deletion.
///
/// A failed action is reported on the error writer and the remaining actions
/// still run. Earlier successful actions are not undone.
pub fn apply<S, O, E>(
    store: &S,
    target: &CalendarInfo,
    plan: &Reconciliation,
    mode: Mode,
    reporter: &mut Reporter<O, E>,
) -> ApplyReport
where
    S: CalendarStore + ?Sized,
    O: Write,
    E: Write,
{
    let mut report = ApplyReport::default();

    for event in &plan.creations {
        let outcome = match mode {
            Mode::DryRun => {
                reporter.action(ActionVerb::WouldCreate, event);
                ActionOutcome::Planned {
                    kind: ActionKind::Create,
                    event: event.clone(),
                }
            }
            Mode::Live => match store.create_event(target, &event.synced_copy()) {
                Ok(created) => {
                    reporter.action(ActionVerb::Created, &created);
                    ActionOutcome::Applied {
                        kind: ActionKind::Create,
                        event: created,
                    }
                }
                Err(e) => {
                    let error = CalSyncError::EventCreation(Box::new(e));
                    failed(reporter, ActionKind::Create, event, error)
                }
            },
        };
        report.outcomes.push(outcome);
    }

    for event in &plan.deletions {
        let outcome = match mode {
            Mode::DryRun => {
                reporter.action(ActionVerb::WouldDelete, event);
                ActionOutcome::Planned {
                    kind: ActionKind::Delete,
                    event: event.clone(),
                }
            }
            Mode::Live => match store.delete_event(target, event) {
                Ok(()) => {
                    reporter.action(ActionVerb::Deleted, event);
                    ActionOutcome::Applied {
                        kind: ActionKind::Delete,
                        event: event.clone(),
                    }
                }
                Err(e) => {
                    let error = CalSyncError::EventDeletion(Box::new(e));
                    failed(reporter, ActionKind::Delete, event, error)
                }
            },
        };
        report.outcomes.push(outcome);
    }

    reporter.flush();
    report
}

fn failed<O: Write, E: Write>(
    reporter: &mut Reporter<O, E>,
    kind: ActionKind,
    event: &Event,
    error: CalSyncError,
) -> ActionOutcome {
    tracing::debug!(%kind, title = event.display_title(), %error, "action failed");
    reporter.error(&error);
    ActionOutcome::Failed {
        kind,
        event: event.clone(),
        error,
    }
}
