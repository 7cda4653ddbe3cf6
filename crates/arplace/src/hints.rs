//! Delayed, cancellable user-facing hint messages.
//!
//! Time is supplied by the caller as session time (for example the render
//! loop's timestamp) so scheduling is deterministic.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Hint shown when the focus indicator cannot find a surface.
pub const FOCUS_HINT: &str = "TRY MOVING LEFT OR RIGHT";

/// Hint shown when no plane has been found after a restart.
pub const PLANE_SEARCH_HINT: &str = "FIND A SURFACE TO PLACE AN OBJECT";

/// Category of a hint. At most one hint per kind is pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HintKind {
    /// Waiting for the session to detect a plane.
    PlaneEstimation,
    /// The focus indicator has not found a surface.
    FocusSquare,
    /// Waiting for the user to place content.
    ContentPlacement,
}

/// A hint that has come due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    /// Category of the hint.
    pub kind: HintKind,
    /// Message text.
    pub text: String,
    /// Session time at which the hint was due.
    pub due: Duration,
}

/// Schedules hints and reports them when they come due.
#[derive(Debug, Default)]
pub struct HintScheduler {
    pending: Vec<Hint>,
}

impl HintScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a hint to fire `delay` after `now`.
    ///
    /// If a hint of the same kind is already pending it is kept unchanged, so
    /// repeated per-frame scheduling does not postpone it.
    pub fn schedule(
        &mut self,
        kind: HintKind,
        text: impl Into<String>,
        delay: Duration,
        now: Duration,
    ) {
        if self.is_pending(kind) {
            return;
        }
        let due = now + delay;
        log::debug!("scheduled {kind:?} hint at {due:?}");
        self.pending.push(Hint {
            kind,
            text: text.into(),
            due,
        });
    }

    /// Schedules a hint, replacing any pending hint of the same kind.
    pub fn reschedule(
        &mut self,
        kind: HintKind,
        text: impl Into<String>,
        delay: Duration,
        now: Duration,
    ) {
        self.cancel(kind);
        self.schedule(kind, text, delay, now);
    }

    /// Cancels the pending hint of `kind`, if any. Returns whether one was pending.
    pub fn cancel(&mut self, kind: HintKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|hint| hint.kind != kind);
        before != self.pending.len()
    }

    /// Cancels every pending hint.
    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Returns whether a hint of `kind` is pending.
    #[must_use]
    pub fn is_pending(&self, kind: HintKind) -> bool {
        self.pending.iter().any(|hint| hint.kind == kind)
    }

    /// Removes and returns every hint due at or before `now`, earliest first.
    pub fn poll(&mut self, now: Duration) -> Vec<Hint> {
        let (mut due, pending): (Vec<Hint>, Vec<Hint>) =
            self.pending.drain(..).partition(|hint| hint.due <= now);
        self.pending = pending;
        due.sort_by_key(|hint| hint.due);
        due
    }
}
