//! Pending space-count writes to the service.
//!
//! Each lesson has at most one `PUT /api/lessons/{id}` in flight. While it
//! runs, later local changes only update the desired count; when it settles
//! the newest desired count is sent next, so the service always ends up with
//! the latest value even if requests complete out of order.

use crate::types::LessonId;
use std::collections::{HashMap, HashSet};

/// Write state for one lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingSync {
    /// Latest local count
    pub desired: u32,
    /// Count carried by the request in flight
    pub in_flight: u32,
}

/// A write the caller should send now
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpaceWrite {
    /// Lesson to update
    pub lesson_id: LessonId,
    /// Count to write
    pub spaces: u32,
}

/// Per-lesson queue of space writes plus lessons whose remote count is known
/// to disagree with the local one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutbox {
    pending: HashMap<LessonId, PendingSync>,
    drifted: HashSet<LessonId>,
}

impl SyncOutbox {
    /// Record a new local count; returns the write to send, if none is in
    /// flight for the lesson
    pub fn enqueue(&mut self, lesson_id: LessonId, spaces: u32) -> Option<SpaceWrite> {
        if let Some(entry) = self.pending.get_mut(&lesson_id) {
            entry.desired = spaces;
            return None;
        }
        self.pending.insert(
            lesson_id.clone(),
            PendingSync {
                desired: spaces,
                in_flight: spaces,
            },
        );
        Some(SpaceWrite { lesson_id, spaces })
    }

    /// The write carrying `spaces` succeeded
    pub fn confirm(&mut self, lesson_id: &LessonId, spaces: u32) -> Option<SpaceWrite> {
        self.settle(lesson_id, spaces)
    }

    /// The write carrying `spaces` failed for good; the lesson is marked as
    /// drifted until the next refresh
    pub fn fail(&mut self, lesson_id: &LessonId, spaces: u32) -> Option<SpaceWrite> {
        if self.pending.get(lesson_id).is_some_and(|entry| entry.in_flight == spaces) {
            self.drifted.insert(lesson_id.clone());
        }
        self.settle(lesson_id, spaces)
    }

    fn settle(&mut self, lesson_id: &LessonId, spaces: u32) -> Option<SpaceWrite> {
        let entry = self.pending.get_mut(lesson_id)?;
        if entry.in_flight != spaces {
            tracing::debug!(%lesson_id, spaces, "Ignoring completion for a write not in flight");
            return None;
        }
        if entry.desired == spaces {
            self.pending.remove(lesson_id);
            return None;
        }
        entry.in_flight = entry.desired;
        Some(SpaceWrite {
            lesson_id: lesson_id.clone(),
            spaces: entry.desired,
        })
    }

    /// Write state for a lesson
    #[must_use]
    pub fn pending(&self, lesson_id: &LessonId) -> Option<PendingSync> {
        self.pending.get(lesson_id).copied()
    }

    /// Latest local counts not yet acknowledged by the service
    pub fn unacknowledged(&self) -> impl Iterator<Item = (&LessonId, u32)> {
        self.pending.iter().map(|(id, entry)| (id, entry.desired))
    }

    /// Whether no write is in flight
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a write for the lesson was abandoned since the last refresh
    #[must_use]
    pub fn is_drifted(&self, lesson_id: &LessonId) -> bool {
        self.drifted.contains(lesson_id)
    }

    /// Lessons whose writes were abandoned since the last refresh
    #[must_use]
    pub fn drifted(&self) -> Vec<LessonId> {
        let mut ids: Vec<LessonId> = self.drifted.iter().cloned().collect();
        ids.sort();
        ids
    }

    /// Forget drift after the service's counts were reloaded
    pub fn clear_drift(&mut self) {
        self.drifted.clear();
    }
}
