// Undo stack of full-surface snapshots, one per completed stroke.
// Unbounded unless a cap is configured; with a cap the oldest snapshot is
// dropped first.

use std::collections::VecDeque;

use tracing::debug;

use crate::surface::{DrawingSurface, Snapshot};

/// What an `undo` call did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UndoOutcome {
    /// Stack was empty; nothing changed.
    NothingToUndo,
    /// Surface now shows the previous stroke's snapshot.
    Restored(Snapshot),
    /// Last snapshot popped; surface is blank again.
    Blanked(Snapshot),
}

impl UndoOutcome {
    /// The snapshot removed from the stack, if any.
    pub fn popped(self) -> Option<Snapshot> {
        match self {
            UndoOutcome::NothingToUndo => None,
            UndoOutcome::Restored(s) | UndoOutcome::Blanked(s) => Some(s),
        }
    }
}

#[derive(Default)]
pub struct StrokeHistory {
    snapshots: VecDeque<Snapshot>,
    max_snapshots: Option<usize>,
}

impl StrokeHistory {
    pub fn new(max_snapshots: Option<usize>) -> Self {
        Self { snapshots: VecDeque::new(), max_snapshots }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        self.snapshots.push_back(snapshot);
        if let Some(cap) = self.max_snapshots {
            while self.snapshots.len() > cap {
                self.snapshots.pop_front();
            }
        }
        debug!(depth = self.snapshots.len(), "snapshot pushed");
    }

    /// Pop the newest snapshot and show the one beneath it (or a blank surface).
    pub fn undo<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) -> UndoOutcome {
        let Some(popped) = self.snapshots.pop_back() else {
            debug!("nothing to undo");
            return UndoOutcome::NothingToUndo;
        };
        match self.snapshots.back() {
            Some(previous) => {
                surface.restore_snapshot(previous);
                debug!(depth = self.snapshots.len(), "undo restored previous stroke");
                UndoOutcome::Restored(popped)
            }
            None => {
                surface.blank();
                debug!("undo cleared last stroke");
                UndoOutcome::Blanked(popped)
            }
        }
    }

    /// Forget every snapshot. The surface, if any, is left as it is.
    pub fn reset(&mut self) {
        self.snapshots.clear();
    }

    pub fn clear<S: DrawingSurface + ?Sized>(&mut self, surface: &mut S) {
        self.reset();
        surface.blank();
    }

    pub fn top(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Heap held by all snapshots.
    pub fn byte_size(&self) -> usize {
        self.snapshots.iter().map(Snapshot::byte_size).sum()
    }
}
