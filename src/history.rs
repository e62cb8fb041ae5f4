use crate::raster::{Snapshot, Surface};

/// Manages the snapshot stacks behind undo/redo.
///
/// Every entry is a full copy of the raster. This is simple and exact but
/// memory grows with history; `with_max_depth` bounds the undo stack.
#[derive(Debug, Default)]
pub struct HistoryManager {
    /// Rasters that can be restored by undo, most recent last
    undo_stack: Vec<Snapshot>,
    /// Rasters that can be restored by redo, most recent last
    redo_stack: Vec<Snapshot>,
    max_depth: Option<usize>,
}

impl HistoryManager {
    /// Creates a new, unbounded history
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a history that keeps at most `max_depth` undo entries
    pub fn with_max_depth(max_depth: Option<usize>) -> Self {
        Self {
            max_depth: max_depth.map(|depth| depth.max(1)),
            ..Self::default()
        }
    }

    /// Record a finished stroke. `before` is the raster as it was when the
    /// stroke began, which is what undo brings back.
    pub fn commit(&mut self, before: Snapshot) {
        self.push_undo(before);
        self.redo_stack.clear();
        log::debug!(
            "Committed snapshot (undo: {}, redo: 0, {} bytes held)",
            self.undo_stack.len(),
            self.memory_bytes()
        );
    }

    /// Restore the previous raster. No-op on an empty stack.
    pub fn undo(&mut self, surface: &mut impl Surface) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            log::trace!("Nothing to undo");
            return false;
        };
        self.redo_stack.push(surface.read_pixels());
        surface.write_pixels(&previous);
        true
    }

    /// Re-apply the last undone raster. No-op on an empty stack.
    pub fn redo(&mut self, surface: &mut impl Surface) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            log::trace!("Nothing to redo");
            return false;
        };
        self.push_undo(surface.read_pixels());
        surface.write_pixels(&next);
        true
    }

    /// Blank the raster, keeping the old content undoable
    pub fn clear(&mut self, surface: &mut impl Surface) {
        self.push_undo(surface.read_pixels());
        self.redo_stack.clear();
        surface.clear();
        log::debug!("Cleared canvas (undo: {})", self.undo_stack.len());
    }

    /// Returns true if there are snapshots that can be undone
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are snapshots that can be redone
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn undo_stack(&self) -> &[Snapshot] {
        &self.undo_stack
    }

    pub fn redo_stack(&self) -> &[Snapshot] {
        &self.redo_stack
    }

    /// Total raster bytes held by both stacks
    pub fn memory_bytes(&self) -> usize {
        self.undo_stack
            .iter()
            .chain(&self.redo_stack)
            .map(Snapshot::memory_bytes)
            .sum()
    }

    /// Forget all history, e.g. when the canvas is externally reset
    pub fn reset(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_undo(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);
        if let Some(max) = self.max_depth {
            if self.undo_stack.len() > max {
                let excess = self.undo_stack.len() - max;
                self.undo_stack.drain(..excess);
            }
        }
    }
}
