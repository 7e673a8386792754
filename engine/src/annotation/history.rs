use shared::Drawing;

/// Undo/redo stacks of whole drawing collections.
///
/// A checkpoint is taken once per user action (gesture start, commit, delete,
/// duplicate), never per pointer frame. The oldest snapshots fall off past `limit`.
#[derive(Debug)]
pub struct History {
    undo: Vec<Vec<Drawing>>,
    redo: Vec<Vec<Drawing>>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self { undo: Vec::new(), redo: Vec::new(), limit: limit.max(1) }
    }

    pub fn checkpoint(&mut self, drawings: &[Drawing]) {
        self.undo.push(drawings.to_vec());
        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
        self.redo.clear();
    }

    /// Drops the latest checkpoint, for gestures that ended without a change.
    pub fn discard_last(&mut self) {
        self.undo.pop();
    }

    /// Returns the collection to restore, remembering `current` for redo.
    pub fn undo(&mut self, current: &[Drawing]) -> Option<Vec<Drawing>> {
        let previous = self.undo.pop()?;
        self.redo.push(current.to_vec());
        Some(previous)
    }

    pub fn redo(&mut self, current: &[Drawing]) -> Option<Vec<Drawing>> {
        let next = self.redo.pop()?;
        self.undo.push(current.to_vec());
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }
}
