/// Source of target selections when a session starts.
///
/// Each call picks one index in `0..len`; calls are independent, so the same
/// target may be picked for more than one slot.
pub trait TargetPicker: Send {
    fn pick_index(&mut self, len: usize) -> usize;
}

/// Replays a fixed sequence of indices (wrapped to `len`), cycling when exhausted.
#[derive(Debug, Clone)]
pub struct SequencePicker {
    indices: Vec<usize>,
    cursor: usize,
}

impl SequencePicker {
    #[must_use]
    pub fn new(indices: impl Into<Vec<usize>>) -> Self {
        Self {
            indices: indices.into(),
            cursor: 0,
        }
    }
}

impl TargetPicker for SequencePicker {
    fn pick_index(&mut self, len: usize) -> usize {
        if self.indices.is_empty() || len == 0 {
            return 0;
        }
        let raw = self.indices[self.cursor % self.indices.len()];
        self.cursor = self.cursor.wrapping_add(1);
        raw % len
    }
}
