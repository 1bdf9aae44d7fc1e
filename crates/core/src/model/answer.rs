use serde::{Deserialize, Serialize};

/// Per-question answer slots, parallel to a session's question list.
///
/// Each slot is `None` until written, then holds the selected option index.
/// `None` can also be written explicitly (time ran out / no answer), which
/// still consumes the slot.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet {
    slots: Vec<Option<usize>>,
}

impl AnswerSheet {
    /// Sheet with `len` unanswered slots.
    #[must_use]
    pub fn unanswered(len: usize) -> Self {
        Self {
            slots: vec![None; len],
        }
    }

    /// Rebuild a sheet from persisted slots.
    #[must_use]
    pub fn from_slots(slots: Vec<Option<usize>>) -> Self {
        Self { slots }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<usize> {
        self.slots.get(index).copied().flatten()
    }

    #[must_use]
    pub fn slots(&self) -> &[Option<usize>] {
        &self.slots
    }

    /// Write `choice` into slot `index`.
    ///
    /// Returns false when the index is out of range. Write-once is enforced by
    /// the session, which tracks locking separately because `None` is a valid
    /// final answer.
    pub fn record(&mut self, index: usize, choice: Option<usize>) -> bool {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = choice;
                true
            }
            None => false,
        }
    }

    /// Number of slots holding a selected option.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[must_use]
    pub fn unanswered_count(&self) -> usize {
        self.slots.len() - self.answered_count()
    }
}
