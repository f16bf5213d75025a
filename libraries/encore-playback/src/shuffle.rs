//! Shuffle order over the active context
//!
//! A permutation of context indices plus a cursor. The tracks themselves never
//! move; only the order in which their indices are visited does.

use rand::seq::SliceRandom;
use rand::Rng;

/// Permutation of `[0, len)` with a cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShuffleOrder {
    order: Vec<usize>,
    cursor: usize,
}

impl ShuffleOrder {
    /// Generate a fresh order over `len` indices (Fisher-Yates)
    ///
    /// When `pinned` is given, that index is moved to the front and the
    /// cursor starts on it.
    pub fn generate<R: Rng + ?Sized>(len: usize, pinned: Option<usize>, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..len).collect();
        order.shuffle(rng);

        if let Some(pinned) = pinned.filter(|&p| p < len) {
            if let Some(pos) = order.iter().position(|&i| i == pinned) {
                order.swap(0, pos);
            }
        }

        Self { order, cursor: 0 }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Check if the order is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Cursor position in the permutation
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Context index under the cursor
    pub fn current(&self) -> Option<usize> {
        self.order.get(self.cursor).copied()
    }

    /// Context index at a permutation position
    pub fn index_at(&self, position: usize) -> Option<usize> {
        self.order.get(position).copied()
    }

    /// Permutation position of a context index
    pub fn position_of(&self, index: usize) -> Option<usize> {
        self.order.iter().position(|&i| i == index)
    }

    /// Move the cursor onto a context index
    ///
    /// Returns false (cursor unchanged) if the index is not in the order.
    pub fn seek_to_index(&mut self, index: usize) -> bool {
        match self.position_of(index) {
            Some(position) => {
                self.cursor = position;
                true
            }
            None => false,
        }
    }

    /// Context index one step forward, wrapping
    pub fn peek_next(&self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        self.index_at((self.cursor + 1) % self.order.len())
    }

    /// Context index one step back, wrapping
    pub fn peek_previous(&self) -> Option<usize> {
        if self.order.is_empty() {
            return None;
        }
        let len = self.order.len();
        self.index_at((self.cursor + len - 1) % len)
    }

    /// Account for a track inserted into the context at `index`, and schedule
    /// it right after the cursor
    pub fn insert_after_cursor(&mut self, index: usize) {
        self.shift_from(index);
        let at = if self.order.is_empty() {
            0
        } else {
            self.cursor + 1
        };
        self.order.insert(at, index);
    }

    /// Account for a track inserted into the context at `index`, and schedule
    /// it last
    pub fn push_back(&mut self, index: usize) {
        self.shift_from(index);
        self.order.push(index);
    }

    /// The permutation
    pub fn as_slice(&self) -> &[usize] {
        &self.order
    }

    fn shift_from(&mut self, index: usize) {
        for entry in &mut self.order {
            if *entry >= index {
                *entry += 1;
            }
        }
    }
}
