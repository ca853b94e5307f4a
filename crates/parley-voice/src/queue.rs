//! Pure FIFO of texts awaiting synthesis.
//!
//! Holds no async state: the scheduler owns the worker and calls into this
//! under its own lock. Duplicates are refused at enqueue time so a text is
//! never queued twice.

use std::collections::VecDeque;

/// Ordered, duplicate-free queue of synthesis inputs.
#[derive(Debug, Clone, Default)]
pub struct PreloadQueue {
    items: VecDeque<String>,
}

impl PreloadQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `text` unless it is already queued. Returns whether it was added.
    pub fn enqueue(&mut self, text: &str) -> bool {
        if self.contains(text) {
            return false;
        }
        self.items.push_back(text.to_string());
        true
    }

    /// Remove and return the oldest entry.
    pub fn pop_front(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|t| t == text)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop everything still waiting.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Snapshot of the queued texts in order.
    pub fn snapshot(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }
}
