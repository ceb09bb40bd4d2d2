//! Trailing window of recent scores for trend reporting

use std::collections::VecDeque;

/// Number of scores retained
pub const HISTORY_CAPACITY: usize = 20;

/// Fixed-capacity FIFO of scores, oldest first
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    scores: VecDeque<f32>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            scores: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append the newest score, evicting exactly one oldest score when full
    pub fn append(&mut self, score: f32) {
        self.scores.push_back(score);
        if self.scores.len() > self.capacity {
            self.scores.pop_front();
        }
        debug_assert!(self.scores.len() <= self.capacity);
    }

    /// Current contents, oldest first
    pub fn snapshot(&self) -> Vec<f32> {
        self.scores.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mean of the retained scores
    pub fn mean(&self) -> Option<f32> {
        if self.scores.is_empty() {
            return None;
        }
        Some(self.scores.iter().sum::<f32>() / self.scores.len() as f32)
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
