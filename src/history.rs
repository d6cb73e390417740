//! Bounded recent-message history
//!
//! Replayed to every newly joining connection.

use std::collections::VecDeque;

/// Default number of messages kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Oldest-first ring of formatted chat lines
#[derive(Debug)]
pub struct History {
    entries: VecDeque<String>,
    capacity: usize,
}

impl History {
    /// Create an empty history holding at most `capacity` lines
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest when over capacity
    pub fn push(&mut self, line: String) {
        self.entries.push_back(line);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Copy of the current lines, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_keeps_order() {
        let mut history = History::new(3);
        history.push("a".to_string());
        history.push("b".to_string());

        assert_eq!(history.snapshot(), vec!["a", "b"]);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut history = History::default();
        for i in 0..150 {
            history.push(format!("msg {i}"));
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 100);
        assert_eq!(snapshot.first().map(String::as_str), Some("msg 50"));
        assert_eq!(snapshot.last().map(String::as_str), Some("msg 149"));
    }

    #[test]
    fn test_history_snapshot_is_detached() {
        let mut history = History::new(2);
        history.push("a".to_string());
        let snapshot = history.snapshot();
        history.push("b".to_string());

        assert_eq!(snapshot, vec!["a"]);
        assert_eq!(history.snapshot(), vec!["a", "b"]);
    }
}
