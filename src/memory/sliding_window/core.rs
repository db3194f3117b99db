use std::collections::VecDeque;

/// Number of recent messages an actor sees when no length is configured.
pub const DEFAULT_HISTORY_CTX_LEN: usize = 4;

/// Bounded FIFO view of the most recent formatted messages.
///
/// A capacity of zero is valid: every push is evicted immediately and actors
/// are prompted with an empty history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextWindow {
    entries: VecDeque<String>,
    capacity: usize,
}

impl ContextWindow {
    /// Create an empty window holding at most `capacity` entries.
    ///
    /// Storage grows with the entries actually pushed, so any `usize` is a
    /// valid capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
        }
    }

    /// Get the configured capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry, returning the one evicted to make room, if any.
    pub fn push(&mut self, entry: String) -> Option<String> {
        if self.capacity == 0 {
            return Some(entry);
        }
        let evicted = if self.entries.len() >= self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Get all stored entries in chronological order.
    pub fn entries(&self) -> Vec<String> {
        self.iter().cloned().collect()
    }

    /// Borrowing iterator over the stored entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }
}

impl Default for ContextWindow {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CTX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::ContextWindow;

    #[test]
    fn evicts_oldest_when_full() {
        let mut window = ContextWindow::new(2);
        assert_eq!(window.push("a".into()), None);
        assert_eq!(window.push("b".into()), None);
        assert_eq!(window.push("c".into()), Some("a".to_string()));
        assert_eq!(window.entries(), vec!["b", "c"]);
    }

    #[test]
    fn zero_capacity_stays_empty() {
        let mut window = ContextWindow::new(0);
        assert_eq!(window.push("a".into()), Some("a".to_string()));
        assert!(window.is_empty());
        assert!(window.entries().is_empty());
    }

    #[test]
    fn huge_capacity_does_not_preallocate() {
        let mut window = ContextWindow::new(usize::MAX);
        assert_eq!(window.capacity(), usize::MAX);
        for i in 0..100 {
            assert_eq!(window.push(format!("m{i}")), None);
        }
        assert_eq!(window.len(), 100);
        assert_eq!(window.iter().next().map(String::as_str), Some("m0"));
        assert_eq!(window.iter().last().map(String::as_str), Some("m99"));
    }

    #[test]
    fn default_capacity_is_four() {
        assert_eq!(ContextWindow::default().capacity(), 4);
    }

    proptest! {
        #[test]
        fn window_is_suffix_of_pushes(capacity in 0usize..8, items in prop::collection::vec("[a-z]{1,4}", 0..32)) {
            let mut window = ContextWindow::new(capacity);
            for (i, item) in items.iter().enumerate() {
                window.push(item.clone());
                prop_assert!(window.len() <= capacity);
                let keep = capacity.min(i + 1);
                let expected: Vec<String> = items[i + 1 - keep..=i].to_vec();
                prop_assert_eq!(window.entries(), expected);
            }
        }
    }
}
