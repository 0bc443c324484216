//! # Bounded Ring
//!
//! Fixed-capacity FIFO used for the log and child-output panels. Pushing past
//! capacity evicts the oldest element.
//!
//! The ring also counts every element ever pushed. That running total acts as
//! a sequence number: callers remember `total_pushed()` and later ask for
//! everything appended `since()` that point, even after evictions.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Ring<T> {
    items: VecDeque<T>,
    capacity: usize,
    pushed: u64,
}

impl<T> Ring<T> {
    /// Creates an empty ring. A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
            pushed: 0,
        }
    }

    pub fn push(&mut self, item: T) {
        if self.items.len() == self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(item);
        self.pushed += 1;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of elements pushed over the ring's lifetime (including evicted ones).
    pub fn total_pushed(&self) -> u64 {
        self.pushed
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + ExactSizeIterator {
        self.items.iter()
    }

    /// The last `n` elements, oldest first.
    pub fn tail(&self, n: usize) -> impl Iterator<Item = &T> {
        let skip = self.items.len().saturating_sub(n);
        self.items.iter().skip(skip)
    }

    /// Elements pushed after the ring had seen `seq` pushes, oldest first.
    ///
    /// Elements that were already evicted are silently missing.
    pub fn since(&self, seq: u64) -> impl Iterator<Item = &T> {
        let newer = self.pushed.saturating_sub(seq);
        let newer = usize::try_from(newer).unwrap_or(usize::MAX);
        self.tail(newer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity_keeps_everything() {
        let mut ring = Ring::new(3);
        ring.push(1);
        ring.push(2);
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_never_exceeds_capacity_and_keeps_newest_in_order() {
        let mut ring = Ring::new(5);
        for i in 0..1_000 {
            ring.push(i);
            assert!(ring.len() <= 5);
        }
        assert_eq!(
            ring.iter().copied().collect::<Vec<_>>(),
            vec![995, 996, 997, 998, 999]
        );
        assert_eq!(ring.total_pushed(), 1_000);
    }

    #[test]
    fn test_capacity_one_holds_only_latest() {
        let mut ring = Ring::new(1);
        ring.push("a");
        ring.push("b");
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn test_zero_capacity_is_bumped() {
        let mut ring = Ring::new(0);
        ring.push(7);
        assert_eq!(ring.capacity(), 1);
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn test_tail_returns_last_n_oldest_first() {
        let mut ring = Ring::new(10);
        for i in 0..6 {
            ring.push(i);
        }
        assert_eq!(ring.tail(3).copied().collect::<Vec<_>>(), vec![3, 4, 5]);
        assert_eq!(ring.tail(50).count(), 6);
        assert_eq!(ring.tail(0).count(), 0);
    }

    #[test]
    fn test_since_returns_only_newer_items() {
        let mut ring = Ring::new(10);
        ring.push("old");
        let mark = ring.total_pushed();
        assert_eq!(ring.since(mark).count(), 0);

        ring.push("new1");
        ring.push("new2");
        assert_eq!(
            ring.since(mark).copied().collect::<Vec<_>>(),
            vec!["new1", "new2"]
        );
    }

    #[test]
    fn test_since_survives_eviction() {
        let mut ring = Ring::new(2);
        ring.push(1);
        let mark = ring.total_pushed();
        for i in 2..=5 {
            ring.push(i);
        }
        // Four newer pushes, but only two are still held.
        assert_eq!(ring.since(mark).copied().collect::<Vec<_>>(), vec![4, 5]);
    }
}
