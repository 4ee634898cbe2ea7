//! Bounded notification history.

use herald_core::NotificationRecord;
use std::collections::VecDeque;

/// Default number of notifications kept.
pub const DEFAULT_CAPACITY: usize = 50;

/// Arrival-ordered, capacity-limited list of notifications.
///
/// Appending to a full buffer evicts from the front, so the buffer always
/// holds the most recent `capacity` records in the order they arrived.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    records: VecDeque<NotificationRecord>,
    capacity: usize,
}

impl HistoryBuffer {
    /// A buffer holding at most `capacity` records. A zero capacity is
    /// raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, record: NotificationRecord) {
        while self.records.len() >= self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &NotificationRecord> {
        self.records.iter()
    }

    /// Owned copy, oldest first.
    pub fn snapshot(&self) -> Vec<NotificationRecord> {
        self.records.iter().cloned().collect()
    }

    /// Records matching `pred`, oldest first.
    pub fn filter<F>(&self, mut pred: F) -> Vec<NotificationRecord>
    where
        F: FnMut(&NotificationRecord) -> bool,
    {
        self.records.iter().filter(|r| pred(r)).cloned().collect()
    }

    /// Records in the given category, oldest first.
    pub fn filter_by_kind(&self, kind: &str) -> Vec<NotificationRecord> {
        self.filter(|r| r.category == kind)
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: u64) -> NotificationRecord {
        NotificationRecord::new(id, format!("n{id}"), 1)
    }

    fn ids(buf: &HistoryBuffer) -> Vec<u64> {
        buf.iter().map(|r| r.id).collect()
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut buf = HistoryBuffer::new(5);
        for id in 1..=23 {
            buf.append(record(id));
            assert!(buf.len() <= 5);
            let expected: Vec<u64> = (id.saturating_sub(4).max(1)..=id).collect();
            assert_eq!(ids(&buf), expected);
        }
    }

    #[test]
    fn sixty_into_fifty_keeps_last_fifty() {
        let mut buf = HistoryBuffer::default();
        for id in 1..=60 {
            buf.append(record(id));
        }
        assert_eq!(buf.len(), 50);
        assert_eq!(ids(&buf), (11..=60).collect::<Vec<_>>());
    }

    #[test]
    fn zero_capacity_holds_one() {
        let mut buf = HistoryBuffer::new(0);
        buf.append(record(1));
        buf.append(record(2));
        assert_eq!(buf.capacity(), 1);
        assert_eq!(ids(&buf), vec![2]);
    }

    #[test]
    fn filter_by_kind_is_read_only() {
        let mut buf = HistoryBuffer::new(10);
        buf.append(record(1).with_category("task"));
        buf.append(record(2));
        buf.append(record(3).with_category("task"));

        let tasks = buf.filter_by_kind("task");
        assert_eq!(tasks.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(buf.len(), 3);
        assert!(buf.filter_by_kind("billing").is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut buf = HistoryBuffer::new(3);
        buf.append(record(1));
        buf.clear();
        assert!(buf.is_empty());
        assert!(buf.snapshot().is_empty());
    }
}
