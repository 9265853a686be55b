//! Idle connection bookkeeping

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// A connection parked in the pool together with the moment it went idle
#[derive(Debug)]
pub(crate) struct IdleEntry<R> {
    pub conn: R,
    pub idle_since: Instant,
}

impl<R> IdleEntry<R> {
    pub fn new(conn: R) -> Self {
        Self {
            conn,
            idle_since: Instant::now(),
        }
    }

    /// An entry expires once it has been idle for longer than `timeout`.
    /// `None` never expires.
    pub fn is_expired(&self, timeout: Option<Duration>, now: Instant) -> bool {
        match timeout {
            Some(timeout) => now.saturating_duration_since(self.idle_since) > timeout,
            None => false,
        }
    }
}

/// Ordered idle connections.
///
/// The front holds the most recently returned connection and is reused
/// first; the back holds the oldest one and is evicted first. Not
/// synchronized: callers hold the pool lock.
#[derive(Debug)]
pub(crate) struct IdleList<R> {
    entries: VecDeque<IdleEntry<R>>,
}

impl<R> IdleList<R> {
    pub fn new() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }

    pub fn push_front(&mut self, entry: IdleEntry<R>) {
        self.entries.push_front(entry);
    }

    pub fn pop_front(&mut self) -> Option<IdleEntry<R>> {
        self.entries.pop_front()
    }

    pub fn pop_back(&mut self) -> Option<IdleEntry<R>> {
        self.entries.pop_back()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Pop from the back until at most `max` entries remain
    pub fn trim_to(&mut self, max: usize) -> Vec<IdleEntry<R>> {
        let mut evicted = Vec::new();
        while self.entries.len() > max {
            match self.entries.pop_back() {
                Some(entry) => evicted.push(entry),
                None => break,
            }
        }
        evicted
    }

    /// Remove every entry, front first
    pub fn clear(&mut self) -> Vec<IdleEntry<R>> {
        self.entries.drain(..).collect()
    }
}

impl<R> Default for IdleList<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list_of(items: &[u32]) -> IdleList<u32> {
        let mut list = IdleList::new();
        for item in items {
            list.push_front(IdleEntry::new(*item));
        }
        list
    }

    #[test]
    fn test_front_is_most_recent() {
        let mut list = list_of(&[1, 2, 3]);

        assert_eq!(list.len(), 3);
        assert_eq!(list.pop_front().map(|e| e.conn), Some(3));
        assert_eq!(list.pop_back().map(|e| e.conn), Some(1));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_empty_pops() {
        let mut list: IdleList<u32> = IdleList::default();
        assert!(list.pop_front().is_none());
        assert!(list.pop_back().is_none());
    }

    #[test]
    fn test_trim_evicts_oldest() {
        let mut list = list_of(&[1, 2, 3, 4]);

        let evicted: Vec<u32> = list.trim_to(2).into_iter().map(|e| e.conn).collect();
        assert_eq!(evicted, vec![1, 2]);
        assert_eq!(list.len(), 2);
        assert!(list.trim_to(5).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut list = list_of(&[1, 2]);
        let cleared: Vec<u32> = list.clear().into_iter().map(|e| e.conn).collect();

        assert_eq!(cleared, vec![2, 1]);
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_expiry() {
        let entry = IdleEntry::new(7u32);
        let later = entry.idle_since + Duration::from_secs(10);

        assert!(!entry.is_expired(None, later));
        assert!(!entry.is_expired(Some(Duration::from_secs(10)), later));
        assert!(entry.is_expired(Some(Duration::from_secs(9)), later));
        assert!(!entry.is_expired(Some(Duration::from_secs(1)), entry.idle_since));
    }
}
