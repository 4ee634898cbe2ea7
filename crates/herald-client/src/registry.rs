//! Subscription bookkeeping.

use herald_core::Topic;
use std::collections::BTreeSet;

/// Topics subscribed on the current transport.
///
/// `active` mirrors what the server believes we are subscribed to and is
/// emptied whenever the transport goes away. `requested` remembers what
/// the caller asked for across reconnects; it is only consulted when full
/// re-subscription is enabled.
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    active: BTreeSet<Topic>,
    requested: BTreeSet<Topic>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a topic active. Returns `false` if it already was.
    pub fn activate(&mut self, topic: Topic) -> bool {
        self.active.insert(topic)
    }

    /// Mark a topic inactive. Returns `false` if it was not active.
    pub fn deactivate(&mut self, topic: &Topic) -> bool {
        self.active.remove(topic)
    }

    /// Remember a caller-requested topic.
    pub fn request(&mut self, topic: Topic) {
        self.requested.insert(topic);
    }

    /// Forget a caller-requested topic.
    pub fn forget(&mut self, topic: &Topic) {
        self.requested.remove(topic);
    }

    /// Drop every active subscription. Requested topics are kept.
    pub fn clear_active(&mut self) {
        self.active.clear();
    }

    pub fn is_active(&self, topic: &Topic) -> bool {
        self.active.contains(topic)
    }

    pub fn active(&self) -> impl Iterator<Item = &Topic> {
        self.active.iter()
    }

    pub fn requested(&self) -> impl Iterator<Item = &Topic> {
        self.requested.iter()
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topic(s: &str) -> Topic {
        s.parse().unwrap()
    }

    #[test]
    fn activate_is_idempotent() {
        let mut reg = SubscriptionRegistry::new();
        assert!(reg.activate(topic("/topic/a")));
        assert!(!reg.activate(topic("/topic/a")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn deactivate_absent_is_noop() {
        let mut reg = SubscriptionRegistry::new();
        reg.activate(topic("/topic/a"));
        assert!(!reg.deactivate(&topic("/topic/b")));
        assert_eq!(reg.active().collect::<Vec<_>>(), vec![&topic("/topic/a")]);
    }

    #[test]
    fn clear_active_keeps_requests() {
        let mut reg = SubscriptionRegistry::new();
        reg.request(topic("/topic/a"));
        reg.activate(topic("/topic/a"));
        reg.clear_active();
        assert!(reg.is_empty());
        assert_eq!(reg.requested().count(), 1);

        reg.forget(&topic("/topic/a"));
        assert_eq!(reg.requested().count(), 0);
    }
}
