//! Traffic counters.

use serde::{Deserialize, Serialize};

/// Point-in-time traffic figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionStats {
    /// Envelopes written to the transport.
    pub sent: u64,
    /// Notifications accepted into history.
    pub received: u64,
    /// Current history length.
    pub queue_size: usize,
}

/// Monotonic sent/received counters.
///
/// Queue depth is deliberately not stored here; it is read from the
/// history buffer when a snapshot is taken.
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    sent: u64,
    received: u64,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_sent(&mut self) {
        self.sent = self.sent.saturating_add(1);
    }

    pub fn record_received(&mut self) {
        self.received = self.received.saturating_add(1);
    }

    pub fn snapshot(&self, queue_size: usize) -> ConnectionStats {
        ConnectionStats {
            sent: self.sent,
            received: self.received,
            queue_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_and_snapshots() {
        let mut stats = StatsTracker::new();
        stats.record_sent();
        stats.record_received();
        stats.record_received();
        assert_eq!(
            stats.snapshot(7),
            ConnectionStats {
                sent: 1,
                received: 2,
                queue_size: 7
            }
        );
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(ConnectionStats::default()).unwrap();
        assert_eq!(json["queueSize"], 0);
    }
}
