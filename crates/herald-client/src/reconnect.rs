//! Reconnection budget.

use std::time::Duration;

/// Default number of reconnection attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default pause before a reconnection attempt fires.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(1000);

/// Counts reconnection attempts since the last successful connection.
///
/// The delay between attempts is fixed. Exponential backoff with jitter
/// would spread load better and is the obvious next step here.
#[derive(Debug, Clone)]
pub struct ReconnectCounter {
    attempts: u32,
    max_attempts: u32,
}

impl ReconnectCounter {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            attempts: 0,
            max_attempts,
        }
    }

    /// Consume one attempt. Returns the attempt number (1-based), or
    /// `None` once the budget is spent.
    pub fn try_next(&mut self) -> Option<u32> {
        if self.is_exhausted() {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn is_exhausted(&self) -> bool {
        self.attempts >= self.max_attempts
    }
}

impl Default for ReconnectCounter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}
