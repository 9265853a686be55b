//! Pool configuration options

use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Idle connections kept by default
pub const DEFAULT_MAX_IDLE: usize = 2;

/// Open connections allowed by default
pub const DEFAULT_MAX_OPEN: usize = DEFAULT_MAX_IDLE + 5;

/// Limits a [`Pool`](crate::Pool) starts with.
///
/// All of them can be changed later through the pool's setters.
///
/// # Examples
///
/// ```
/// use dialpool::PoolConfiguration;
/// use std::time::Duration;
///
/// let config = PoolConfiguration::new()
///     .with_max_idle(4)
///     .with_max_open(16)
///     .with_idle_timeout(Duration::from_secs(90));
///
/// assert_eq!(config.max_idle, 4);
/// assert_eq!(config.max_open, 16);
/// assert_eq!(config.idle_timeout, Some(Duration::from_secs(90)));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PoolConfiguration {
    /// Maximum number of idle connections kept for reuse; 0 keeps none
    pub max_idle: usize,

    /// Maximum number of open connections, idle plus in use; 0 is unbounded
    pub max_open: usize,

    /// How long a connection may sit idle before it is discarded
    pub idle_timeout: Option<Duration>,

    /// Upper bound on waiting in [`Pool::get_async`](crate::Pool::get_async)
    pub wait_timeout: Option<Duration>,
}

impl Default for PoolConfiguration {
    fn default() -> Self {
        Self {
            max_idle: DEFAULT_MAX_IDLE,
            max_open: DEFAULT_MAX_OPEN,
            idle_timeout: None,
            wait_timeout: None,
        }
    }
}

impl PoolConfiguration {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of idle connections
    pub fn with_max_idle(mut self, count: usize) -> Self {
        self.max_idle = count;
        self
    }

    /// Set the maximum number of open connections
    pub fn with_max_open(mut self, count: usize) -> Self {
        self.max_open = count;
        self
    }

    /// Set the idle timeout. A zero duration disables it.
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = non_zero(timeout);
        self
    }

    /// Set the wait timeout used by the async adapter
    pub fn with_wait_timeout(mut self, timeout: Duration) -> Self {
        self.wait_timeout = Some(timeout);
        self
    }

    /// Idle limit after clamping against the open limit
    pub(crate) fn effective_max_idle(&self) -> usize {
        if self.max_open > 0 {
            self.max_idle.min(self.max_open)
        } else {
            self.max_idle
        }
    }
}

pub(crate) fn non_zero(timeout: Duration) -> Option<Duration> {
    if timeout.is_zero() { None } else { Some(timeout) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PoolConfiguration::default();
        assert_eq!(config.max_idle, 2);
        assert_eq!(config.max_open, 7);
        assert_eq!(config.idle_timeout, None);
        assert_eq!(config.wait_timeout, None);
    }

    #[test]
    fn test_zero_idle_timeout_disables() {
        let config = PoolConfiguration::new()
            .with_idle_timeout(Duration::from_secs(5))
            .with_idle_timeout(Duration::ZERO);
        assert_eq!(config.idle_timeout, None);
    }

    #[test]
    fn test_effective_max_idle() {
        let clamped = PoolConfiguration::new().with_max_idle(10).with_max_open(3);
        assert_eq!(clamped.effective_max_idle(), 3);

        let unbounded = PoolConfiguration::new().with_max_idle(10).with_max_open(0);
        assert_eq!(unbounded.effective_max_idle(), 10);
    }
}
