//! Store Configuration
//!
//! Tunables for the engine workers. The defaults match the behaviour the
//! store has always had: a sweep every 500ms and a 3 second bound on every
//! request round-trip.

use std::time::Duration;

/// Shortest sweep interval a worker will run with.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Configuration for a [`Store`](crate::Store).
///
/// # Example
///
/// ```
/// use emberkv::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_sweep_interval(Duration::from_millis(100))
///     .with_request_timeout(Duration::from_secs(1));
/// assert_eq!(config.sweep_interval, Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Interval between expiry sweeps (default: 500ms)
    pub sweep_interval: Duration,

    /// Maximum wait for a worker to accept, and then answer, a request (default: 3s)
    pub request_timeout: Duration,

    /// Capacity of each engine's request queue (default: 64)
    pub queue_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_millis(500),
            request_timeout: Duration::from_secs(3),
            queue_capacity: 64,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how often the scalar engine looks for expired entries.
    ///
    /// An entry becomes invisible at most one interval after its ttl elapses.
    /// Values below [`MIN_SWEEP_INTERVAL`] are raised to it.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval.max(MIN_SWEEP_INTERVAL);
        self
    }

    /// Sets the bound on each request round-trip.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Sets the request queue capacity. Values below 1 are raised to 1.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }
}
