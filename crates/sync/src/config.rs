use std::time::Duration;

/// Timing and query settings for a sync session.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Delay before each subscription retry
    pub retry_backoff: Duration,
    /// Failed subscribes per episode before falling back to polling
    pub max_attempts: u32,
    /// Interval of the reconciliation fetch
    pub poll_interval: Duration,
    /// How long the network layer stays disabled during a connection reset
    pub reset_pause: Duration,
    /// Consecutive subscription failures that trigger a connection reset
    pub reset_after_failures: u32,
    /// Document field holding the owning user's id
    pub owner_field: String,
    /// Document field the live query orders by, newest first
    pub timestamp_field: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry_backoff: Duration::from_secs(5),
            max_attempts: 3,
            poll_interval: Duration::from_secs(60),
            reset_pause: Duration::from_secs(1),
            reset_after_failures: 2,
            owner_field: "userId".to_string(),
            timestamp_field: "createdAt".to_string(),
        }
    }
}

impl SyncConfig {
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_reset_pause(mut self, pause: Duration) -> Self {
        self.reset_pause = pause;
        self
    }

    pub fn with_fields(mut self, owner_field: impl Into<String>, timestamp_field: impl Into<String>) -> Self {
        self.owner_field = owner_field.into();
        self.timestamp_field = timestamp_field.into();
        self
    }
}
