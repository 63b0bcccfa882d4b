//! Configuration loading for the bus variants.

use tracing::warn;

/// Environment variable holding the per-subscriber channel capacity.
pub const CHANNEL_CAPACITY_ENV: &str = "LEDGERBUS_CHANNEL_CAPACITY";

/// Settings for [`LocalAsyncBus`](crate::LocalAsyncBus).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AsyncBusConfig {
    channel_capacity: usize,
}

impl Default for AsyncBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1,
        }
    }
}

impl AsyncBusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounded capacity of each subscriber's delivery channel. Clamped to 1.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables.
    ///
    /// Invalid values are logged and replaced by the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let config = Self::default();

        match lookup(CHANNEL_CAPACITY_ENV) {
            None => config,
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) => config.with_channel_capacity(capacity),
                Err(err) => {
                    warn!(
                        var = CHANNEL_CAPACITY_ENV,
                        value = %raw,
                        error = %err,
                        "invalid channel capacity, using default"
                    );
                    config
                }
            },
        }
    }
}
