//! Server configuration loaded from environment variables.

use std::net::SocketAddr;
use std::str::FromStr;

use tracing::warn;

use ledgerbus_feedback::FEEDBACK_STREAM;
use ledgerbus_infra::AsyncBusConfig;

pub const BIND_ADDR_ENV: &str = "LEDGERBUS_BIND_ADDR";
pub const STREAM_ENV: &str = "LEDGERBUS_STREAM";
pub const DELIVERY_ENV: &str = "LEDGERBUS_DELIVERY";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Which bus variant backs the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Subscribers run inline before the request completes.
    #[default]
    Sync,
    /// Subscribers run on their own delivery tasks.
    Async,
}

impl FromStr for DeliveryMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" => Ok(DeliveryMode::Sync),
            "async" => Ok(DeliveryMode::Async),
            other => Err(format!("unknown delivery mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    bind_addr: SocketAddr,
    stream: String,
    delivery: DeliveryMode,
    bus: AsyncBusConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(DEFAULT_BIND_ADDR),
            stream: FEEDBACK_STREAM.to_string(),
            delivery: DeliveryMode::default(),
            bus: AsyncBusConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup`; unparseable values are logged and defaulted.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self {
            bus: AsyncBusConfig::from_lookup(&lookup),
            ..Self::default()
        };

        if let Some(raw) = lookup(BIND_ADDR_ENV) {
            match raw.trim().parse::<SocketAddr>() {
                Ok(addr) => config.bind_addr = addr,
                Err(err) => {
                    warn!(var = BIND_ADDR_ENV, value = %raw, error = %err, "invalid bind address, using default")
                }
            }
        }

        if let Some(raw) = lookup(STREAM_ENV) {
            let stream = raw.trim();
            if stream.is_empty() {
                warn!(var = STREAM_ENV, "empty stream name, using default");
            } else {
                config.stream = stream.to_string();
            }
        }

        if let Some(raw) = lookup(DELIVERY_ENV) {
            match raw.parse::<DeliveryMode>() {
                Ok(mode) => config.delivery = mode,
                Err(err) => warn!(var = DELIVERY_ENV, error = %err, "using sync delivery"),
            }
        }

        config
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_stream(mut self, stream: impl Into<String>) -> Self {
        self.stream = stream.into();
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_bus(mut self, bus: AsyncBusConfig) -> Self {
        self.bus = bus;
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Stream feedback is written to and the feedback service listens on.
    pub fn stream(&self) -> &str {
        &self.stream
    }

    pub fn delivery(&self) -> DeliveryMode {
        self.delivery
    }

    pub fn bus(&self) -> AsyncBusConfig {
        self.bus
    }
}
