//! Infrastructure layer: ledger storage, bus variants, delivery workers, config.

pub mod config;
pub mod event_bus;
pub mod event_store;
pub mod registry;
pub mod workers;

mod integration_tests;

pub use config::AsyncBusConfig;
pub use event_bus::{LocalAsyncBus, LocalSyncBus};
pub use event_store::{Committed, InMemoryLedger};
