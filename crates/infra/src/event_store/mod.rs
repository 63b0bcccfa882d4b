//! Append-only ledger storage.
//!
//! The ledger is partitioned by stream name. Each logical write lands in two
//! streams (the general stream and its `<stream>-<event_id>` sub-stream) under
//! one transaction id and one global sequence id.

pub mod in_memory;

pub use in_memory::{Committed, InMemoryLedger};
