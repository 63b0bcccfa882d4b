//! `ledgerbus-core`: foundation building blocks shared by every ledgerbus crate.
//!
//! This crate contains identifiers, the stream addressing scheme and the error
//! model (no bus mechanics, no IO).

pub mod error;
pub mod id;
pub mod stream;

pub use error::{BusError, BusResult};
pub use id::TransactionId;
pub use stream::{SUB_STREAM_SEPARATOR, sub_stream_name};
