//! Event model and bus contracts.
//!
//! - [`Event`] / [`EventMetadata`]: immutable ledger records
//! - [`EventBuilder`]: the mutable producer-side value passed to `write`
//! - [`Subscriber`]: the observer capability the bus notifies
//! - [`EventBus`] / [`StreamReader`]: producer-facing operations
//! - [`Projection`] / [`ProjectionRunner`]: read-derived views over a stream

pub mod bus;
pub mod event;
pub mod metadata;
pub mod projection;
pub mod runner;
pub mod subscriber;

pub use bus::{EventBus, ReadLimit, StreamReader, WriteReceipt};
pub use event::{CommitStamp, Event, EventBuilder, new_event};
pub use metadata::{EventMetadata, new_event_metadata};
pub use projection::Projection;
pub use runner::{ProjectionCursor, ProjectionError, ProjectionRunner};
pub use subscriber::{ApplyContext, Subscriber, SubscriberContext, SubscriberRef};
