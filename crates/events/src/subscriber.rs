//! Subscriber capability.
//!
//! A subscriber is registered on one exact stream name and is notified once per
//! event appended to that stream. The bus stores only `Arc<dyn Subscriber>`; it
//! never knows the concrete type.
//!
//! ## Failure isolation
//!
//! An `apply` that returns `Err` or panics is caught by the bus and logged. It
//! does not stop delivery to the remaining subscribers and does not fail the
//! write: the ledger append has already happened by the time notification
//! starts.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::Event;

/// Shared handle to a registered subscriber.
pub type SubscriberRef = Arc<dyn Subscriber>;

/// Lifecycle context handed to [`Subscriber::start`].
#[derive(Debug, Clone, Copy)]
pub struct SubscriberContext<'a> {
    stream: &'a str,
    cancellation: &'a CancellationToken,
}

impl<'a> SubscriberContext<'a> {
    pub fn new(stream: &'a str, cancellation: &'a CancellationToken) -> Self {
        Self {
            stream,
            cancellation,
        }
    }

    /// Stream name the subscriber is being registered on.
    pub fn stream(&self) -> &'a str {
        self.stream
    }

    /// Token cancelled when the bus shuts down.
    ///
    /// Clone it to tie background work started in `start` to the bus lifetime.
    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancellation
    }
}

/// Execution context handed to [`Subscriber::apply`].
#[derive(Debug, Clone, Copy)]
pub struct ApplyContext<'a> {
    stream: &'a str,
    cancellation: &'a CancellationToken,
}

impl<'a> ApplyContext<'a> {
    pub fn new(stream: &'a str, cancellation: &'a CancellationToken) -> Self {
        Self {
            stream,
            cancellation,
        }
    }

    /// Stream name the event was appended to (general stream or sub-stream).
    pub fn stream(&self) -> &'a str {
        self.stream
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancellation
    }
}

/// Observer applying side effects per appended event.
///
/// `apply` is called with `&self` from the writer's thread (synchronous bus) or
/// from a dedicated delivery task (asynchronous bus), so implementations keep
/// their state behind interior mutability. Delivery may repeat across retries
/// by callers; `apply` should be idempotent.
pub trait Subscriber: Send + Sync + 'static {
    /// Name used in logs.
    ///
    /// The default is the type name, which can be verbose; override it when
    /// possible.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// Setup hook, invoked once per registration before `subscribe` returns.
    fn start(&self, ctx: &SubscriberContext<'_>) {
        let _ = ctx;
    }

    /// Apply side effects for one appended event.
    fn apply(&self, ctx: &ApplyContext<'_>, event: &Event) -> anyhow::Result<()>;
}
