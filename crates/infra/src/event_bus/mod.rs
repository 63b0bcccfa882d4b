//! Bus variants over the in-memory ledger.
//!
//! - [`LocalSyncBus`]: delivery inline on the writer's thread.
//! - [`LocalAsyncBus`]: one bounded channel and delivery task per subscriber.
//!
//! Both share the same write path and failure policy: a subscriber whose
//! `apply` returns `Err` or panics is logged at `warn` and skipped; the write
//! still succeeds.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::warn;

use ledgerbus_events::{ApplyContext, Event, Subscriber};

pub mod local_async;
pub mod local_sync;

pub use local_async::LocalAsyncBus;
pub use local_sync::LocalSyncBus;

/// Run one subscriber against one event, isolating failures.
///
/// Returns `true` when `apply` completed successfully.
pub(crate) fn deliver(subscriber: &dyn Subscriber, ctx: &ApplyContext<'_>, event: &Event) -> bool {
    match catch_unwind(AssertUnwindSafe(|| subscriber.apply(ctx, event))) {
        Ok(Ok(())) => true,
        Ok(Err(err)) => {
            warn!(
                subscriber = subscriber.name(),
                stream = ctx.stream(),
                event_id = event.event_id(),
                error = ?err,
                "subscriber apply failed"
            );
            false
        }
        Err(panic) => {
            warn!(
                subscriber = subscriber.name(),
                stream = ctx.stream(),
                event_id = event.event_id(),
                panic = %panic_message(&*panic),
                "subscriber apply panicked"
            );
            false
        }
    }
}

pub(crate) fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
