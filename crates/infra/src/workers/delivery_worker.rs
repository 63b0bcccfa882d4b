use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use ledgerbus_events::{ApplyContext, Event, SubscriberRef};

use crate::event_bus::deliver;

/// Per-subscriber delivery loop for the asynchronous bus.
///
/// - Owns the receiving half of the subscriber's bounded channel
/// - Applies events in channel order, isolating failures
/// - Stops when the token is cancelled or every sender is dropped
#[derive(Debug)]
pub struct DeliveryWorker;

impl DeliveryWorker {
    /// Spawn the delivery task on the current tokio runtime.
    pub fn spawn(
        stream: String,
        subscriber: SubscriberRef,
        rx: mpsc::Receiver<Arc<Event>>,
        cancellation: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(worker_loop(stream, subscriber, rx, cancellation))
    }
}

async fn worker_loop(
    stream: String,
    subscriber: SubscriberRef,
    mut rx: mpsc::Receiver<Arc<Event>>,
    cancellation: CancellationToken,
) {
    debug!(subscriber = subscriber.name(), stream = %stream, "delivery worker started");
    let mut delivered: u64 = 0;

    loop {
        tokio::select! {
            biased;

            _ = cancellation.cancelled() => break,

            msg = rx.recv() => match msg {
                Some(event) => {
                    let ctx = ApplyContext::new(&stream, &cancellation);
                    deliver(subscriber.as_ref(), &ctx, &event);
                    delivered += 1;
                }
                None => break,
            },
        }
    }

    debug!(
        subscriber = subscriber.name(),
        stream = %stream,
        delivered,
        "delivery worker stopped"
    );
}
