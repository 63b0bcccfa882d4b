use tokio_util::sync::CancellationToken;
use tracing::debug;

use ledgerbus_core::BusResult;
use ledgerbus_events::{
    ApplyContext, Event, EventBuilder, EventBus, ReadLimit, StreamReader, SubscriberContext,
    SubscriberRef, WriteReceipt,
};

use crate::event_bus::deliver;
use crate::event_store::InMemoryLedger;
use crate::registry::SubscriberRegistry;

/// Single-caller bus delivering inline on the writer's thread.
///
/// Every subscriber `apply` for both targets has run by the time `write`
/// returns. Share it across threads by wrapping it in a `Mutex`.
#[derive(Default)]
pub struct LocalSyncBus {
    ledger: InMemoryLedger,
    subscribers: SubscriberRegistry<SubscriberRef>,
    cancellation: CancellationToken,
}

impl LocalSyncBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `token` as the cancellation handed to subscriber contexts.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn subscriber_count(&self, stream: &str) -> usize {
        self.subscribers.count(stream)
    }

    pub fn stream_len(&self, stream: &str) -> usize {
        self.ledger.stream_len(stream)
    }

    pub fn global_sequence(&self) -> u64 {
        self.ledger.global_sequence()
    }

    fn notify(&self, stream: &str, event: &Event) {
        let ctx = ApplyContext::new(stream, &self.cancellation);
        for subscriber in self.subscribers.get(stream) {
            deliver(subscriber.as_ref(), &ctx, event);
        }
    }
}

impl std::fmt::Debug for LocalSyncBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSyncBus")
            .field("ledger", &self.ledger)
            .finish_non_exhaustive()
    }
}

impl StreamReader for LocalSyncBus {
    fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>> {
        Ok(self.ledger.read(stream, position, limit))
    }
}

impl EventBus for LocalSyncBus {
    fn subscribe(&mut self, stream: &str, subscriber: SubscriberRef) -> BusResult<()> {
        self.subscribers.register(stream, subscriber.clone());
        debug!(stream, subscriber = subscriber.name(), "subscriber registered");

        subscriber.start(&SubscriberContext::new(stream, &self.cancellation));
        Ok(())
    }

    fn write(&mut self, stream: &str, event: EventBuilder) -> BusResult<WriteReceipt> {
        let committed = self.ledger.commit(stream, &event);
        debug!(
            stream,
            event_id = event.event_id(),
            event_type = event.event_type(),
            transaction_id = %committed.receipt.transaction_id,
            global_sequence_id = committed.receipt.global_sequence_id,
            "event written"
        );

        for (target, stored) in committed.targets() {
            self.notify(target, stored);
        }

        Ok(committed.receipt)
    }
}
