use std::sync::{Arc, RwLock};

use tokio::sync::{Mutex, OwnedMutexGuard, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use ledgerbus_core::{BusError, BusResult};
use ledgerbus_events::{
    Event, EventBuilder, EventMetadata, ReadLimit, StreamReader, SubscriberContext, SubscriberRef,
    WriteReceipt,
};

use crate::config::AsyncBusConfig;
use crate::event_store::InMemoryLedger;
use crate::registry::SubscriberRegistry;
use crate::workers::DeliveryWorker;

/// Bus delivering through one bounded channel and task per subscriber.
///
/// Cloning yields another handle to the same ledger and registry. The ledger
/// sits behind a `RwLock` so reads never wait on delivery; the channel
/// registry sits behind an async mutex held for the whole fan-out of a write,
/// so each subscriber receives events in global sequence order. The lock is
/// acquired in call order and handed to a spawned task that finishes the
/// write even if the caller stops waiting.
#[derive(Clone)]
pub struct LocalAsyncBus {
    inner: Arc<Inner>,
}

struct Inner {
    ledger: RwLock<InMemoryLedger>,
    channels: Arc<Mutex<Channels>>,
    cancellation: CancellationToken,
    config: AsyncBusConfig,
}

#[derive(Default)]
struct Channels {
    senders: SubscriberRegistry<mpsc::Sender<Arc<Event>>>,
    workers: Vec<JoinHandle<()>>,
    closed: bool,
}

impl Default for LocalAsyncBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for LocalAsyncBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalAsyncBus")
            .field("config", &self.inner.config)
            .field("cancelled", &self.inner.cancellation.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl LocalAsyncBus {
    pub fn new() -> Self {
        Self::with_config(AsyncBusConfig::default())
    }

    pub fn with_config(config: AsyncBusConfig) -> Self {
        Self::with_cancellation(config, CancellationToken::new())
    }

    /// Tie delivery tasks to an externally owned token.
    pub fn with_cancellation(config: AsyncBusConfig, cancellation: CancellationToken) -> Self {
        Self {
            inner: Arc::new(Inner {
                ledger: RwLock::new(InMemoryLedger::new()),
                channels: Arc::new(Mutex::new(Channels::default())),
                cancellation,
                config,
            }),
        }
    }

    pub fn config(&self) -> AsyncBusConfig {
        self.inner.config
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.inner.cancellation
    }

    pub fn new_event(&self) -> EventBuilder {
        EventBuilder::new()
    }

    pub fn new_event_metadata(&self) -> EventMetadata {
        EventMetadata::new()
    }

    /// Register `subscriber` on `stream`, run its `start` hook and spawn its
    /// delivery task.
    ///
    /// Fails with [`BusError::Closed`] once the bus has been shut down.
    pub async fn subscribe(&self, stream: &str, subscriber: SubscriberRef) -> BusResult<()> {
        let mut channels = self.inner.channels.lock().await;
        if channels.closed || self.inner.cancellation.is_cancelled() {
            return Err(BusError::Closed);
        }

        subscriber.start(&SubscriberContext::new(stream, &self.inner.cancellation));

        let (tx, rx) = mpsc::channel(self.inner.config.channel_capacity());
        debug!(stream, subscriber = subscriber.name(), "subscriber registered");
        let worker = DeliveryWorker::spawn(
            stream.to_string(),
            subscriber,
            rx,
            self.inner.cancellation.clone(),
        );

        channels.senders.register(stream, tx);
        channels.workers.push(worker);
        Ok(())
    }

    /// Append `event` to `stream` and its sub-stream, then hand the stored
    /// copies to every subscriber channel of each target.
    ///
    /// Waits while a subscriber's channel is full. Once the registry lock is
    /// taken, the append and fan-out run on their own task: dropping the
    /// returned future after that point still delivers to every subscriber.
    pub async fn write(&self, stream: &str, event: EventBuilder) -> BusResult<WriteReceipt> {
        let channels = self.inner.channels.clone().lock_owned().await;

        let task = tokio::spawn(commit_and_notify(
            self.inner.clone(),
            channels,
            stream.to_string(),
            event,
        ));

        task.await
            .map_err(|err| BusError::WriteAborted(err.to_string()))?
    }

    pub async fn subscriber_count(&self, stream: &str) -> usize {
        self.inner.channels.lock().await.senders.count(stream)
    }

    pub fn stream_len(&self, stream: &str) -> BusResult<usize> {
        let ledger = self
            .inner
            .ledger
            .read()
            .map_err(|_| BusError::poisoned("ledger"))?;
        Ok(ledger.stream_len(stream))
    }

    pub fn global_sequence(&self) -> BusResult<u64> {
        let ledger = self
            .inner
            .ledger
            .read()
            .map_err(|_| BusError::poisoned("ledger"))?;
        Ok(ledger.global_sequence())
    }

    /// Cancel delivery and wait for every delivery task to finish.
    ///
    /// The ledger stays readable and writable; later subscriptions fail.
    pub async fn shutdown(&self) {
        self.inner.cancellation.cancel();

        let workers = {
            let mut channels = self.inner.channels.lock().await;
            channels.closed = true;
            channels.senders.drain().for_each(drop);
            std::mem::take(&mut channels.workers)
        };

        for worker in workers {
            if let Err(err) = worker.await {
                warn!(error = %err, "delivery worker did not stop cleanly");
            }
        }
        debug!("async bus shut down");
    }
}

async fn commit_and_notify(
    inner: Arc<Inner>,
    channels: OwnedMutexGuard<Channels>,
    stream: String,
    event: EventBuilder,
) -> BusResult<WriteReceipt> {
    let committed = {
        let mut ledger = inner
            .ledger
            .write()
            .map_err(|_| BusError::poisoned("ledger"))?;
        ledger.commit(&stream, &event)
    };
    debug!(
        stream = %stream,
        event_id = event.event_id(),
        event_type = event.event_type(),
        transaction_id = %committed.receipt.transaction_id,
        global_sequence_id = committed.receipt.global_sequence_id,
        "event written"
    );

    for (target, stored) in committed.targets() {
        let senders = channels.senders.get(target);
        if senders.is_empty() {
            continue;
        }

        let shared = Arc::new(stored.clone());
        for tx in senders {
            if tx.send(shared.clone()).await.is_err() {
                warn!(
                    stream = target,
                    event_id = stored.event_id(),
                    "delivery worker gone, event not delivered"
                );
            }
        }
    }

    Ok(committed.receipt)
}

impl StreamReader for LocalAsyncBus {
    fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>> {
        let ledger = self
            .inner
            .ledger
            .read()
            .map_err(|_| BusError::poisoned("ledger"))?;
        Ok(ledger.read(stream, position, limit))
    }
}
