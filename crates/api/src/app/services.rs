use std::sync::{Arc, Mutex};

use ledgerbus_core::{BusError, BusResult};
use ledgerbus_events::{Event, EventBuilder, EventBus, ReadLimit, StreamReader, WriteReceipt};
use ledgerbus_feedback::FeedbackService;
use ledgerbus_infra::{LocalAsyncBus, LocalSyncBus};

use crate::config::{ApiConfig, DeliveryMode};

/// Bus and subscribers shared by all handlers.
#[derive(Debug)]
pub enum AppServices {
    /// Inline delivery; the mutex serializes writers.
    Sync {
        bus: Mutex<LocalSyncBus>,
        feedback: Arc<FeedbackService>,
        stream: String,
    },
    /// Per-subscriber delivery tasks.
    Async {
        bus: LocalAsyncBus,
        feedback: Arc<FeedbackService>,
        stream: String,
    },
}

/// Create the configured bus and register the feedback service on the
/// feedback stream.
pub async fn build_services(config: &ApiConfig) -> BusResult<AppServices> {
    let feedback = Arc::new(FeedbackService::new());
    let stream = config.stream().to_string();

    match config.delivery() {
        DeliveryMode::Sync => {
            let mut bus = LocalSyncBus::new();
            bus.subscribe(&stream, feedback.clone())?;
            Ok(AppServices::Sync {
                bus: Mutex::new(bus),
                feedback,
                stream,
            })
        }
        DeliveryMode::Async => {
            let bus = LocalAsyncBus::with_config(config.bus());
            bus.subscribe(&stream, feedback.clone()).await?;
            Ok(AppServices::Async {
                bus,
                feedback,
                stream,
            })
        }
    }
}

impl AppServices {
    /// Stream feedback is published to.
    pub fn stream(&self) -> &str {
        match self {
            AppServices::Sync { stream, .. } | AppServices::Async { stream, .. } => stream.as_str(),
        }
    }

    pub fn feedback(&self) -> &FeedbackService {
        match self {
            AppServices::Sync { feedback, .. } | AppServices::Async { feedback, .. } => {
                feedback.as_ref()
            }
        }
    }

    pub async fn write(&self, stream: &str, event: EventBuilder) -> BusResult<WriteReceipt> {
        match self {
            AppServices::Sync { bus, .. } => write_locked(bus, stream, event),
            AppServices::Async { bus, .. } => bus.write(stream, event).await,
        }
    }

    pub fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>> {
        match self {
            AppServices::Sync { bus, .. } => bus
                .lock()
                .map_err(|_| BusError::poisoned("sync bus"))?
                .read(stream, position, limit),
            AppServices::Async { bus, .. } => bus.read(stream, position, limit),
        }
    }

    /// Stop background delivery (no-op for inline delivery).
    pub async fn shutdown(&self) {
        if let AppServices::Async { bus, .. } = self {
            bus.shutdown().await;
        }
    }
}

fn write_locked(
    bus: &Mutex<LocalSyncBus>,
    stream: &str,
    event: EventBuilder,
) -> BusResult<WriteReceipt> {
    let mut bus = bus.lock().map_err(|_| BusError::poisoned("sync bus"))?;
    bus.write(stream, event)
}
