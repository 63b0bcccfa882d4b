//! Integration tests for the full write/notify/read pipeline.
//!
//! Tests: write → ledger → subscriber → projection catch-up
//!
//! Verifies:
//! - Live (subscriber-fed) and replayed (read-fed) read models agree
//! - Sub-streams act as per-entity histories
//! - Both bus variants serve the same projection code

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    use ledgerbus_events::{
        ApplyContext, Event, EventBus, Projection, ProjectionError, ProjectionRunner, ReadLimit,
        StreamReader, Subscriber, new_event, new_event_metadata,
    };

    use crate::{AsyncBusConfig, LocalAsyncBus, LocalSyncBus};

    #[derive(Debug, Serialize, Deserialize)]
    struct StockAdjusted {
        sku: String,
        delta: i64,
    }

    /// Stock level per SKU.
    #[derive(Debug, Default, Clone, PartialEq, Eq)]
    struct StockLevels {
        by_sku: HashMap<String, i64>,
    }

    impl Projection for StockLevels {
        fn apply(&mut self, event: &Event) {
            if event.event_type() != "stock:adjusted" {
                return;
            }
            if let Ok(adjusted) = event.body_json::<StockAdjusted>() {
                *self.by_sku.entry(adjusted.sku).or_default() += adjusted.delta;
            }
        }
    }

    /// Keeps a projection current from live notifications.
    #[derive(Default)]
    struct LiveProjection {
        levels: Mutex<StockLevels>,
    }

    impl Subscriber for LiveProjection {
        fn name(&self) -> &str {
            "live-stock-levels"
        }

        fn apply(&self, _ctx: &ApplyContext<'_>, event: &Event) -> anyhow::Result<()> {
            let mut levels = self
                .levels
                .lock()
                .map_err(|_| anyhow::anyhow!("levels lock poisoned"))?;
            levels.apply(event);
            Ok(())
        }
    }

    fn adjust(sku: &str, delta: i64, n: usize) -> ledgerbus_events::EventBuilder {
        new_event()
            .with_event_id(sku)
            .with_type("stock:adjusted")
            .with_json_body(&StockAdjusted {
                sku: sku.to_string(),
                delta,
            })
            .unwrap()
            .with_version(1)
            .with_metadata(new_event_metadata().with_trace_id(format!("adj-{n}")))
    }

    fn setup() -> (LocalSyncBus, Arc<LiveProjection>) {
        let mut bus = LocalSyncBus::new();
        let live = Arc::new(LiveProjection::default());
        bus.subscribe("Stock", live.clone()).unwrap();
        (bus, live)
    }

    #[test]
    fn live_and_replayed_read_models_agree() {
        let (mut bus, live) = setup();
        let adjustments = [("apple", 5), ("pear", 2), ("apple", -3), ("plum", 7), ("pear", 1)];
        for (n, (sku, delta)) in adjustments.iter().enumerate() {
            bus.write("Stock", adjust(sku, *delta, n)).unwrap();
        }

        let replayed =
            ProjectionRunner::rebuild_from_scratch("Stock", StockLevels::default, &bus).unwrap();

        let live = live.levels.lock().unwrap().clone();
        assert_eq!(replayed.projection(), &live);
        assert_eq!(live.by_sku["apple"], 2);
        assert_eq!(live.by_sku["pear"], 3);
    }

    #[test]
    fn sub_stream_is_an_entity_history() {
        let (mut bus, _) = setup();
        bus.write("Stock", adjust("apple", 5, 0)).unwrap();
        bus.write("Stock", adjust("pear", 1, 1)).unwrap();
        bus.write("Stock", adjust("apple", 4, 2)).unwrap();

        let history = bus.read("Stock-apple", 0, ReadLimit::All).unwrap();
        let locals: Vec<u64> = history.iter().map(Event::local_sequence_id).collect();
        let globals: Vec<u64> = history.iter().map(Event::global_sequence_id).collect();
        assert_eq!(locals, vec![1, 2]);
        assert_eq!(globals, vec![1, 3]);
        assert_eq!(history[1].metadata().trace_id(), Some("adj-2"));

        let mut runner = ProjectionRunner::new("Stock-apple", StockLevels::default());
        assert_eq!(runner.catch_up(&bus, 1).unwrap(), 2);
        assert_eq!(runner.projection().by_sku.get("pear"), None);
    }

    #[test]
    fn catch_up_resumes_from_cursor() {
        let (mut bus, _) = setup();
        let mut runner = ProjectionRunner::new("Stock", StockLevels::default());

        bus.write("Stock", adjust("apple", 1, 0)).unwrap();
        assert_eq!(runner.catch_up(&bus, 10).unwrap(), 1);

        bus.write("Stock", adjust("apple", 1, 1)).unwrap();
        bus.write("Stock", adjust("apple", 1, 2)).unwrap();
        assert_eq!(runner.catch_up(&bus, 10).unwrap(), 2);

        assert_eq!(runner.cursor().position(), 3);
        assert_eq!(runner.projection().by_sku["apple"], 3);
    }

    #[test]
    fn runner_rejects_replayed_history() {
        let (mut bus, _) = setup();
        bus.write("Stock", adjust("apple", 1, 0)).unwrap();

        let mut runner = ProjectionRunner::new("Stock", StockLevels::default());
        runner.catch_up(&bus, 10).unwrap();

        let again = bus.read("Stock", 0, ReadLimit::All).unwrap();
        let err = runner.apply(&again[0]).unwrap_err();
        assert_eq!(err, ProjectionError::NonMonotonicSequence { last: 1, found: 1 });
    }

    #[tokio::test]
    async fn async_bus_serves_the_same_projection() {
        let bus = LocalAsyncBus::with_config(AsyncBusConfig::new().with_channel_capacity(8));
        let live = Arc::new(LiveProjection::default());
        bus.subscribe("Stock", live.clone()).await.unwrap();

        for n in 0..20 {
            let sku = if n % 2 == 0 { "apple" } else { "pear" };
            bus.write("Stock", adjust(sku, 1, n)).await.unwrap();
        }

        let mut runner = ProjectionRunner::new("Stock", StockLevels::default());
        assert_eq!(runner.catch_up(&bus, 6).unwrap(), 20);

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        loop {
            let live = live.levels.lock().unwrap().clone();
            if &live == runner.projection() {
                break;
            }
            assert!(tokio::time::Instant::now() < deadline, "live projection lagging");
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        bus.shutdown().await;
        let reader: &dyn StreamReader = &bus;
        assert_eq!(reader.read("Stock", 0, ReadLimit::All).unwrap().len(), 20);
    }
}
