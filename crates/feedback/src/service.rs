use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use ledgerbus_core::BusResult;
use ledgerbus_events::{ApplyContext, Event, EventBuilder, Subscriber, SubscriberContext, new_event};

/// Event type written for each submitted feedback.
pub const FEEDBACK_SENT: &str = "SentFeedback";

/// Stream feedback is published to unless configured otherwise.
pub const FEEDBACK_STREAM: &str = "PublishedFeedback";

/// Feedback payload, stored as the JSON event body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub contents: String,
}

impl Feedback {
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }

    /// Build a `SentFeedback` event with a fresh event id and this payload as
    /// body.
    pub fn to_event(&self) -> BusResult<EventBuilder> {
        new_event()
            .with_event_id(Uuid::now_v7().to_string())
            .with_type(FEEDBACK_SENT)
            .with_json_body(self)
    }
}

#[derive(Debug, Default)]
struct State {
    started_on: Vec<String>,
    applied: u64,
    last: Option<Feedback>,
}

/// Subscriber that records published feedback.
#[derive(Debug, Default)]
pub struct FeedbackService {
    state: Mutex<State>,
}

impl FeedbackService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Streams this service has been registered on, in order.
    pub fn started_on(&self) -> Vec<String> {
        self.state
            .lock()
            .map(|s| s.started_on.clone())
            .unwrap_or_default()
    }

    /// Number of feedback events applied.
    pub fn applied_count(&self) -> u64 {
        self.state.lock().map(|s| s.applied).unwrap_or_default()
    }

    pub fn last_feedback(&self) -> Option<Feedback> {
        self.state.lock().ok().and_then(|s| s.last.clone())
    }
}

impl Subscriber for FeedbackService {
    fn name(&self) -> &str {
        "feedback-service"
    }

    fn start(&self, ctx: &SubscriberContext<'_>) {
        info!(stream = ctx.stream(), "started feedback component service");
        if let Ok(mut state) = self.state.lock() {
            state.started_on.push(ctx.stream().to_string());
        }
    }

    fn apply(&self, ctx: &ApplyContext<'_>, event: &Event) -> anyhow::Result<()> {
        debug!(stream = ctx.stream(), event = ?event, "feedback event received");
        info!(
            "applying change from {} sequence number {}",
            event.metadata().origin_stream_name().unwrap_or_default(),
            event.local_sequence_id()
        );

        if event.event_type() != FEEDBACK_SENT {
            return Ok(());
        }

        let feedback: Feedback = event.body_json()?;
        let mut state = self
            .state
            .lock()
            .map_err(|_| anyhow::anyhow!("feedback state lock poisoned"))?;
        state.applied += 1;
        state.last = Some(feedback);
        Ok(())
    }
}
