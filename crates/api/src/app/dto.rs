use serde::{Deserialize, Serialize};

use ledgerbus_events::{Event, ReadLimit, WriteReceipt};
use ledgerbus_feedback::Feedback;

// -------------------------
// Request DTOs
// -------------------------

/// Query string of `GET /streams/:name`.
#[derive(Debug, Default, Deserialize)]
pub struct ReadStreamQuery {
    pub position: Option<usize>,
    /// Maximum events to return; `-1` (the default) returns all remaining.
    pub limit: Option<i64>,
}

impl ReadStreamQuery {
    pub fn position(&self) -> usize {
        self.position.unwrap_or(0)
    }

    pub fn limit(&self) -> ReadLimit {
        ReadLimit::from_signed(self.limit.unwrap_or(-1))
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct FeedbackCreated {
    pub status: &'static str,
    pub data: Feedback,
    pub receipt: WriteReceipt,
}

#[derive(Debug, Serialize)]
pub struct StreamPage {
    pub stream: String,
    pub position: usize,
    pub events: Vec<Event>,
}

#[derive(Debug, Serialize)]
pub struct FeedbackSummary {
    pub stream: String,
    pub applied: u64,
    pub last: Option<Feedback>,
}
