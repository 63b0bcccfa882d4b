use serde::{Deserialize, Serialize};

/// Optional identifiers attached to an event.
///
/// The trace id lets a request be followed across components; the origin
/// stream name records where a derived event came from. Both are plain values:
/// once attached to an appended [`Event`](crate::Event) they are only readable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(rename = "originStreamName", default, skip_serializing_if = "Option::is_none")]
    origin_stream_name: Option<String>,
    #[serde(rename = "traceID", default, skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
}

/// Create empty event metadata.
pub fn new_event_metadata() -> EventMetadata {
    EventMetadata::default()
}

impl EventMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_origin_stream_name(mut self, name: impl Into<String>) -> Self {
        self.origin_stream_name = Some(name.into());
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn origin_stream_name(&self) -> Option<&str> {
        self.origin_stream_name.as_deref()
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// Keep the caller's trace id, or fall back to `trace_id`.
    pub(crate) fn or_trace_id(mut self, trace_id: String) -> Self {
        if self.trace_id.is_none() {
            self.trace_id = Some(trace_id);
        }
        self
    }
}
