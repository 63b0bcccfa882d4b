use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use ledgerbus_core::{BusResult, TransactionId};

use crate::metadata::EventMetadata;

/// A ledger record.
///
/// Events are:
/// - **immutable** once appended (treat them as facts)
/// - **versioned** by the caller (schema evolution)
/// - **append-only** (never mutated or deleted)
///
/// The bus assigns `transaction_id`, both sequence ids and `timestamp` inside
/// `write`; everything else is copied from the producer's [`EventBuilder`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "eventID")]
    event_id: String,
    #[serde(rename = "transactionID")]
    transaction_id: TransactionId,

    /// 1-based position within this event's stream.
    #[serde(rename = "sequenceID")]
    local_sequence_id: u64,
    /// 1-based position among all writes to the bus.
    #[serde(rename = "globalSequenceID")]
    global_sequence_id: u64,
    timestamp: DateTime<Utc>,

    #[serde(rename = "type")]
    event_type: String,
    metadata: EventMetadata,
    body: String,
    version: u32,
}

impl Event {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.transaction_id
    }

    pub fn local_sequence_id(&self) -> u64 {
        self.local_sequence_id
    }

    pub fn global_sequence_id(&self) -> u64 {
        self.global_sequence_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Whether the type marks an intent-bearing event.
    ///
    /// Matches when any `:`-separated segment of the type starts with
    /// `command` (`command:create`, `example:command`, `Orders:command-42`).
    pub fn is_command(&self) -> bool {
        self.event_type
            .split(':')
            .any(|segment| segment.starts_with("command"))
    }

    /// Decode the body as JSON.
    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

/// Bus-assigned fields attached to an event when it is appended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommitStamp {
    pub transaction_id: TransactionId,
    pub local_sequence_id: u64,
    pub global_sequence_id: u64,
    pub timestamp: DateTime<Utc>,
}

/// Producer-side event under construction.
///
/// Only client-settable fields live here. Setters consume and return the
/// builder so construction chains:
///
/// ```
/// use ledgerbus_events::{new_event, new_event_metadata};
///
/// let event = new_event()
///     .with_event_id("e1")
///     .with_type("example:command")
///     .with_body(r#"{"hello":"World"}"#)
///     .with_metadata(new_event_metadata().with_trace_id("t-1"));
/// assert_eq!(event.event_id(), "e1");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBuilder {
    event_id: String,
    event_type: String,
    body: String,
    version: u32,
    metadata: Option<EventMetadata>,
}

/// Create an empty event builder.
pub fn new_event() -> EventBuilder {
    EventBuilder::default()
}

impl EventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event_id(mut self, event_id: impl Into<String>) -> Self {
        self.event_id = event_id.into();
        self
    }

    pub fn with_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize `value` as JSON into the body.
    pub fn with_json_body<T: Serialize + ?Sized>(self, value: &T) -> BusResult<Self> {
        let body = serde_json::to_string(value)?;
        Ok(self.with_body(body))
    }

    pub fn with_version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn with_metadata(mut self, metadata: EventMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn metadata(&self) -> Option<&EventMetadata> {
        self.metadata.as_ref()
    }

    /// Produce the appended record for one target stream.
    ///
    /// Bus implementations call this once per target of a write. Missing
    /// metadata (or a missing trace id) is filled with the transaction id so
    /// every appended event carries a correlation id.
    pub fn finalize(&self, stamp: CommitStamp) -> Event {
        let metadata = self
            .metadata
            .clone()
            .unwrap_or_default()
            .or_trace_id(stamp.transaction_id.to_string());

        Event {
            event_id: self.event_id.clone(),
            transaction_id: stamp.transaction_id,
            local_sequence_id: stamp.local_sequence_id,
            global_sequence_id: stamp.global_sequence_id,
            timestamp: stamp.timestamp,
            event_type: self.event_type.clone(),
            metadata,
            body: self.body.clone(),
            version: self.version,
        }
    }
}
