use std::collections::HashMap;

use chrono::Utc;

use ledgerbus_core::{TransactionId, sub_stream_name};
use ledgerbus_events::{CommitStamp, Event, EventBuilder, ReadLimit, WriteReceipt};

/// Both ledger entries produced by one logical write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Committed {
    pub receipt: WriteReceipt,
    /// Copy appended to the general stream.
    pub general: Event,
    /// Copy appended to the `<stream>-<event_id>` sub-stream.
    pub entity: Event,
}

impl Committed {
    /// Target streams with their appended event, in write order.
    pub fn targets(&self) -> [(&str, &Event); 2] {
        [
            (self.receipt.stream.as_str(), &self.general),
            (self.receipt.sub_stream.as_str(), &self.entity),
        ]
    }
}

/// In-memory append-only ledger.
///
/// Streams are created lazily on first append. The local sequence of a stream
/// is the sequence id of its last event, so counter and segment cannot drift.
/// Not synchronized: the owning bus decides how access is serialized.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    streams: HashMap<String, Vec<Event>>,
    global_sequence: u64,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    fn current_version(stream: &[Event]) -> u64 {
        stream.last().map(Event::local_sequence_id).unwrap_or(0)
    }

    /// Append `event` to `stream` and to its sub-stream.
    ///
    /// One transaction id and one global sequence id are shared by both
    /// copies; each stream advances its own local sequence.
    pub fn commit(&mut self, stream: &str, event: &EventBuilder) -> Committed {
        let transaction_id = TransactionId::new();
        self.global_sequence += 1;
        let global_sequence_id = self.global_sequence;
        let sub_stream = sub_stream_name(stream, event.event_id());

        let general = self.append(stream, event, transaction_id, global_sequence_id);
        let entity = self.append(&sub_stream, event, transaction_id, global_sequence_id);

        Committed {
            receipt: WriteReceipt {
                transaction_id,
                global_sequence_id,
                stream: stream.to_string(),
                sub_stream,
            },
            general,
            entity,
        }
    }

    fn append(
        &mut self,
        stream: &str,
        event: &EventBuilder,
        transaction_id: TransactionId,
        global_sequence_id: u64,
    ) -> Event {
        let segment = self.streams.entry(stream.to_string()).or_default();

        let stored = event.finalize(CommitStamp {
            transaction_id,
            local_sequence_id: Self::current_version(segment) + 1,
            global_sequence_id,
            timestamp: Utc::now(),
        });
        segment.push(stored.clone());
        stored
    }

    /// Slice a stream; unknown streams and out-of-range positions are empty.
    pub fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> Vec<Event> {
        match self.streams.get(stream) {
            Some(segment) => segment[limit.window(segment.len(), position)].to_vec(),
            None => Vec::new(),
        }
    }

    pub fn stream_len(&self, stream: &str) -> usize {
        self.streams.get(stream).map(Vec::len).unwrap_or(0)
    }

    /// Last assigned local sequence id of `stream` (0 when empty).
    pub fn local_sequence(&self, stream: &str) -> u64 {
        self.streams
            .get(stream)
            .map(|segment| Self::current_version(segment))
            .unwrap_or(0)
    }

    /// Last assigned global sequence id (0 before the first write).
    pub fn global_sequence(&self) -> u64 {
        self.global_sequence
    }

    pub fn stream_names(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }
}
