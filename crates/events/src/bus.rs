//! Producer-facing bus contracts (mechanics only).
//!
//! The bus owns an append-only ledger partitioned by stream name and a registry
//! of subscribers per stream name.
//!
//! ## Write semantics
//!
//! One `write(stream, event)` call:
//! 1. generates one transaction id,
//! 2. increments the bus-wide global sequence once,
//! 3. appends a finalized copy to `stream` and then to `<stream>-<event_id>`,
//!    each with its own local sequence id but the shared transaction id and
//!    global sequence id,
//! 4. notifies the subscribers registered on each of those exact names.
//!
//! ## Read semantics
//!
//! `read(stream, position, limit)` slices one stream's ledger segment. Unknown
//! streams and out-of-range positions yield an empty result, never an error.
//! Reads never notify subscribers.
//!
//! Projections are built by calling `read` repeatedly with an advancing
//! position; the bus does not track consumer cursors.

use std::ops::Range;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use ledgerbus_core::{BusResult, TransactionId};

use crate::{Event, EventBuilder, EventMetadata, SubscriberRef};

/// How many events a read returns.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ReadLimit {
    /// Every event from the position to the end of the stream.
    All,
    /// At most this many events.
    Count(usize),
}

impl ReadLimit {
    /// Map a signed limit where `-1` means "all remaining".
    ///
    /// Other negative values select nothing.
    pub fn from_signed(limit: i64) -> Self {
        match limit {
            -1 => ReadLimit::All,
            n if n < 0 => ReadLimit::Count(0),
            n => ReadLimit::Count(usize::try_from(n).unwrap_or(usize::MAX)),
        }
    }

    /// Index range selected in a stream of `len` events starting at `position`.
    ///
    /// Positions at or beyond the end select an empty range.
    pub fn window(self, len: usize, position: usize) -> Range<usize> {
        if position >= len {
            return len..len;
        }

        let end = match self {
            ReadLimit::All => len,
            ReadLimit::Count(n) => position.saturating_add(n).min(len),
        };

        position..end
    }
}

impl From<usize> for ReadLimit {
    fn from(value: usize) -> Self {
        ReadLimit::Count(value)
    }
}

/// Outcome of one logical write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteReceipt {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,
    #[serde(rename = "globalSequenceID")]
    pub global_sequence_id: u64,
    /// General stream written first.
    pub stream: String,
    /// Derived `<stream>-<event_id>` stream written second.
    pub sub_stream: String,
}

/// Read access to a ledger.
///
/// Implemented by both bus variants so projections can run over either.
pub trait StreamReader {
    fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>>;
}

impl<R> StreamReader for &R
where
    R: StreamReader + ?Sized,
{
    fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>> {
        (**self).read(stream, position, limit)
    }
}

impl<R> StreamReader for Arc<R>
where
    R: StreamReader + ?Sized,
{
    fn read(&self, stream: &str, position: usize, limit: ReadLimit) -> BusResult<Vec<Event>> {
        (**self).read(stream, position, limit)
    }
}

/// Synchronous event bus.
///
/// Mutating operations take `&mut self`: delivery happens inline on the
/// caller's thread and the bus is not shareable across concurrent callers
/// without an external lock.
pub trait EventBus: StreamReader {
    /// Register `subscriber` on the exact stream name `stream` and run its
    /// `start` hook.
    ///
    /// Registering the same subscriber twice yields duplicate notifications.
    fn subscribe(&mut self, stream: &str, subscriber: SubscriberRef) -> BusResult<()>;

    /// Append `event` to `stream` and its sub-stream, then notify subscribers.
    fn write(&mut self, stream: &str, event: EventBuilder) -> BusResult<WriteReceipt>;

    fn new_event(&self) -> EventBuilder {
        EventBuilder::new()
    }

    fn new_event_metadata(&self) -> EventMetadata {
        EventMetadata::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn signed_limit_sentinel_means_all() {
        assert_eq!(ReadLimit::from_signed(-1), ReadLimit::All);
        assert_eq!(ReadLimit::from_signed(0), ReadLimit::Count(0));
        assert_eq!(ReadLimit::from_signed(5), ReadLimit::Count(5));
        assert_eq!(ReadLimit::from_signed(-7), ReadLimit::Count(0));
    }

    #[test]
    fn window_cases() {
        // all remaining
        assert_eq!(ReadLimit::All.window(3, 0), 0..3);
        assert_eq!(ReadLimit::All.window(3, 2), 2..3);
        assert!(ReadLimit::All.window(3, 3).is_empty());
        // bounded
        assert_eq!(ReadLimit::Count(2).window(3, 0), 0..2);
        assert_eq!(ReadLimit::Count(5).window(3, 1), 1..3);
        assert!(ReadLimit::Count(1).window(2, 3).is_empty());
        // empty stream
        assert!(ReadLimit::Count(5).window(0, 0).is_empty());
    }

    proptest! {
        /// Property: a window never escapes the stream and never exceeds the limit.
        #[test]
        fn window_stays_in_bounds(len in 0usize..64, position in 0usize..80, n in 0usize..80) {
            let range = ReadLimit::Count(n).window(len, position);
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end <= len);
            prop_assert!(range.len() <= n);
            if position < len {
                prop_assert_eq!(range.start, position);
                prop_assert_eq!(range.len(), n.min(len - position));
            } else {
                prop_assert!(range.is_empty());
            }
        }
    }
}
