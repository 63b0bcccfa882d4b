//! Stream addressing.
//!
//! Streams are plain string partition keys. Every write lands on the named
//! stream and on a derived sub-stream `<stream>-<event_id>` holding that single
//! entity's history. Names are never validated or namespaced: a caller-chosen
//! stream literally named `Orders-e1` shares a partition with the sub-stream of
//! event `e1` written to `Orders`.

/// Separator between a stream name and an event id in a sub-stream name.
pub const SUB_STREAM_SEPARATOR: char = '-';

/// Derive the sub-stream name for `event_id` written to `stream`.
///
/// An empty `event_id` is passed through and yields a name ending in `-`.
pub fn sub_stream_name(stream: &str, event_id: &str) -> String {
    let mut name = String::with_capacity(stream.len() + 1 + event_id.len());
    name.push_str(stream);
    name.push(SUB_STREAM_SEPARATOR);
    name.push_str(event_id);
    name
}
