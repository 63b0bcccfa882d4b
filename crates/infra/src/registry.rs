use std::collections::HashMap;

/// Subscribers grouped by the exact stream name they registered on.
///
/// Registration order is delivery order. Duplicates are kept.
#[derive(Debug)]
pub struct SubscriberRegistry<T> {
    by_stream: HashMap<String, Vec<T>>,
}

impl<T> Default for SubscriberRegistry<T> {
    fn default() -> Self {
        Self {
            by_stream: HashMap::new(),
        }
    }
}

impl<T> SubscriberRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, stream: &str, entry: T) {
        self.by_stream
            .entry(stream.to_string())
            .or_default()
            .push(entry);
    }

    /// Entries registered on `stream`, in registration order.
    pub fn get(&self, stream: &str) -> &[T] {
        self.by_stream
            .get(stream)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn count(&self, stream: &str) -> usize {
        self.get(stream).len()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (String, Vec<T>)> + '_ {
        self.by_stream.drain()
    }
}
