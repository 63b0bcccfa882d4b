use crate::Event;

/// A projection builds a read model from one stream of the ledger.
///
/// Projections are **disposable**: the ledger is the source of truth, and a
/// projection can be dropped and rebuilt by replaying its stream from position
/// zero. The bus does not track projection progress; a
/// [`ProjectionRunner`](crate::ProjectionRunner) keeps the cursor on the
/// consumer side.
///
/// ## Idempotency
///
/// Applying the same event twice should produce the same read model. The
/// runner rejects events whose local sequence id does not advance, but a
/// projection fed by hand (or by a subscriber) still sees every delivery.
pub trait Projection {
    /// Apply a single event to the read model.
    ///
    /// Events that are not relevant to this projection should be ignored.
    fn apply(&mut self, event: &Event);
}

impl<P> Projection for &mut P
where
    P: Projection + ?Sized,
{
    fn apply(&mut self, event: &Event) {
        (**self).apply(event)
    }
}
