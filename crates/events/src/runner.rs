//! Projection runner utilities (read model builders).
//!
//! Read models are **disposable**; the ledger is the source of truth.
//! The runner owns the consumer-side cursor into one stream and advances it by
//! repeatedly calling `read` with a bounded limit.

use thiserror::Error;

use ledgerbus_core::BusError;

use crate::{Event, Projection, ReadLimit, StreamReader};

/// Tracks projection progress over a single stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionCursor {
    stream: String,
    position: usize,
    last_local_sequence_id: u64,
}

impl ProjectionCursor {
    fn new(stream: String) -> Self {
        Self {
            stream,
            position: 0,
            last_local_sequence_id: 0,
        }
    }

    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Offset of the next event to read.
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn last_local_sequence_id(&self) -> u64 {
        self.last_local_sequence_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProjectionError {
    #[error("local sequence did not advance (last {last}, found {found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error(transparent)]
    Read(#[from] BusError),
}

/// Runs a stream's events through a projection and tracks progress.
#[derive(Debug)]
pub struct ProjectionRunner<P>
where
    P: Projection,
{
    projection: P,
    cursor: ProjectionCursor,
}

impl<P> ProjectionRunner<P>
where
    P: Projection,
{
    pub fn new(stream: impl Into<String>, projection: P) -> Self {
        Self {
            projection,
            cursor: ProjectionCursor::new(stream.into()),
        }
    }

    pub fn projection(&self) -> &P {
        &self.projection
    }

    pub fn projection_mut(&mut self) -> &mut P {
        &mut self.projection
    }

    pub fn into_projection(self) -> P {
        self.projection
    }

    pub fn cursor(&self) -> &ProjectionCursor {
        &self.cursor
    }

    /// Apply a single event, enforcing monotonic local sequencing.
    pub fn apply(&mut self, event: &Event) -> Result<(), ProjectionError> {
        let found = event.local_sequence_id();
        let last = self.cursor.last_local_sequence_id;

        if found <= last {
            return Err(ProjectionError::NonMonotonicSequence { last, found });
        }

        self.projection.apply(event);
        self.cursor.last_local_sequence_id = found;
        self.cursor.position += 1;
        Ok(())
    }

    /// Read and apply everything appended since the cursor, `batch_size`
    /// events per read. Returns the number of events applied.
    pub fn catch_up<R>(&mut self, reader: &R, batch_size: usize) -> Result<usize, ProjectionError>
    where
        R: StreamReader + ?Sized,
    {
        let batch_size = batch_size.max(1);
        let mut applied = 0;

        loop {
            let batch = reader.read(
                &self.cursor.stream,
                self.cursor.position,
                ReadLimit::Count(batch_size),
            )?;
            if batch.is_empty() {
                return Ok(applied);
            }

            for event in &batch {
                self.apply(event)?;
                applied += 1;
            }

            if batch.len() < batch_size {
                return Ok(applied);
            }
        }
    }

    /// Rebuild a projection from scratch by replaying its full stream.
    ///
    /// The factory is used to create a fresh projection instance.
    pub fn rebuild_from_scratch<R>(
        stream: impl Into<String>,
        factory: impl FnOnce() -> P,
        reader: &R,
    ) -> Result<Self, ProjectionError>
    where
        R: StreamReader + ?Sized,
    {
        let mut runner = ProjectionRunner::new(stream, factory());
        let events = reader.read(runner.cursor.stream(), 0, ReadLimit::All)?;
        for event in &events {
            runner.apply(event)?;
        }
        Ok(runner)
    }
}
