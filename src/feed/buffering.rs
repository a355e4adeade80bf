//! Bounded batch accumulation in front of a [`DocIdPusher`]
//!
//! Records are buffered until the configured maximum is reached, then pushed
//! as one batch before `add` returns. The buffer is cleared only after the
//! pusher confirms the batch, so a failed or interrupted push leaves every
//! record in place.
//!
//! The owner must end the buffer's life explicitly: [`BufferingPusher::finish`]
//! pushes the final partial batch, [`BufferingPusher::abandon`] discards it on
//! an error path. Dropping a buffer that still holds records logs a warning.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{DocIdPusher, PushError, Record};

/// Cooperative cancellation signal shared with the caller
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

pub struct BufferingPusher<'p, P: DocIdPusher> {
    wrapped: &'p P,
    saved: Vec<Record>,
    max_batch: usize,
    cancellation_token: Option<CancellationToken>,
    batches_pushed: usize,
}

impl<'p, P: DocIdPusher> BufferingPusher<'p, P> {
    /// Buffer in front of `wrapped`; `max_batch` is clamped to at least 1
    pub fn new(wrapped: &'p P, max_batch: usize) -> Self {
        let max_batch = max_batch.max(1);
        Self {
            wrapped,
            saved: Vec::with_capacity(max_batch),
            max_batch,
            cancellation_token: None,
            batches_pushed: 0,
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, token: Option<CancellationToken>) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Append a record, pushing the batch once it is full
    pub async fn add(&mut self, record: Record) -> Result<(), PushError> {
        self.saved.push(record);
        if self.saved.len() >= self.max_batch {
            self.flush().await?;
        }
        Ok(())
    }

    /// Push whatever is buffered (possibly nothing) as one batch
    pub async fn flush(&mut self) -> Result<(), PushError> {
        if self
            .cancellation_token
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return Err(PushError::Interrupted);
        }

        self.wrapped.push_records(&self.saved).await?;
        log::debug!("sent {} doc ids to pusher", self.saved.len());
        self.batches_pushed += 1;
        self.saved.clear();
        Ok(())
    }

    /// Terminal flush; consumes the buffer
    pub async fn finish(mut self) -> Result<usize, PushError> {
        self.flush().await?;
        Ok(self.batches_pushed)
    }

    /// Discard the buffered records on an error path; returns how many
    pub fn abandon(mut self) -> usize {
        let dropped = self.saved.len();
        if dropped > 0 {
            log::warn!("discarding {dropped} buffered doc ids that were never sent");
        }
        self.saved.clear();
        dropped
    }

    #[must_use]
    pub fn pending(&self) -> usize {
        self.saved.len()
    }

    #[must_use]
    pub fn batches_pushed(&self) -> usize {
        self.batches_pushed
    }
}

impl<P: DocIdPusher> Drop for BufferingPusher<'_, P> {
    fn drop(&mut self) {
        if !self.saved.is_empty() {
            tracing::warn!(
                pending = self.saved.len(),
                "still have {} saved ids that weren't sent",
                self.saved.len()
            );
        }
    }
}
