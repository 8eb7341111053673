//! In-memory test doubles.

use crate::error::SendResult;
use crate::sender::{Record, Sender};

/// A [`Sender`] that keeps everything in memory.
///
/// Useful for tests and debugging: records stay inspectable after a flush
/// instead of leaving the process.
#[derive(Debug, Default)]
pub struct InMemorySender {
    queue: Vec<Record>,
    delivered: Vec<Record>,
    flush_count: usize,
}

impl InMemorySender {
    /// Create an empty in-memory sender.
    pub fn new() -> Self {
        InMemorySender::default()
    }

    /// Records flushed so far, in delivery order.
    pub fn delivered(&self) -> &[Record] {
        &self.delivered
    }

    /// Records buffered but not yet flushed, in delivery order.
    pub fn queue(&self) -> &[Record] {
        &self.queue
    }

    /// All records seen so far: delivered first, then the live queue.
    pub fn records(&self) -> Vec<&Record> {
        self.delivered.iter().chain(self.queue.iter()).collect()
    }

    /// Number of times `flush` has run.
    pub fn flush_count(&self) -> usize {
        self.flush_count
    }

    /// Count the transaction records seen so far.
    pub fn transaction_count(&self) -> usize {
        self.records()
            .into_iter()
            .filter(|r| matches!(r, Record::Transaction(_)))
            .count()
    }

    /// Count the span records seen so far.
    pub fn span_count(&self) -> usize {
        self.records()
            .into_iter()
            .filter(|r| matches!(r, Record::Span(_)))
            .count()
    }

    /// Count the error records seen so far.
    pub fn error_count(&self) -> usize {
        self.records()
            .into_iter()
            .filter(|r| matches!(r, Record::Error(_)))
            .count()
    }

    /// Forget everything seen so far.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.delivered.clear();
        self.flush_count = 0;
    }
}

impl Sender for InMemorySender {
    fn enqueue(&mut self, record: Record) {
        self.queue.push(record);
    }

    fn queued(&self) -> usize {
        self.queue.len()
    }

    fn flush(&mut self) -> SendResult {
        self.flush_count += 1;
        self.delivered.append(&mut self.queue);
        Ok(())
    }
}
