//! Per-run record buffer
//!
//! Collects records in the order their extraction completed. Shared between
//! detail units as `Arc<RunAccumulator>`; append and snapshot take the same
//! lock so a snapshot never observes a half-finished append.

use tokio::sync::Mutex;

use super::record::Record;

#[derive(Debug, Default)]
pub struct RunAccumulator {
    records: Mutex<Vec<Record>>,
}

impl RunAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. No de-duplication is performed.
    pub async fn append(&self, record: Record) {
        self.records.lock().await.push(record);
    }

    /// Consistent copy of everything appended so far, in completion order
    pub async fn snapshot(&self) -> Vec<Record> {
        self.records.lock().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}
