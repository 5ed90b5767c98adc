//! In-memory ledger, used when no database path is configured and in tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::{Ledger, LedgerError, Record, ResultLedger, Summary, record::Entry};

#[derive(Debug, Default)]
struct State {
    entries: Vec<Entry>,
    closed: bool,
}

/// Keeps entries in a vector guarded by a single mutex. Nothing survives a
/// restart.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    state: Mutex<State>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `record` as if it had been inserted at `created_at`.
    pub async fn insert_at(&self, record: &Record, created_at: DateTime<Utc>) -> ResultLedger<()> {
        record.validate()?;

        let mut state = self.state.lock().await;
        if state.closed {
            return Err(LedgerError::Closed);
        }
        state.entries.push(Entry {
            record: record.clone(),
            created_at,
        });
        Ok(())
    }

    /// Snapshot of the stored records, oldest first.
    pub async fn records(&self) -> Vec<Record> {
        let state = self.state.lock().await;
        state.entries.iter().map(|e| e.record.clone()).collect()
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn insert(&self, record: &Record) -> ResultLedger<()> {
        self.insert_at(record, Utc::now()).await
    }

    async fn aggregate(&self, since: DateTime<Utc>) -> ResultLedger<Summary> {
        let state = self.state.lock().await;
        if state.closed {
            return Err(LedgerError::Closed);
        }

        let mut summary = Summary::default();
        for entry in state.entries.iter().filter(|e| e.created_at >= since) {
            summary.add(&entry.record.category, 1, entry.record.amount);
        }
        Ok(summary)
    }

    async fn close(&self) -> ResultLedger<()> {
        let mut state = self.state.lock().await;
        if !state.closed {
            tracing::debug!("closing in-memory ledger with {} entries", state.entries.len());
            state.closed = true;
        }
        Ok(())
    }
}
