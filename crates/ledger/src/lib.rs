//! Append-only expense ledger.
//!
//! A [`Ledger`] stores [`Record`]s with their insertion time and answers
//! windowed aggregates ([`Summary`]). Two stores are provided:
//!
//! - [`MemoryLedger`], entries kept in process memory;
//! - [`SqliteLedger`], entries kept in the `expenses` table of a SQLite file.
//!
//! Both run every insert and every aggregate inside one critical section, so
//! an aggregate always sees a consistent snapshot.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use error::LedgerError;
pub use memory::MemoryLedger;
pub use record::Record;
pub use sqlite::{SqliteLedger, SqliteLedgerBuilder};
pub use summary::Summary;

mod error;
mod expenses;
mod memory;
mod record;
mod sqlite;
mod summary;

type ResultLedger<T> = Result<T, LedgerError>;

/// Storage capability used by the bot.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Validates and appends `record`, stamping it with the current UTC time.
    async fn insert(&self, record: &Record) -> Result<(), LedgerError>;

    /// Aggregates every entry with `created_at >= since`.
    async fn aggregate(&self, since: DateTime<Utc>) -> Result<Summary, LedgerError>;

    /// Releases the underlying resources. Calling it again is a no-op.
    async fn close(&self) -> Result<(), LedgerError>;
}
