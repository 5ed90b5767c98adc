//! Expense records.
//!
//! A [`Record`] is produced by the classifier from free text and becomes
//! durable once a [`Ledger`](crate::Ledger) accepts it. Records are never
//! updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LedgerError, ResultLedger};

/// A categorized expense.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub category: String,
    pub amount: f64,
    pub description: String,
}

impl Record {
    pub fn new(
        category: impl Into<String>,
        amount: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            amount,
            description: description.into(),
        }
    }

    /// Checks the record can be persisted. A blank description is rejected,
    /// an empty category is allowed.
    pub fn validate(&self) -> ResultLedger<()> {
        if self.description.trim().is_empty() {
            return Err(LedgerError::EmptyDescription);
        }
        Ok(())
    }
}

/// A stored record together with its insertion time.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Entry {
    pub record: Record,
    pub created_at: DateTime<Utc>,
}
