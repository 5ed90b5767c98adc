//! The module contains the errors a ledger can return.
//!
//! - [`EmptyDescription`] when a record without description is inserted.
//! - [`Closed`] when the ledger is used after [`Ledger::close`].
//! - [`Storage`] for I/O failures around the database file.
//! - [`Database`] for any failure of the SQLite store.
//!
//!  [`EmptyDescription`]: LedgerError::EmptyDescription
//!  [`Closed`]: LedgerError::Closed
//!  [`Storage`]: LedgerError::Storage
//!  [`Database`]: LedgerError::Database
//!  [`Ledger::close`]: crate::Ledger::close
use sea_orm::DbErr;
use thiserror::Error;

/// Ledger custom errors.
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("expense description cannot be empty")]
    EmptyDescription,
    #[error("ledger is closed")]
    Closed,
    #[error("database path is required")]
    MissingPath,
    #[error(transparent)]
    Storage(#[from] std::io::Error),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for LedgerError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::EmptyDescription, Self::EmptyDescription) => true,
            (Self::Closed, Self::Closed) => true,
            (Self::MissingPath, Self::MissingPath) => true,
            (Self::Storage(a), Self::Storage(b)) => a.kind() == b.kind(),
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
