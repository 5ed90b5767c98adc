//! SQLite ledger built on sea-orm.
//!
//! Entries live in the `expenses` table created by the `migration` crate.
//! The pool holds a single connection and every call goes through one mutex,
//! so inserts and aggregates never interleave.

use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ConnectOptions, Database, DatabaseConnection, QueryFilter, QueryOrder, QuerySelect,
    prelude::*, sea_query::Expr,
};
use tokio::sync::Mutex;

use crate::{Ledger, LedgerError, Record, ResultLedger, Summary, expenses};

#[derive(Debug)]
pub struct SqliteLedger {
    database: Mutex<Option<DatabaseConnection>>,
}

impl SqliteLedger {
    /// Return a builder for `SqliteLedger`, for callers that already hold a
    /// migrated connection.
    pub fn builder() -> SqliteLedgerBuilder {
        SqliteLedgerBuilder::default()
    }

    /// Opens (or creates) the database file at `path` and applies the schema.
    pub async fn open(path: impl AsRef<Path>) -> ResultLedger<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(LedgerError::MissingPath);
        }
        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        Self::connect(&format!("sqlite:{}?mode=rwc", path.display())).await
    }

    /// Connects to `url` (e.g. `sqlite::memory:`) and applies the schema.
    pub async fn connect(url: &str) -> ResultLedger<Self> {
        let mut options = ConnectOptions::new(url);
        options
            .max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let database = Database::connect(options).await?;
        Migrator::up(&database, None).await?;
        tracing::info!("sqlite ledger ready");

        Ok(Self::builder().database(database).build())
    }

    /// Appends `record` with an explicit insertion time.
    pub async fn insert_at(&self, record: &Record, created_at: DateTime<Utc>) -> ResultLedger<()> {
        record.validate()?;

        let guard = self.database.lock().await;
        let database = guard.as_ref().ok_or(LedgerError::Closed)?;
        expenses::Entity::insert(expenses::ActiveModel::new(record, created_at))
            .exec(database)
            .await?;
        Ok(())
    }

    /// Every stored record, oldest first.
    pub async fn records(&self) -> ResultLedger<Vec<Record>> {
        let guard = self.database.lock().await;
        let database = guard.as_ref().ok_or(LedgerError::Closed)?;
        let models = expenses::Entity::find()
            .order_by_asc(expenses::Column::Id)
            .all(database)
            .await?;
        Ok(models.into_iter().map(Record::from).collect())
    }
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn insert(&self, record: &Record) -> ResultLedger<()> {
        self.insert_at(record, Utc::now()).await
    }

    async fn aggregate(&self, since: DateTime<Utc>) -> ResultLedger<Summary> {
        let guard = self.database.lock().await;
        let database = guard.as_ref().ok_or(LedgerError::Closed)?;

        // Empty categories are grouped like any other value and end up in the
        // `Summary::UNCATEGORIZED` bucket.
        let rows: Vec<(String, i64, Option<f64>)> = expenses::Entity::find()
            .select_only()
            .column(expenses::Column::Category)
            .column_as(Expr::col(expenses::Column::Id).count(), "count")
            .column_as(Expr::col(expenses::Column::Amount).sum(), "total")
            .filter(expenses::Column::CreatedAt.gte(since))
            .group_by(expenses::Column::Category)
            .into_tuple()
            .all(database)
            .await?;

        let mut summary = Summary::default();
        for (category, count, total) in rows {
            summary.add(&category, count.max(0) as u64, total.unwrap_or(0.0));
        }
        Ok(summary)
    }

    async fn close(&self) -> ResultLedger<()> {
        let database = self.database.lock().await.take();
        if let Some(database) = database {
            tracing::info!("closing sqlite ledger");
            database.close().await?;
        }
        Ok(())
    }
}

/// The builder for `SqliteLedger`
#[derive(Default)]
pub struct SqliteLedgerBuilder {
    database: DatabaseConnection,
}

impl SqliteLedgerBuilder {
    /// Pass the required database. The schema must already be applied.
    pub fn database(mut self, db: DatabaseConnection) -> SqliteLedgerBuilder {
        self.database = db;
        self
    }

    /// Construct `SqliteLedger`
    pub fn build(self) -> SqliteLedger {
        SqliteLedger {
            database: Mutex::new(Some(self.database)),
        }
    }
}
