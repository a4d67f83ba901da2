//! Test utilities for database integration tests
//!
//! [`TestDatabase::new`] gives a private in-memory SQLite database with all
//! migrations applied. The pool is pinned to a single connection because
//! each SQLite `:memory:` connection is its own database.
//!
//! [`TestDatabase::file_backed`] opens a real database file in a temporary
//! directory with a multi-connection pool, for tests that exercise
//! concurrent transactions.

use crate::DbConnection;
use rulehub_migrations::Migrator;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tempfile::TempDir;

pub struct TestDatabase {
    pub db: Arc<DbConnection>,
    // Holds the database file for file-backed instances
    _dir: Option<TempDir>,
}

impl TestDatabase {
    pub async fn new() -> anyhow::Result<Self> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;

        Ok(Self {
            db: Arc::new(db),
            _dir: None,
        })
    }

    pub async fn file_backed(max_connections: u32) -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("rulehub.db").display());

        let mut opt = ConnectOptions::new(url);
        opt.max_connections(max_connections)
            .min_connections(1)
            .sqlx_logging(false);

        let db = Database::connect(opt).await?;
        Migrator::up(&db, None).await?;

        Ok(Self {
            db: Arc::new(db),
            _dir: Some(dir),
        })
    }

    pub fn connection(&self) -> &DbConnection {
        self.db.as_ref()
    }

    pub fn connection_arc(&self) -> Arc<DbConnection> {
        self.db.clone()
    }
}
