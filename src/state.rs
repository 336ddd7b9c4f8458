use std::ops::Deref;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use sea_orm::{
    DatabaseConnection, DatabaseTransaction, DbErr, SqlxSqliteConnector, TransactionTrait,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::Config;
use crate::repositories::ProjectRepository;

/// How long a connection waits on a locked database file before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

/// Application state shared across all handlers.
///
/// Owns the store handle. Built once by [`AppState::new`] and released with
/// [`AppState::close`]; handlers receive clones, which share the same pool.
#[derive(Clone)]
pub struct AppState {
    /// SeaORM database connection (pool)
    pub db: DatabaseConnection,
    pub config: Config,
    /// Held for the lifetime of every write transaction
    write_lock: Arc<Mutex<()>>,
}

/// A transaction that may write. At most one is open per [`AppState`] at a time.
///
/// SQLite transactions start deferred and cannot upgrade to a write lock while
/// another connection holds one, so writers queue here instead.
pub struct WriteTransaction {
    txn: DatabaseTransaction,
    _guard: OwnedMutexGuard<()>,
}

impl WriteTransaction {
    pub async fn commit(self) -> Result<(), DbErr> {
        self.txn.commit().await
    }
}

impl Deref for WriteTransaction {
    type Target = DatabaseTransaction;

    fn deref(&self) -> &Self::Target {
        &self.txn
    }
}

impl AppState {
    /// Connect to the store, apply migrations and seed the Inbox project
    pub async fn new(config: Config) -> Result<Self, AppStateError> {
        let mut connect_options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(|e| AppStateError::Database(e.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(BUSY_TIMEOUT);

        let pool_options = if config.is_in_memory() {
            // Every new connection would open a fresh, empty database
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(Option::<Duration>::None)
                .max_lifetime(Option::<Duration>::None)
        } else {
            // Readers never block the single writer
            connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
            SqlitePoolOptions::new().max_connections(config.database_max_connections)
        };

        let pool = pool_options
            .connect_with(connect_options)
            .await
            .map_err(|e| AppStateError::Database(e.to_string()))?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppStateError::Migration(e.to_string()))?;

        let db = SqlxSqliteConnector::from_sqlx_sqlite_pool(pool);

        let inbox = ProjectRepository::ensure_inbox(&db)
            .await
            .map_err(|e| AppStateError::Seed(e.to_string()))?;
        tracing::debug!(inbox_id = inbox.id, "Inbox project ready");

        Ok(Self {
            db,
            config,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Wait for any other writer to finish, then begin a transaction
    pub async fn begin_write(&self) -> Result<WriteTransaction, DbErr> {
        let guard = self.write_lock.clone().lock_owned().await;
        let txn = self.db.begin().await?;

        Ok(WriteTransaction { txn, _guard: guard })
    }

    /// Close every pooled connection
    pub async fn close(self) -> Result<(), AppStateError> {
        self.db
            .close()
            .await
            .map_err(|e| AppStateError::Database(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Database connection error: {0}")]
    Database(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Seed error: {0}")]
    Seed(String),
}
