use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Sqlite, Transaction};
use tracing::{debug, warn};

use bankseed_core::{
    AccountId, LoanId, NewAccount, NewLoan, NewTransaction, NewUser, TransactionId, UserId,
};

use crate::error::{SinkError, SinkResult};
use crate::sink::Sink;

mod queries;
mod schema;

/// Sink backed by a single SQLite connection.
///
/// Writes accumulate in one open transaction until [`Sink::commit`].
pub struct SqliteSink {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
    closed: bool,
}

impl SqliteSink {
    /// Opens (creating when missing) the database file at `path`.
    pub async fn open(path: &Path) -> SinkResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect_with(options).await
    }

    /// Connects using a `sqlite:` URL such as `sqlite::memory:`.
    pub async fn connect(url: &str) -> SinkResult<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|err| SinkError::Connection(err.to_string()))?
            .create_if_missing(true)
            .foreign_keys(true);
        Self::connect_with(options).await
    }

    /// Fresh private in-memory database.
    pub async fn in_memory() -> SinkResult<Self> {
        Self::connect("sqlite::memory:").await
    }

    async fn connect_with(options: SqliteConnectOptions) -> SinkResult<Self> {
        // One connection for the whole run; an in-memory database lives only
        // as long as that connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|err| SinkError::Connection(err.to_string()))?;
        Ok(Self {
            pool,
            tx: None,
            closed: false,
        })
    }

    /// Pool used by the sink, for read-back queries in tests and tools.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn transaction(&mut self) -> SinkResult<&mut Transaction<'static, Sqlite>> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if self.tx.is_none() {
            let tx = self
                .pool
                .begin()
                .await
                .map_err(|err| SinkError::Connection(err.to_string()))?;
            self.tx = Some(tx);
        }
        self.tx.as_mut().ok_or(SinkError::Closed)
    }
}

#[async_trait]
impl Sink for SqliteSink {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    async fn ensure_schema(&mut self) -> SinkResult<()> {
        let tx = self.transaction().await?;
        schema::create_tables(&mut **tx).await?;
        self.commit().await
    }

    async fn ensure_reserved_admin(&mut self, admin: &NewUser) -> SinkResult<Option<UserId>> {
        let tx = self.transaction().await?;
        if queries::user_exists(&mut **tx, &admin.email).await? {
            return Ok(None);
        }
        let id = queries::insert_user(&mut **tx, admin).await?;
        self.commit().await?;
        Ok(Some(id))
    }

    async fn insert_user(&mut self, user: &NewUser) -> SinkResult<UserId> {
        let tx = self.transaction().await?;
        queries::insert_user(&mut **tx, user).await
    }

    async fn insert_account(&mut self, account: &NewAccount) -> SinkResult<AccountId> {
        let tx = self.transaction().await?;
        queries::insert_account(&mut **tx, account).await
    }

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> SinkResult<TransactionId> {
        let tx = self.transaction().await?;
        queries::insert_transaction(&mut **tx, transaction).await
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> SinkResult<LoanId> {
        let tx = self.transaction().await?;
        queries::insert_loan(&mut **tx, loan).await
    }

    async fn delete_all_flags(&mut self) -> SinkResult<u64> {
        let tx = self.transaction().await?;
        queries::delete_all(&mut **tx, "flagged_transactions").await
    }

    async fn delete_all_loans(&mut self) -> SinkResult<u64> {
        let tx = self.transaction().await?;
        queries::delete_all(&mut **tx, "loans").await
    }

    async fn delete_all_transactions(&mut self) -> SinkResult<u64> {
        let tx = self.transaction().await?;
        queries::delete_all(&mut **tx, "transactions").await
    }

    async fn delete_all_accounts(&mut self) -> SinkResult<u64> {
        let tx = self.transaction().await?;
        queries::delete_all(&mut **tx, "accounts").await
    }

    async fn delete_all_users_except_reserved_admin(&mut self) -> SinkResult<u64> {
        let tx = self.transaction().await?;
        queries::delete_users_except(&mut **tx, bankseed_core::RESERVED_ADMIN_EMAIL).await
    }

    async fn commit(&mut self) -> SinkResult<()> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        if let Some(tx) = self.tx.take() {
            tx.commit().await?;
            debug!(event = "sink_committed", engine = "sqlite");
        }
        Ok(())
    }

    async fn close(&mut self) -> SinkResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(tx) = self.tx.take() {
            warn!(event = "sink_rollback", "discarding uncommitted writes on close");
            tx.rollback().await?;
        }
        self.pool.close().await;
        debug!(event = "sink_closed", engine = "sqlite");
        Ok(())
    }
}
