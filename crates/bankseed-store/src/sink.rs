use async_trait::async_trait;

use bankseed_core::{
    AccountId, LoanId, NewAccount, NewLoan, NewTransaction, NewUser, TransactionId, UserId,
};

use crate::error::SinkResult;

/// Persistence boundary the generators write through.
///
/// Writes become durable only after [`Sink::commit`]. A unique violation on
/// one insert leaves earlier uncommitted inserts intact.
#[async_trait]
pub trait Sink: Send {
    /// Returns the engine identifier (e.g. `sqlite`).
    fn engine(&self) -> &'static str;

    /// Creates the tables when they do not exist yet.
    async fn ensure_schema(&mut self) -> SinkResult<()> {
        Ok(())
    }

    /// Inserts `admin` unless a user with the same email exists.
    ///
    /// Returns the new identity, or `None` when the admin was already present.
    async fn ensure_reserved_admin(&mut self, admin: &NewUser) -> SinkResult<Option<UserId>>;

    /// Fails with `UniqueViolation` on a duplicate email.
    async fn insert_user(&mut self, user: &NewUser) -> SinkResult<UserId>;

    /// Fails with `UniqueViolation` on a duplicate account number.
    async fn insert_account(&mut self, account: &NewAccount) -> SinkResult<AccountId>;

    async fn insert_transaction(&mut self, transaction: &NewTransaction)
    -> SinkResult<TransactionId>;

    async fn insert_loan(&mut self, loan: &NewLoan) -> SinkResult<LoanId>;

    /// Deletes the review flags employees attach to transactions. They
    /// reference both transactions and users, so they go before either.
    async fn delete_all_flags(&mut self) -> SinkResult<u64>;

    async fn delete_all_loans(&mut self) -> SinkResult<u64>;

    async fn delete_all_transactions(&mut self) -> SinkResult<u64>;

    async fn delete_all_accounts(&mut self) -> SinkResult<u64>;

    /// Deletes every user except the one holding the reserved admin email.
    async fn delete_all_users_except_reserved_admin(&mut self) -> SinkResult<u64>;

    async fn commit(&mut self) -> SinkResult<()>;

    /// Releases the underlying store. Uncommitted writes are discarded.
    async fn close(&mut self) -> SinkResult<()>;
}
