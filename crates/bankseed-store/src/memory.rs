use async_trait::async_trait;

use bankseed_core::{
    AccountId, LoanId, NewAccount, NewLoan, NewTransaction, NewUser, RESERVED_ADMIN_EMAIL,
    TransactionId, UserId,
};

use crate::error::{SinkError, SinkResult};
use crate::sink::Sink;

/// Rows held by a [`MemorySink`], keyed by their assigned identity.
#[derive(Debug, Clone, Default)]
pub struct MemoryTables {
    pub users: Vec<(UserId, NewUser)>,
    pub accounts: Vec<(AccountId, NewAccount)>,
    pub transactions: Vec<(TransactionId, NewTransaction)>,
    pub loans: Vec<(LoanId, NewLoan)>,
    next_user: i64,
    next_account: i64,
    next_transaction: i64,
    next_loan: i64,
}

impl MemoryTables {
    pub fn user_ids(&self) -> Vec<UserId> {
        self.users.iter().map(|(id, _)| *id).collect()
    }

    pub fn account_ids(&self) -> Vec<AccountId> {
        self.accounts.iter().map(|(id, _)| *id).collect()
    }

    fn next_id(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// In-process sink with the same uniqueness and commit rules as the SQLite one.
///
/// `current` is what later writes in the same batch observe; `committed` is
/// what survives a failure or a close without commit.
#[derive(Debug, Default)]
pub struct MemorySink {
    current: MemoryTables,
    committed: MemoryTables,
    insert_calls: u64,
    commits: u64,
    fail_after: Option<u64>,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every insert after the first `inserts` fail as a lost connection.
    pub fn fail_after(mut self, inserts: u64) -> Self {
        self.fail_after = Some(inserts);
        self
    }

    /// Rows visible to the open batch, committed or not.
    pub fn current(&self) -> &MemoryTables {
        &self.current
    }

    /// Rows made durable by the last commit.
    pub fn committed(&self) -> &MemoryTables {
        &self.committed
    }

    /// Number of insert attempts, including rejected ones.
    pub fn insert_calls(&self) -> u64 {
        self.insert_calls
    }

    /// Number of commits that flushed at least one pending write.
    pub fn commits(&self) -> u64 {
        self.commits
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn begin_write(&mut self) -> SinkResult<()> {
        if self.closed {
            return Err(SinkError::Closed);
        }
        Ok(())
    }

    fn begin_insert(&mut self) -> SinkResult<()> {
        self.begin_write()?;
        if let Some(limit) = self.fail_after
            && self.insert_calls >= limit
        {
            return Err(SinkError::Connection(format!(
                "memory sink configured to fail after {limit} inserts"
            )));
        }
        self.insert_calls += 1;
        Ok(())
    }

    fn check_user(&self, table: &'static str, id: UserId) -> SinkResult<()> {
        if self.current.users.iter().any(|(user, _)| *user == id) {
            return Ok(());
        }
        Err(SinkError::ForeignKeyViolation {
            table,
            detail: format!("unknown user {id}"),
        })
    }

    fn check_account(&self, id: Option<AccountId>) -> SinkResult<()> {
        match id {
            Some(id) if !self.current.accounts.iter().any(|(account, _)| *account == id) => {
                Err(SinkError::ForeignKeyViolation {
                    table: "transactions",
                    detail: format!("unknown account {id}"),
                })
            }
            _ => Ok(()),
        }
    }

    fn has_pending(&self) -> bool {
        let current = &self.current;
        let committed = &self.committed;
        current.users.len() != committed.users.len()
            || current.accounts.len() != committed.accounts.len()
            || current.transactions.len() != committed.transactions.len()
            || current.loans.len() != committed.loans.len()
            || current.next_user != committed.next_user
            || current.next_account != committed.next_account
            || current.next_transaction != committed.next_transaction
            || current.next_loan != committed.next_loan
    }
}

#[async_trait]
impl Sink for MemorySink {
    fn engine(&self) -> &'static str {
        "memory"
    }

    async fn ensure_reserved_admin(&mut self, admin: &NewUser) -> SinkResult<Option<UserId>> {
        self.begin_write()?;
        if self.current.users.iter().any(|(_, user)| user.email == admin.email) {
            return Ok(None);
        }
        let id = UserId(MemoryTables::next_id(&mut self.current.next_user));
        self.current.users.push((id, admin.clone()));
        self.commit().await?;
        Ok(Some(id))
    }

    async fn insert_user(&mut self, user: &NewUser) -> SinkResult<UserId> {
        self.begin_insert()?;
        if self.current.users.iter().any(|(_, row)| row.email == user.email) {
            return Err(SinkError::UniqueViolation {
                table: "users",
                detail: format!("duplicate email {}", user.email),
            });
        }
        let id = UserId(MemoryTables::next_id(&mut self.current.next_user));
        self.current.users.push((id, user.clone()));
        Ok(id)
    }

    async fn insert_account(&mut self, account: &NewAccount) -> SinkResult<AccountId> {
        self.begin_insert()?;
        self.check_user("accounts", account.user_id)?;
        if self
            .current
            .accounts
            .iter()
            .any(|(_, row)| row.account_number == account.account_number)
        {
            return Err(SinkError::UniqueViolation {
                table: "accounts",
                detail: format!("duplicate account number {}", account.account_number),
            });
        }
        let id = AccountId(MemoryTables::next_id(&mut self.current.next_account));
        self.current.accounts.push((id, account.clone()));
        Ok(id)
    }

    async fn insert_transaction(
        &mut self,
        transaction: &NewTransaction,
    ) -> SinkResult<TransactionId> {
        self.begin_insert()?;
        self.check_account(transaction.from_account)?;
        self.check_account(transaction.to_account)?;
        let id = TransactionId(MemoryTables::next_id(&mut self.current.next_transaction));
        self.current.transactions.push((id, transaction.clone()));
        Ok(id)
    }

    async fn insert_loan(&mut self, loan: &NewLoan) -> SinkResult<LoanId> {
        self.begin_insert()?;
        self.check_user("loans", loan.user_id)?;
        let id = LoanId(MemoryTables::next_id(&mut self.current.next_loan));
        self.current.loans.push((id, loan.clone()));
        Ok(id)
    }

    /// Flags are owned by the banking application and never held here.
    async fn delete_all_flags(&mut self) -> SinkResult<u64> {
        self.begin_write()?;
        Ok(0)
    }

    async fn delete_all_loans(&mut self) -> SinkResult<u64> {
        self.begin_write()?;
        Ok(self.current.loans.drain(..).count() as u64)
    }

    async fn delete_all_transactions(&mut self) -> SinkResult<u64> {
        self.begin_write()?;
        Ok(self.current.transactions.drain(..).count() as u64)
    }

    async fn delete_all_accounts(&mut self) -> SinkResult<u64> {
        self.begin_write()?;
        Ok(self.current.accounts.drain(..).count() as u64)
    }

    async fn delete_all_users_except_reserved_admin(&mut self) -> SinkResult<u64> {
        self.begin_write()?;
        let before = self.current.users.len();
        self.current
            .users
            .retain(|(_, user)| user.email == RESERVED_ADMIN_EMAIL);
        let kept = self.current.user_ids();
        self.current
            .accounts
            .retain(|(_, account)| kept.contains(&account.user_id));
        self.current.loans.retain(|(_, loan)| kept.contains(&loan.user_id));
        Ok((before - self.current.users.len()) as u64)
    }

    async fn commit(&mut self) -> SinkResult<()> {
        self.begin_write()?;
        if self.has_pending() {
            self.committed = self.current.clone();
            self.commits += 1;
        }
        Ok(())
    }

    async fn close(&mut self) -> SinkResult<()> {
        self.current = self.committed.clone();
        self.closed = true;
        Ok(())
    }
}
