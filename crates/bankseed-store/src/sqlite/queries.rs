use sqlx::SqliteConnection;

use bankseed_core::{
    AccountId, LoanId, NewAccount, NewLoan, NewTransaction, NewUser, TransactionId, UserId,
};

use crate::error::{SinkError, SinkResult};

pub async fn user_exists(conn: &mut SqliteConnection, email: &str) -> SinkResult<bool> {
    let count = sqlx::query_scalar::<_, i64>("select count(*) from users where email = ?")
        .bind(email)
        .fetch_one(conn)
        .await?;
    Ok(count > 0)
}

pub async fn insert_user(conn: &mut SqliteConnection, user: &NewUser) -> SinkResult<UserId> {
    let result = sqlx::query(
        r#"
        insert into users (name, email, password_hash, salt, role, status, created_at)
        values (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.name)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.salt)
    .bind(user.role.as_str())
    .bind(user.status.as_str())
    .bind(user.created_at)
    .execute(conn)
    .await
    .map_err(|err| classify("users", err))?;
    Ok(UserId(result.last_insert_rowid()))
}

pub async fn insert_account(
    conn: &mut SqliteConnection,
    account: &NewAccount,
) -> SinkResult<AccountId> {
    let result = sqlx::query(
        r#"
        insert into accounts (user_id, account_number, type, balance, created_at)
        values (?, ?, ?, ?, ?)
        "#,
    )
    .bind(account.user_id.get())
    .bind(&account.account_number)
    .bind(account.account_type.as_str())
    .bind(account.balance)
    .bind(account.created_at)
    .execute(conn)
    .await
    .map_err(|err| classify("accounts", err))?;
    Ok(AccountId(result.last_insert_rowid()))
}

pub async fn insert_transaction(
    conn: &mut SqliteConnection,
    transaction: &NewTransaction,
) -> SinkResult<TransactionId> {
    let result = sqlx::query(
        r#"
        insert into transactions (from_account_id, to_account_id, type, amount, description, timestamp)
        values (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(transaction.from_account.map(AccountId::get))
    .bind(transaction.to_account.map(AccountId::get))
    .bind(transaction.transaction_type.as_str())
    .bind(transaction.amount)
    .bind(&transaction.description)
    .bind(transaction.timestamp)
    .execute(conn)
    .await
    .map_err(|err| classify("transactions", err))?;
    Ok(TransactionId(result.last_insert_rowid()))
}

pub async fn insert_loan(conn: &mut SqliteConnection, loan: &NewLoan) -> SinkResult<LoanId> {
    let result = sqlx::query(
        r#"
        insert into loans (userid, amount, type, date, status, adminComment)
        values (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(loan.user_id.get())
    .bind(loan.amount)
    .bind(loan.loan_type.as_str())
    .bind(loan.requested_at)
    .bind(loan.status.as_str())
    .bind(loan.admin_comment.as_deref())
    .execute(conn)
    .await
    .map_err(|err| classify("loans", err))?;
    Ok(LoanId(result.last_insert_rowid()))
}

/// `table` is always one of the fixed table names above, never user input.
pub async fn delete_all(conn: &mut SqliteConnection, table: &'static str) -> SinkResult<u64> {
    let result = sqlx::query(&format!("delete from {table}"))
        .execute(conn)
        .await
        .map_err(|err| classify(table, err))?;
    Ok(result.rows_affected())
}

pub async fn delete_users_except(conn: &mut SqliteConnection, email: &str) -> SinkResult<u64> {
    let result = sqlx::query("delete from users where email != ?")
        .bind(email)
        .execute(conn)
        .await
        .map_err(|err| classify("users", err))?;
    Ok(result.rows_affected())
}

fn classify(table: &'static str, err: sqlx::Error) -> SinkError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => SinkError::UniqueViolation {
            table,
            detail: db.message().to_string(),
        },
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
            SinkError::ForeignKeyViolation {
                table,
                detail: db.message().to_string(),
            }
        }
        _ => SinkError::Database(err),
    }
}
