use sqlx::SqliteConnection;

use crate::error::SinkResult;

const TABLES: &[&str] = &[
    r#"
    create table if not exists users (
      id integer primary key autoincrement,
      name text not null,
      email text unique not null,
      password_hash text not null,
      salt text not null,
      role text not null check(role in ('admin', 'employee', 'customer')),
      status text default 'active' check(status in ('active', 'inactive', 'locked')),
      created_at datetime default current_timestamp
    )
    "#,
    r#"
    create table if not exists accounts (
      id integer primary key autoincrement,
      user_id integer not null,
      account_number text unique not null,
      type text not null check(type in ('checking', 'savings')),
      balance decimal(15,2) default 0.00,
      created_at datetime default current_timestamp,
      foreign key (user_id) references users(id) on delete cascade
    )
    "#,
    r#"
    create table if not exists transactions (
      id integer primary key autoincrement,
      from_account_id integer,
      to_account_id integer,
      type text not null check(type in ('deposit', 'withdrawal', 'transfer')),
      amount decimal(15,2) not null,
      description text,
      timestamp datetime default current_timestamp,
      foreign key (from_account_id) references accounts(id) on delete set null,
      foreign key (to_account_id) references accounts(id) on delete set null
    )
    "#,
    r#"
    create table if not exists loans (
      loanid integer primary key autoincrement,
      userid integer not null,
      amount decimal(15,2) not null,
      type text not null,
      date datetime default current_timestamp,
      status text default 'pending' check(status in ('pending', 'approved', 'rejected')),
      adminComment text,
      foreign key (userid) references users(id) on delete cascade
    )
    "#,
    r#"
    create table if not exists flagged_transactions (
      id integer primary key autoincrement,
      transaction_id integer not null,
      employee_id integer not null,
      flag_reason text,
      flag_date datetime default current_timestamp,
      status text default 'pending' check(status in ('pending', 'reviewing', 'resolved')),
      foreign key (transaction_id) references transactions(id),
      foreign key (employee_id) references users(id)
    )
    "#,
];

pub async fn create_tables(conn: &mut SqliteConnection) -> SinkResult<()> {
    for statement in TABLES {
        sqlx::query(statement).execute(&mut *conn).await?;
    }
    Ok(())
}
