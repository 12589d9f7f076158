use std::collections::HashSet;

use bankseed_core::{AccountId, LoanStatus, RESERVED_ADMIN_EMAIL, TransactionType};
use bankseed_generate::accounts::generate_accounts;
use bankseed_generate::identity::reserved_admin;
use bankseed_generate::loans::{REJECTION_REASONS, generate_loans};
use bankseed_generate::transactions::generate_transactions;
use bankseed_generate::users::generate_users;
use bankseed_generate::{
    CommitMode, GenerateOptions, GenerationContext, GenerationError, Phase, PopulationEngine,
    clear_data,
};
use bankseed_store::{MemorySink, Sink, SinkError};
use chrono::{NaiveDate, NaiveDateTime};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|date| date.and_hms_opt(15, 9, 26))
        .unwrap_or_default()
}

fn options(users: u64, accounts: u64, transactions: u64, loans: u64) -> GenerateOptions {
    GenerateOptions {
        users,
        accounts,
        transactions,
        loans,
        seed: Some(42),
        ..GenerateOptions::default()
    }
}

async fn populate(sink: &mut MemorySink, options: GenerateOptions, seed: u64) {
    let ctx = GenerationContext::new(now(), &options);
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    PopulationEngine::new(options)
        .run_with(sink, &mut rng, seed, &ctx)
        .await
        .expect("population run");
}

#[tokio::test]
async fn generated_rows_reference_rows_from_the_same_run() {
    let mut sink = MemorySink::new();
    populate(&mut sink, options(25, 40, 300, 60), 7).await;

    let tables = sink.committed();
    let user_ids: HashSet<_> = tables.user_ids().into_iter().collect();
    let account_ids: HashSet<_> = tables.account_ids().into_iter().collect();
    assert!(!user_ids.is_empty());
    assert!(!account_ids.is_empty());

    for (_, account) in &tables.accounts {
        assert!(user_ids.contains(&account.user_id));
    }

    let mut types = HashSet::new();
    for (_, transaction) in &tables.transactions {
        types.insert(transaction.transaction_type);
        match transaction.transaction_type {
            TransactionType::Deposit => {
                assert!(transaction.from_account.is_none());
                let to = transaction.to_account.expect("deposit credits an account");
                assert!(account_ids.contains(&to));
            }
            TransactionType::Withdrawal => {
                assert!(transaction.to_account.is_none());
                let from = transaction.from_account.expect("withdrawal debits an account");
                assert!(account_ids.contains(&from));
            }
            TransactionType::Transfer => {
                let from = transaction.from_account.expect("transfer source");
                let to = transaction.to_account.expect("transfer destination");
                assert_ne!(from, to);
                assert!(account_ids.contains(&from));
                assert!(account_ids.contains(&to));
            }
        }
    }
    assert_eq!(types.len(), 3);

    for (_, loan) in &tables.loans {
        assert!(user_ids.contains(&loan.user_id));
        match loan.status {
            LoanStatus::Rejected => {
                let comment = loan.admin_comment.as_deref().expect("rejection comment");
                assert!(REJECTION_REASONS.contains(&comment));
            }
            LoanStatus::Pending | LoanStatus::Approved => assert!(loan.admin_comment.is_none()),
        }
    }
}

#[tokio::test]
async fn emails_and_account_numbers_are_unique_after_run() {
    let mut sink = MemorySink::new();
    populate(&mut sink, options(200, 300, 0, 0), 11).await;

    let tables = sink.committed();
    let emails: HashSet<_> = tables.users.iter().map(|(_, user)| &user.email).collect();
    assert_eq!(emails.len(), tables.users.len());
    let numbers: HashSet<_> = tables
        .accounts
        .iter()
        .map(|(_, account)| &account.account_number)
        .collect();
    assert_eq!(numbers.len(), tables.accounts.len());
}

#[tokio::test]
async fn duplicate_emails_are_skipped_without_retry() {
    let opts = options(10, 0, 0, 0);
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new();

    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let first = generate_users(&mut sink, &mut rng, &ctx, 10)
        .await
        .expect("first batch");

    // Same seed draws the same emails again.
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let second = generate_users(&mut sink, &mut rng, &ctx, 10)
        .await
        .expect("second batch");

    assert!(second.ids.is_empty());
    assert_eq!(second.report.skipped, 10);
    assert_eq!(second.report.inserted, 0);
    assert_eq!(second.report.skip_reasons.len() as u64, second.report.skipped);
    assert_eq!(sink.committed().users.len() as u64, first.report.inserted);
    assert_eq!(sink.insert_calls(), 20);
}

#[tokio::test]
async fn accounts_with_no_users_insert_nothing() {
    let opts = options(5, 0, 0, 0);
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    let output = generate_accounts(&mut sink, &mut rng, &ctx, &[], 0)
        .await
        .expect("empty prerequisite is not an error");
    assert!(output.ids.is_empty());

    let output = generate_accounts(&mut sink, &mut rng, &ctx, &[], 8)
        .await
        .expect("empty prerequisite is not an error");
    assert!(output.ids.is_empty());
    assert_eq!(output.report.inserted, 0);
    assert_eq!(sink.insert_calls(), 0);
}

#[tokio::test]
async fn single_account_produces_no_transfers() {
    let opts = options(1, 1, 10, 0);
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let users = generate_users(&mut sink, &mut rng, &ctx, 1).await.expect("users");
    let accounts = generate_accounts(&mut sink, &mut rng, &ctx, &users.ids, 1)
        .await
        .expect("accounts");
    assert_eq!(accounts.ids.len(), 1);

    let report = generate_transactions(&mut sink, &mut rng, &ctx, &accounts.ids, 10)
        .await
        .expect("transactions");
    assert_eq!(report.inserted, 10);
    for (_, transaction) in &sink.committed().transactions {
        assert_ne!(transaction.transaction_type, TransactionType::Transfer);
    }
}

#[tokio::test]
async fn strict_prerequisites_reject_transfers_without_two_accounts() {
    let mut opts = options(0, 0, 10, 0);
    opts.strict_prerequisites = true;
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let err = generate_transactions(&mut sink, &mut rng, &ctx, &[AccountId(1)], 10)
        .await
        .expect_err("strict mode fails fast");
    assert!(matches!(
        err,
        GenerationError::EmptyPrerequisite {
            phase: Phase::Transactions,
            ..
        }
    ));
    assert_eq!(sink.insert_calls(), 0);
}

#[tokio::test]
async fn loans_with_no_users_insert_nothing() {
    let opts = options(0, 0, 0, 4);
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new();
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let report = generate_loans(&mut sink, &mut rng, &ctx, &[], 4)
        .await
        .expect("loans");
    assert_eq!(report.inserted, 0);
    assert_eq!(sink.insert_calls(), 0);
}

#[tokio::test]
async fn clear_is_idempotent_and_keeps_reserved_admin() {
    let mut sink = MemorySink::new();
    let mut rng = ChaCha8Rng::seed_from_u64(0);
    sink.ensure_reserved_admin(&reserved_admin(&mut rng, now()))
        .await
        .expect("admin");
    populate(&mut sink, options(10, 10, 20, 5), 21).await;

    for _ in 0..2 {
        clear_data(&mut sink).await.expect("clear");
        let tables = sink.committed();
        assert!(tables.loans.is_empty());
        assert!(tables.transactions.is_empty());
        assert!(tables.accounts.is_empty());
        assert_eq!(tables.users.len(), 1);
        assert_eq!(tables.users[0].1.email, RESERVED_ADMIN_EMAIL);
    }
}

#[tokio::test]
async fn per_row_commits_survive_a_lost_connection() {
    let mut opts = options(6, 0, 0, 0);
    opts.commit_mode = CommitMode::PerRow;
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new().fail_after(3);
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    let err = generate_users(&mut sink, &mut rng, &ctx, 6)
        .await
        .expect_err("connection is lost");
    assert!(matches!(err, GenerationError::Sink(SinkError::Connection(_))));
    assert_eq!(sink.committed().users.len(), 3);
    assert_eq!(sink.commits(), 3);
}

#[tokio::test]
async fn per_batch_commit_loses_the_open_batch_on_failure() {
    let opts = options(6, 0, 0, 0);
    let ctx = GenerationContext::new(now(), &opts);
    let mut sink = MemorySink::new().fail_after(3);
    let mut rng = ChaCha8Rng::seed_from_u64(2);

    generate_users(&mut sink, &mut rng, &ctx, 6)
        .await
        .expect_err("connection is lost");
    sink.close().await.expect("close");
    assert!(sink.committed().users.is_empty());
}

#[tokio::test]
async fn run_and_close_releases_the_sink_on_failure() {
    let mut sink = MemorySink::new().fail_after(2);
    let engine = PopulationEngine::new(options(5, 5, 5, 5));

    let err = engine.run_and_close(&mut sink).await.expect_err("run fails");
    assert!(matches!(err, GenerationError::Sink(SinkError::Connection(_))));
    assert!(sink.is_closed());
}

#[tokio::test]
async fn run_reports_each_phase_in_order() {
    let mut sink = MemorySink::new();
    let engine = PopulationEngine::new(options(8, 12, 30, 6));

    let report = engine.run_and_close(&mut sink).await.expect("run");
    assert_eq!(report.seed, 42);
    let phases: Vec<_> = report.phases.iter().map(|phase| phase.phase).collect();
    assert_eq!(
        phases,
        vec![Phase::Users, Phase::Accounts, Phase::Transactions, Phase::Loans]
    );
    let users = report.phase(Phase::Users).expect("users report");
    assert_eq!(users.inserted + users.skipped, 8);
    assert_eq!(
        report.phase(Phase::Transactions).map(|phase| phase.inserted),
        Some(30)
    );
    assert!(sink.is_closed());
}

#[tokio::test]
async fn same_seed_produces_same_rows() {
    let mut first = MemorySink::new();
    let mut second = MemorySink::new();
    populate(&mut first, options(6, 8, 15, 4), 99).await;
    populate(&mut second, options(6, 8, 15, 4), 99).await;

    assert_eq!(first.committed().users, second.committed().users);
    assert_eq!(first.committed().accounts, second.committed().accounts);
    assert_eq!(first.committed().transactions, second.committed().transactions);
    assert_eq!(first.committed().loans, second.committed().loans);
}

async fn sink_with_pending_user(rng: &mut ChaCha8Rng) -> MemorySink {
    let mut sink = MemorySink::new();
    sink.insert_user(&reserved_admin(rng, now()))
        .await
        .expect("insert user");
    assert!(sink.committed().users.is_empty());
    sink
}

#[tokio::test]
async fn phases_without_prerequisites_still_close_their_batch() {
    let opts = options(0, 3, 3, 3);
    let ctx = GenerationContext::new(now(), &opts);
    let mut rng = ChaCha8Rng::seed_from_u64(4);

    let mut sink = sink_with_pending_user(&mut rng).await;
    generate_accounts(&mut sink, &mut rng, &ctx, &[], 3)
        .await
        .expect("accounts");
    assert_eq!(sink.committed().users.len(), 1);

    let mut sink = sink_with_pending_user(&mut rng).await;
    generate_transactions(&mut sink, &mut rng, &ctx, &[], 3)
        .await
        .expect("transactions");
    assert_eq!(sink.committed().users.len(), 1);

    let mut sink = sink_with_pending_user(&mut rng).await;
    generate_loans(&mut sink, &mut rng, &ctx, &[], 3)
        .await
        .expect("loans");
    assert_eq!(sink.committed().users.len(), 1);
    assert_eq!(sink.commits(), 1);
}

