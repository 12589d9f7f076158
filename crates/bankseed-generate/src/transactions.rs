use chrono::Duration;
use rand::Rng;
use tracing::{info, warn};

use bankseed_core::{AccountId, NewTransaction, TransactionType};
use bankseed_store::Sink;

use crate::batch;
use crate::errors::GenerationError;
use crate::model::{GenerationContext, InsertOutcome, Phase, PhaseReport};
use crate::random::{pick, uniform_cents};

pub const AMOUNT_RANGE: (f64, f64) = (5.0, 3_000.0);
pub const MAX_DAYS_AGO: i64 = 90;

pub const DESCRIPTIONS: &[&str] = &[
    "Salary Deposit",
    "ATM Withdrawal",
    "Online Transfer",
    "Bill Payment",
    "Grocery Shopping",
    "Restaurant",
    "Rent Payment",
    "Subscription",
    "Refund",
    "Investment",
    "Coffee Shop",
    "Amazon Purchase",
    "Netflix",
    "Uber",
    "Utilities",
    "Mobile Phone",
    "Insurance",
    "Medical",
    "Travel",
    "Entertainment",
];

const SINGLE_ACCOUNT_TYPES: &[TransactionType] =
    &[TransactionType::Deposit, TransactionType::Withdrawal];

/// Distinct accounts transactions may reference, plus the types they allow.
///
/// Transfers need two distinct accounts, so with fewer the type pool drops
/// `transfer` instead of inventing a counterparty.
#[derive(Debug, Clone)]
pub struct AccountPool {
    accounts: Vec<AccountId>,
}

impl AccountPool {
    pub fn new(account_ids: &[AccountId]) -> Self {
        let mut accounts = account_ids.to_vec();
        accounts.sort_unstable();
        accounts.dedup();
        Self { accounts }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn allows_transfers(&self) -> bool {
        self.accounts.len() >= 2
    }

    pub fn types(&self) -> &'static [TransactionType] {
        if self.allows_transfers() {
            TransactionType::ALL
        } else {
            SINGLE_ACCOUNT_TYPES
        }
    }

    /// Uniform account other than `exclude`; `None` when no other exists.
    fn counterparty<R: Rng + ?Sized>(&self, rng: &mut R, exclude: AccountId) -> Option<AccountId> {
        let others: Vec<AccountId> = self
            .accounts
            .iter()
            .copied()
            .filter(|id| *id != exclude)
            .collect();
        pick(rng, &others).copied()
    }

    /// Builds one transaction whose endpoints match its type.
    pub fn build<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        ctx: &GenerationContext,
    ) -> Option<NewTransaction> {
        let candidate = *pick(rng, &self.accounts)?;
        let transaction_type = *pick(rng, self.types())?;
        let (from_account, to_account) = match transaction_type {
            TransactionType::Deposit => (None, Some(candidate)),
            TransactionType::Withdrawal => (Some(candidate), None),
            TransactionType::Transfer => {
                (Some(candidate), Some(self.counterparty(rng, candidate)?))
            }
        };
        let amount = uniform_cents(rng, AMOUNT_RANGE.0, AMOUNT_RANGE.1);
        let description = pick(rng, DESCRIPTIONS).copied().unwrap_or("Refund");
        let ago = Duration::days(rng.random_range(0..=MAX_DAYS_AGO))
            + Duration::hours(rng.random_range(0..=23))
            + Duration::minutes(rng.random_range(0..=59));
        Some(NewTransaction {
            from_account,
            to_account,
            transaction_type,
            amount,
            description: description.to_string(),
            timestamp: ctx.now - ago,
        })
    }
}

/// Inserts `count` transactions between the given accounts.
///
/// No uniqueness applies, so every attempt inserts. With no accounts nothing
/// is inserted; with one account only deposits and withdrawals are drawn
/// unless strict prerequisites are requested, which fails instead.
pub async fn generate_transactions<S, R>(
    sink: &mut S,
    rng: &mut R,
    ctx: &GenerationContext,
    account_ids: &[AccountId],
    count: u64,
) -> Result<PhaseReport, GenerationError>
where
    S: Sink + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = PhaseReport::new(Phase::Transactions, count);
    let pool = AccountPool::new(account_ids);

    if count == 0 {
        batch::finish(sink, Phase::Transactions).await?;
        return Ok(report);
    }
    if !pool.allows_transfers() && ctx.strict_prerequisites {
        return Err(GenerationError::EmptyPrerequisite {
            phase: Phase::Transactions,
            detail: format!(
                "transfers need at least 2 distinct accounts, found {}",
                pool.len()
            ),
        });
    }
    if pool.is_empty() {
        info!(
            event = "phase_degraded",
            phase = %Phase::Transactions,
            requested = count,
            "no accounts available, skipping transaction generation"
        );
        batch::finish(sink, Phase::Transactions).await?;
        return Ok(report);
    }
    if !pool.allows_transfers() {
        warn!(
            event = "phase_degraded",
            phase = %Phase::Transactions,
            accounts = pool.len(),
            "fewer than 2 accounts, transfers disabled"
        );
    }

    for _ in 0..count {
        let Some(transaction) = pool.build(rng, ctx) else {
            break;
        };
        transaction.validate()?;
        let outcome = InsertOutcome::from_sink(sink.insert_transaction(&transaction).await)?;
        report.record(&outcome);
        if let InsertOutcome::Inserted(_) = outcome {
            batch::after_row(sink, ctx).await?;
        }
    }

    batch::finish(sink, Phase::Transactions).await?;
    Ok(report)
}
