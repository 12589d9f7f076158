use rand::Rng;
use tracing::{info, warn};

use bankseed_core::{AccountId, AccountType, NewAccount, UserId};
use bankseed_store::Sink;

use crate::batch;
use crate::errors::GenerationError;
use crate::model::{GenerationContext, InsertOutcome, Phase, PhaseOutput};
use crate::random::{days_before, pick, uniform_cents};

pub const ACCOUNT_NUMBER_MIN: u32 = 100_000_000;
pub const ACCOUNT_NUMBER_MAX: u32 = 999_999_999;
pub const BALANCE_RANGE: (f64, f64) = (100.0, 50_000.0);
pub const CREATED_DAYS_AGO: (i64, i64) = (1, 730);

/// Builds one account owned by `owner`.
pub fn build_account<R: Rng + ?Sized>(
    rng: &mut R,
    owner: UserId,
    ctx: &GenerationContext,
) -> NewAccount {
    let account_type = pick(rng, AccountType::ALL)
        .copied()
        .unwrap_or(AccountType::Checking);
    let account_number = rng
        .random_range(ACCOUNT_NUMBER_MIN..=ACCOUNT_NUMBER_MAX)
        .to_string();
    let balance = uniform_cents(rng, BALANCE_RANGE.0, BALANCE_RANGE.1);
    let created_at = days_before(rng, ctx.now, CREATED_DAYS_AGO.0, CREATED_DAYS_AGO.1);
    NewAccount {
        user_id: owner,
        account_number,
        account_type,
        balance,
        created_at,
    }
}

/// Attempts `count` account inserts, each owned by a user drawn with
/// replacement from `user_ids`. Duplicate account numbers are skipped.
///
/// An empty `user_ids` yields no inserts and no identities.
pub async fn generate_accounts<S, R>(
    sink: &mut S,
    rng: &mut R,
    ctx: &GenerationContext,
    user_ids: &[UserId],
    count: u64,
) -> Result<PhaseOutput<AccountId>, GenerationError>
where
    S: Sink + ?Sized,
    R: Rng + ?Sized,
{
    let mut output = PhaseOutput::empty(Phase::Accounts, count);
    if user_ids.is_empty() {
        if ctx.strict_prerequisites && count > 0 {
            return Err(GenerationError::EmptyPrerequisite {
                phase: Phase::Accounts,
                detail: "no users to own accounts".to_string(),
            });
        }
        info!(
            event = "phase_degraded",
            phase = %Phase::Accounts,
            requested = count,
            "no users available, skipping account generation"
        );
        batch::finish(sink, Phase::Accounts).await?;
        return Ok(output);
    }

    for _ in 0..count {
        let Some(&owner) = pick(rng, user_ids) else {
            break;
        };
        let account = build_account(rng, owner, ctx);
        let outcome = InsertOutcome::from_sink(sink.insert_account(&account).await)?;
        output.report.record(&outcome);
        match outcome {
            InsertOutcome::Inserted(id) => {
                output.ids.push(id);
                batch::after_row(sink, ctx).await?;
            }
            InsertOutcome::Skipped(reason) => {
                warn!(
                    event = "row_skipped",
                    phase = %Phase::Accounts,
                    account_number = %account.account_number,
                    reason = %reason.detail,
                    "skipping duplicate account number: {}",
                    account.account_number
                );
            }
        }
    }

    batch::finish(sink, Phase::Accounts).await?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::model::GenerateOptions;

    use super::*;

    #[test]
    fn account_fields_stay_in_range() {
        let now = NaiveDate::from_ymd_opt(2025, 1, 15)
            .and_then(|date| date.and_hms_opt(8, 0, 0))
            .unwrap_or_default();
        let ctx = GenerationContext::new(now, &GenerateOptions::default());
        let mut rng = ChaCha8Rng::seed_from_u64(99);

        for _ in 0..2_000 {
            let account = build_account(&mut rng, UserId(1), &ctx);
            assert_eq!(account.account_number.len(), 9);
            assert!(account.account_number.chars().all(|c| c.is_ascii_digit()));
            assert!((100.0..50_000.0).contains(&account.balance));
            let age = (now - account.created_at).num_days();
            assert!((1..=730).contains(&age), "age {age}");
        }
    }
}
