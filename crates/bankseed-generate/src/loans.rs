use rand::Rng;
use tracing::info;

use bankseed_core::{LoanStatus, LoanType, NewLoan, UserId};
use bankseed_store::Sink;

use crate::batch;
use crate::errors::GenerationError;
use crate::model::{GenerationContext, InsertOutcome, Phase, PhaseReport};
use crate::random::{days_before, pick, uniform_cents};

pub const REQUESTED_DAYS_AGO: (i64, i64) = (0, 180);

pub const REJECTION_REASONS: &[&str] = &[
    "Insufficient income",
    "Poor credit history",
    "High debt-to-income ratio",
    "Incomplete documentation",
    "Employment history concerns",
];

/// Builds one loan request by `borrower`. Only rejected loans carry a comment.
pub fn build_loan<R: Rng + ?Sized>(
    rng: &mut R,
    borrower: UserId,
    ctx: &GenerationContext,
) -> NewLoan {
    let loan_type = pick(rng, LoanType::ALL)
        .copied()
        .unwrap_or(LoanType::Personal);
    let (min, max) = loan_type.amount_range();
    let amount = uniform_cents(rng, min, max);
    let requested_at = days_before(rng, ctx.now, REQUESTED_DAYS_AGO.0, REQUESTED_DAYS_AGO.1);
    let status = pick(rng, LoanStatus::ALL)
        .copied()
        .unwrap_or(LoanStatus::Pending);
    let admin_comment = match status {
        LoanStatus::Rejected => pick(rng, REJECTION_REASONS).map(|reason| reason.to_string()),
        LoanStatus::Pending | LoanStatus::Approved => None,
    };
    NewLoan {
        user_id: borrower,
        amount,
        loan_type,
        requested_at,
        status,
        admin_comment,
    }
}

/// Inserts `count` loans requested by users drawn from `user_ids`.
pub async fn generate_loans<S, R>(
    sink: &mut S,
    rng: &mut R,
    ctx: &GenerationContext,
    user_ids: &[UserId],
    count: u64,
) -> Result<PhaseReport, GenerationError>
where
    S: Sink + ?Sized,
    R: Rng + ?Sized,
{
    let mut report = PhaseReport::new(Phase::Loans, count);
    if user_ids.is_empty() {
        if ctx.strict_prerequisites && count > 0 {
            return Err(GenerationError::EmptyPrerequisite {
                phase: Phase::Loans,
                detail: "no users to request loans".to_string(),
            });
        }
        info!(
            event = "phase_degraded",
            phase = %Phase::Loans,
            requested = count,
            "no users available, skipping loan generation"
        );
        batch::finish(sink, Phase::Loans).await?;
        return Ok(report);
    }

    for _ in 0..count {
        let Some(&borrower) = pick(rng, user_ids) else {
            break;
        };
        let loan = build_loan(rng, borrower, ctx);
        let outcome = InsertOutcome::from_sink(sink.insert_loan(&loan).await)?;
        report.record(&outcome);
        if let InsertOutcome::Inserted(_) = outcome {
            batch::after_row(sink, ctx).await?;
        }
    }

    batch::finish(sink, Phase::Loans).await?;
    Ok(report)
}
