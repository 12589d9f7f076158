use std::time::Instant;

use chrono::Utc;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{info, warn};

use bankseed_store::Sink;

use crate::accounts::generate_accounts;
use crate::errors::GenerationError;
use crate::loans::generate_loans;
use crate::model::{GenerateOptions, GenerationContext, Phase, PopulationReport};
use crate::transactions::generate_transactions;
use crate::users::generate_users;

/// Removes generated rows in foreign-key-safe order, keeping the reserved admin.
pub async fn clear_data<S: Sink + ?Sized>(sink: &mut S) -> Result<(), GenerationError> {
    info!(event = "phase_started", phase = %Phase::Clear, "Clearing existing data...");
    let flags = sink.delete_all_flags().await?;
    let loans = sink.delete_all_loans().await?;
    let transactions = sink.delete_all_transactions().await?;
    let accounts = sink.delete_all_accounts().await?;
    let users = sink.delete_all_users_except_reserved_admin().await?;
    sink.commit().await?;
    info!(
        event = "phase_finished",
        phase = %Phase::Clear,
        flags,
        loans,
        transactions,
        accounts,
        users
    );
    Ok(())
}

/// Sequences clear, users, accounts, transactions and loans against one sink.
///
/// Each phase commits its own batch; a failure between phases leaves the
/// earlier phases in place.
#[derive(Debug, Clone)]
pub struct PopulationEngine {
    options: GenerateOptions,
}

impl PopulationEngine {
    pub fn new(options: GenerateOptions) -> Self {
        Self { options }
    }

    /// Runs every phase, then closes the sink whether or not the run succeeded.
    pub async fn run_and_close<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<PopulationReport, GenerationError> {
        let outcome = self.run(sink).await;
        let closed = sink.close().await;
        match (outcome, closed) {
            (Ok(report), Ok(())) => Ok(report),
            (Ok(_), Err(err)) => Err(err.into()),
            (Err(err), Ok(())) => Err(err),
            (Err(err), Err(close_err)) => {
                warn!(event = "sink_close_failed", error = %close_err);
                Err(err)
            }
        }
    }

    /// Runs with an RNG seeded from the options (or a fresh seed) and the
    /// current UTC time.
    pub async fn run<S: Sink + ?Sized>(
        &self,
        sink: &mut S,
    ) -> Result<PopulationReport, GenerationError> {
        let seed = self.options.seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let ctx = GenerationContext::new(Utc::now().naive_utc(), &self.options);
        self.run_with(sink, &mut rng, seed, &ctx).await
    }

    /// Runs with caller-provided randomness and clock.
    pub async fn run_with<S, R>(
        &self,
        sink: &mut S,
        rng: &mut R,
        seed: u64,
        ctx: &GenerationContext,
    ) -> Result<PopulationReport, GenerationError>
    where
        S: Sink + ?Sized,
        R: Rng + ?Sized,
    {
        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let options = &self.options;
        info!(
            event = "run_started",
            run_id = %run_id,
            engine = sink.engine(),
            seed,
            commit_mode = ?ctx.commit_mode
        );

        if options.clear {
            clear_data(sink).await?;
        }

        let mut phases = Vec::with_capacity(4);

        info!(
            event = "phase_started",
            phase = %Phase::Users,
            requested = options.users,
            "Generating {} users...",
            options.users
        );
        let users = generate_users(sink, rng, ctx, options.users).await?;
        phases.push(users.report.clone());

        info!(
            event = "phase_started",
            phase = %Phase::Accounts,
            requested = options.accounts,
            "Generating {} accounts...",
            options.accounts
        );
        let accounts = generate_accounts(sink, rng, ctx, &users.ids, options.accounts).await?;
        phases.push(accounts.report.clone());

        info!(
            event = "phase_started",
            phase = %Phase::Transactions,
            requested = options.transactions,
            "Generating {} transactions...",
            options.transactions
        );
        phases.push(
            generate_transactions(sink, rng, ctx, &accounts.ids, options.transactions).await?,
        );

        info!(
            event = "phase_started",
            phase = %Phase::Loans,
            requested = options.loans,
            "Generating {} loans...",
            options.loans
        );
        phases.push(generate_loans(sink, rng, ctx, &users.ids, options.loans).await?);

        info!(
            event = "run_finished",
            run_id = %run_id,
            duration_ms = start.elapsed().as_millis() as u64,
            "Database population complete!"
        );

        Ok(PopulationReport {
            run_id,
            seed,
            cleared: options.clear,
            phases,
        })
    }
}
