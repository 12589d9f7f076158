use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use tracing::warn;

use bankseed_core::{NewUser, Role, TEST_USER_PASSWORD, UserId, UserStatus};
use bankseed_store::Sink;

use crate::batch;
use crate::errors::GenerationError;
use crate::identity::{hash_credential, make_email, make_name, make_salt};
use crate::model::{GenerationContext, InsertOutcome, Phase, PhaseOutput};

/// Roles synthesized users receive. Admins pre-exist and are never generated.
pub const ROLE_WEIGHTS: &[(Role, f64)] = &[(Role::Employee, 0.1), (Role::Customer, 0.9)];

/// Weighted role table built from [`ROLE_WEIGHTS`].
pub struct RoleTable {
    index: WeightedIndex<f64>,
}

impl RoleTable {
    pub fn new() -> Result<Self, GenerationError> {
        let index = WeightedIndex::new(ROLE_WEIGHTS.iter().map(|(_, weight)| *weight))
            .map_err(|err| GenerationError::InvalidOptions(format!("role weights: {err}")))?;
        Ok(Self { index })
    }

    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Role {
        ROLE_WEIGHTS[self.index.sample(rng)].0
    }
}

/// Builds one user row with a fresh salt and the shared test password.
pub fn build_user<R: Rng + ?Sized>(
    rng: &mut R,
    roles: &RoleTable,
    ctx: &GenerationContext,
) -> NewUser {
    let (first, last) = make_name(rng);
    let email = make_email(rng, first, last);
    let salt = make_salt(rng);
    NewUser {
        name: format!("{first} {last}"),
        email,
        password_hash: hash_credential(TEST_USER_PASSWORD, &salt),
        salt,
        role: roles.draw(rng),
        status: UserStatus::Active,
        created_at: ctx.now,
    }
}

/// Attempts `count` user inserts. Duplicate emails are skipped, not retried,
/// so fewer than `count` identities may come back.
pub async fn generate_users<S, R>(
    sink: &mut S,
    rng: &mut R,
    ctx: &GenerationContext,
    count: u64,
) -> Result<PhaseOutput<UserId>, GenerationError>
where
    S: Sink + ?Sized,
    R: Rng + ?Sized,
{
    let roles = RoleTable::new()?;
    let mut output = PhaseOutput::empty(Phase::Users, count);

    for _ in 0..count {
        let user = build_user(rng, &roles, ctx);
        let outcome = InsertOutcome::from_sink(sink.insert_user(&user).await)?;
        output.report.record(&outcome);
        match outcome {
            InsertOutcome::Inserted(id) => {
                output.ids.push(id);
                batch::after_row(sink, ctx).await?;
            }
            InsertOutcome::Skipped(reason) => {
                warn!(
                    event = "row_skipped",
                    phase = %Phase::Users,
                    email = %user.email,
                    reason = %reason.detail,
                    "skipping duplicate email: {}",
                    user.email
                );
            }
        }
    }

    batch::finish(sink, Phase::Users).await?;
    Ok(output)
}
