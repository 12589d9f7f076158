use bankseed_store::Sink;
use tracing::debug;

use crate::errors::GenerationError;
use crate::model::{CommitMode, GenerationContext, Phase};

/// Commits after a row when the run asks for per-row durability.
pub(crate) async fn after_row<S: Sink + ?Sized>(
    sink: &mut S,
    ctx: &GenerationContext,
) -> Result<(), GenerationError> {
    if ctx.commit_mode == CommitMode::PerRow {
        sink.commit().await?;
    }
    Ok(())
}

/// Closes a generator's batch.
pub(crate) async fn finish<S: Sink + ?Sized>(
    sink: &mut S,
    phase: Phase,
) -> Result<(), GenerationError> {
    sink.commit().await?;
    debug!(event = "batch_committed", phase = %phase);
    Ok(())
}
