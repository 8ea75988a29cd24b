//! Simulated latency for replayed interactions.

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::cassette::format::Interaction;
use crate::error::VcrError;

/// How long a replayed response is held back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DelayPolicy {
    /// Return immediately.
    #[default]
    None,
    /// Wait as long as the original real call took.
    Original,
    /// Wait a fixed amount of time.
    Fixed(Duration),
}

impl DelayPolicy {
    /// The delay to apply when replaying `interaction`.
    #[must_use]
    pub fn duration_for(&self, interaction: &Interaction) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Original => Duration::from_millis(interaction.duration_ms),
            Self::Fixed(duration) => *duration,
        }
    }
}

/// Suspend for the delay `policy` prescribes for `interaction`.
///
/// # Errors
///
/// Returns [`VcrError::Cancelled`] as soon as `cancel` fires.
pub async fn simulate(
    policy: DelayPolicy,
    interaction: &Interaction,
    cancel: &CancellationToken,
) -> Result<(), VcrError> {
    if cancel.is_cancelled() {
        return Err(VcrError::Cancelled);
    }
    let duration = policy.duration_for(interaction);
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(VcrError::Cancelled),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}
