//! Move-sources: where a column choice comes from. The turn controller asks
//! the active side's source for a column and validates it against the board
//! itself; sources are never trusted to be legal.

mod human;
mod openai;
mod policy;
mod random;

pub use human::{ChannelInput, TextInput};
pub use openai::OpenAiPolicy;
pub use policy::{encode_board, parse_column, PolicyClient, PolicyRequest, PolicySource, RULES_PROMPT};
pub use random::RandomSource;

use std::sync::Arc;
use std::time::Duration;

use crate::config::{OpponentKind, PolicyConfig};
use crate::error::{PolicyError, SourceError};
use crate::game::{Board, Player};

/// Universal interface for anything that picks columns.
pub trait MoveSource {
    /// Propose a column for `player` on `board`.
    ///
    /// `Ok(None)` means the source has nothing to offer yet (a UI waiting for
    /// a click); the controller asks again on the next step.
    fn propose(&mut self, board: &Board, player: Player) -> Result<Option<usize>, SourceError>;

    /// Return the source's display name.
    fn name(&self) -> &str;

    /// Rewind per-game state before a new game starts.
    fn reset(&mut self) {}
}

/// Build the automated opponent described by the config.
///
/// Fails only when the policy client cannot be configured at all, e.g. no API
/// key is set.
pub fn automated(
    kind: OpponentKind,
    policy: &PolicyConfig,
    seed: Option<u64>,
) -> Result<Box<dyn MoveSource>, PolicyError> {
    let random = match seed {
        Some(seed) => RandomSource::seeded(seed),
        None => RandomSource::new(),
    };

    match kind {
        OpponentKind::Random => Ok(Box::new(random)),
        OpponentKind::Policy => {
            let client = OpenAiPolicy::from_env(policy)?;
            let source = PolicySource::new(
                Arc::new(client),
                Some(Duration::from_millis(policy.timeout_ms)),
                random,
            )
            .with_name(format!("Policy ({})", policy.model));
            Ok(Box::new(source))
        }
    }
}
