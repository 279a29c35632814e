//! Errors surfaced by tournament operations. All of them leave stored state unchanged.

use crate::models::Stage;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum TournamentError {
    /// Malformed input: bad score, bad level, missing required field.
    #[error("{0}")]
    Validation(String),
    /// The tournament already has as many players as its format allows.
    #[error("Tournament is full ({format} players)")]
    Capacity { format: u32 },
    /// The player's level does not fit the tournament's allowed range.
    #[error("{0}")]
    Eligibility(String),
    /// Only the tournament creator or a superuser may do this.
    #[error("Only the tournament creator or an administrator can do this")]
    Unauthorized,
    #[error("{0} not found")]
    NotFound(&'static str),
    /// The action is not valid in the tournament's current stage.
    #[error("Not allowed while the tournament is in the {stage} stage")]
    InvalidStage { stage: Stage },
    #[error("storage error: {0}")]
    Storage(String),
}

pub type Result<T, E = TournamentError> = std::result::Result<T, E>;
