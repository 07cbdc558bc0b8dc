//! Errors surfaced by combat command execution.

use thiserror::Error;

use crate::character::DefenseKind;
use super::state::{MatchStatus, PlayerSide};

/// Rejection reasons for combat commands. A rejected command never mutates
/// the match state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatError {
    #[error("match is {actual}, expected {expected}")]
    WrongStatus {
        expected: MatchStatus,
        actual: MatchStatus,
    },

    #[error("it is not player {side}'s turn")]
    NotPlayersTurn { side: PlayerSide },

    #[error("player {side} already rolled for initiative")]
    AlreadyRolled { side: PlayerSide },

    #[error("an attack is awaiting defense resolution")]
    AttackUnresolved,

    #[error("there is no attack to defend against")]
    NoPendingAttack,

    #[error("the attacking player cannot resolve its own attack")]
    AttackerCannotDefend,

    #[error("no banked {kind} defense available")]
    InvalidDefense { kind: DefenseKind },

    #[error("combat invariant violated: {0}")]
    InvariantViolated(String),
}
