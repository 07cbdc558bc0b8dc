//! Turn-based dice combat rules.
//!
//! A match moves `character_select → in_progress → finished`. Each accepted
//! command rolls or resolves exactly one step: initiative rolls decide who
//! acts first, in-progress rolls map a die face through the acting side's
//! ability book, and a pending attack must be answered by the defender
//! (skip, or spend a banked defense) before play continues.
//!
//! All mutation flows through [`CombatEngine::execute`], which drives the
//! `pre_validate → apply → post_validate` pipeline; a rejected command never
//! touches the state.

mod engine;
mod error;
mod state;
mod transition;

pub use engine::{CombatCommand, CombatEngine};
pub use error::CombatError;
pub use state::{
    CombatState, CombatantState, DefenseInventory, MatchStatus, PendingAttack, PlayerSide,
};
pub use transition::{
    CombatEnv, CombatEvent, DefenseChoice, DefenseResolution, TransitionPhase,
    TransitionPhaseError,
};

/// Fixed damage mitigation applied by a spent block defense.
pub const BLOCK_MITIGATION: u32 = 25;
