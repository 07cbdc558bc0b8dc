//! Deterministic match rules shared across the runtime and offline tools.
//!
//! `arena-core` defines the canonical rules for dice-driven 1v1 combat and
//! single-elimination tournament brackets. All combat mutation flows through
//! [`combat::CombatEngine`]; bracket progression always returns a fresh
//! snapshot so callers decide what to persist. The crate performs no I/O:
//! entropy enters through [`rng::RngOracle`] and timestamps are supplied by
//! the caller.
pub mod bracket;
pub mod character;
pub mod combat;
pub mod rng;

pub use bracket::{
    Bracket, BracketError, BracketSize, BracketSlot, Entrant, MatchRef, Participant, Round,
    SlotId, Timestamp,
};
pub use character::{
    Ability, AbilityBook, AbilityKind, Character, CharacterError, CharacterId, CharacterOracle,
    CharacterRef, DefenseKind, DieFace, PlayerAddress,
};
pub use combat::{
    BLOCK_MITIGATION, CombatCommand, CombatEngine, CombatEnv, CombatError, CombatEvent,
    CombatState, CombatantState, DefenseChoice, DefenseInventory, DefenseResolution, MatchStatus,
    PendingAttack, PlayerSide, TransitionPhase, TransitionPhaseError,
};
pub use rng::{PcgRng, RngOracle, compute_seed, shuffle};
