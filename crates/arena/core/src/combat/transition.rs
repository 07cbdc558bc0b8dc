//! Transition pipeline for combat commands.
//!
//! Every command is a [`CombatTransition`] driven through
//! `pre_validate → apply → post_validate`. `pre_validate` carries every
//! rejection check, so a command that fails there leaves the state untouched;
//! `post_validate` guards structural invariants after mutation.

use crate::character::{AbilityKind, DefenseKind, DieFace, PlayerAddress};
use crate::rng::RngOracle;

use super::BLOCK_MITIGATION;
use super::error::CombatError;
use super::state::{CombatState, MatchStatus, PendingAttack, PlayerSide};

/// Environment handed to transitions: the dice oracle.
pub struct CombatEnv<'a> {
    pub rng: &'a dyn RngOracle,
}

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    PreValidate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::PreValidate => "pre_validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying rejection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransitionPhaseError {
    pub phase: TransitionPhase,
    pub error: CombatError,
}

impl TransitionPhaseError {
    pub fn new(phase: TransitionPhase, error: CombatError) -> Self {
        Self { phase, error }
    }
}

impl std::fmt::Display for TransitionPhaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl std::error::Error for TransitionPhaseError {}

/// The defender's answer to a pending attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefenseChoice {
    /// Take the full damage; the turn returns to the defender.
    Skip,
    /// Spend one banked defense of the given kind.
    Spend(DefenseKind),
}

/// How a pending attack was resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DefenseResolution {
    Skipped,
    Dodged,
    Blocked,
    Reflected,
}

/// Outcome of one accepted command, for observers.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatEvent {
    /// First of the two initiative rolls landed.
    InitiativeRolled { side: PlayerSide, face: DieFace },
    /// Second initiative roll landed and combat started.
    InitiativeResolved {
        side: PlayerSide,
        face: DieFace,
        first: PlayerSide,
    },
    /// Second initiative roll tied the first; both rolls were cleared.
    InitiativeTied { face: DieFace },
    /// A defense ability was rolled and banked.
    DefenseBanked {
        side: PlayerSide,
        face: DieFace,
        kind: DefenseKind,
        ability: String,
    },
    /// An attack ability was rolled; the defender must respond.
    AttackDeclared {
        side: PlayerSide,
        face: DieFace,
        ability: String,
        value: u32,
    },
    /// The pending attack was answered. `damage` is what was actually
    /// applied (to the attacker when reflected, to the defender otherwise).
    DefenseResolved {
        side: PlayerSide,
        resolution: DefenseResolution,
        damage: u32,
        winner: Option<PlayerAddress>,
    },
}

/// A single combat state transition.
pub(super) trait CombatTransition {
    /// Every rejection check. Must not mutate anything.
    fn pre_validate(&self, state: &CombatState) -> Result<(), CombatError>;

    /// Perform the transition, returning the observable event.
    fn apply(&self, state: &mut CombatState, env: &CombatEnv<'_>)
    -> Result<CombatEvent, CombatError>;

    /// Structural invariants that must hold after `apply`.
    fn post_validate(&self, state: &CombatState) -> Result<(), CombatError> {
        match state.status {
            MatchStatus::Finished => {
                if state.winner.is_none() {
                    return Err(CombatError::InvariantViolated(
                        "finished match has no winner".into(),
                    ));
                }
                if !state.player1.is_defeated() && !state.player2.is_defeated() {
                    return Err(CombatError::InvariantViolated(
                        "finished match has no defeated side".into(),
                    ));
                }
            }
            MatchStatus::InProgress => {
                if state.current_turn.is_none() {
                    return Err(CombatError::InvariantViolated(
                        "in-progress match has no current turn".into(),
                    ));
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// Seed-derivation contexts, one per roll kind.
const CTX_INITIATIVE: u32 = 0;
const CTX_ABILITY: u32 = 1;

fn roll_face(state: &mut CombatState, env: &CombatEnv<'_>, side: PlayerSide, context: u32) -> DieFace {
    let seed = state.next_seed(side, context);
    DieFace::from_d6(env.rng.roll_die(seed, DieFace::SIDES as u32))
}

/// Roll the "who goes first" die for one side.
pub(super) struct RollInitiative {
    pub side: PlayerSide,
}

impl CombatTransition for RollInitiative {
    fn pre_validate(&self, state: &CombatState) -> Result<(), CombatError> {
        if state.status != MatchStatus::CharacterSelect {
            return Err(CombatError::WrongStatus {
                expected: MatchStatus::CharacterSelect,
                actual: state.status,
            });
        }
        if state.combatant(self.side).initiative_roll.is_some() {
            return Err(CombatError::AlreadyRolled { side: self.side });
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
    ) -> Result<CombatEvent, CombatError> {
        let face = roll_face(state, env, self.side, CTX_INITIATIVE);
        state.combatant_mut(self.side).initiative_roll = Some(face);

        let other = self.side.opponent();
        let Some(other_face) = state.combatant(other).initiative_roll else {
            return Ok(CombatEvent::InitiativeRolled {
                side: self.side,
                face,
            });
        };

        if face == other_face {
            // Tie: clear both rolls, both sides roll again.
            state.combatant_mut(self.side).initiative_roll = None;
            state.combatant_mut(other).initiative_roll = None;
            return Ok(CombatEvent::InitiativeTied { face });
        }

        let first = if face > other_face { self.side } else { other };
        state.current_turn = Some(first);
        state.status = MatchStatus::InProgress;
        Ok(CombatEvent::InitiativeResolved {
            side: self.side,
            face,
            first,
        })
    }
}

/// Roll a die face and resolve it through the acting side's ability book.
pub(super) struct RollAbility {
    pub side: PlayerSide,
}

impl CombatTransition for RollAbility {
    fn pre_validate(&self, state: &CombatState) -> Result<(), CombatError> {
        if state.status != MatchStatus::InProgress {
            return Err(CombatError::WrongStatus {
                expected: MatchStatus::InProgress,
                actual: state.status,
            });
        }
        if state.current_turn != Some(self.side) {
            return Err(CombatError::NotPlayersTurn { side: self.side });
        }
        if state.last_attack.is_some() {
            return Err(CombatError::AttackUnresolved);
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        env: &CombatEnv<'_>,
    ) -> Result<CombatEvent, CombatError> {
        let face = roll_face(state, env, self.side, CTX_ABILITY);
        let combatant = state.combatant_mut(self.side);
        combatant.last_roll = Some(face);
        let ability = combatant.character.abilities.ability_for(face).clone();

        match ability.kind {
            AbilityKind::Defense { kind } => {
                combatant.defenses.bank(kind);
                state.current_turn = Some(self.side.opponent());
                Ok(CombatEvent::DefenseBanked {
                    side: self.side,
                    face,
                    kind,
                    ability: ability.name,
                })
            }
            AbilityKind::Attack { value } => {
                state.last_attack = Some(PendingAttack {
                    ability: ability.name.clone(),
                    value,
                    attacker: self.side,
                });
                // Defender must respond before anyone rolls again.
                state.current_turn = Some(self.side.opponent());
                Ok(CombatEvent::AttackDeclared {
                    side: self.side,
                    face,
                    ability: ability.name,
                    value,
                })
            }
        }
    }
}

/// Answer a pending attack: skip, or spend a banked defense.
pub(super) struct ResolveDefense {
    pub side: PlayerSide,
    pub choice: DefenseChoice,
}

impl CombatTransition for ResolveDefense {
    fn pre_validate(&self, state: &CombatState) -> Result<(), CombatError> {
        if state.status != MatchStatus::InProgress {
            return Err(CombatError::WrongStatus {
                expected: MatchStatus::InProgress,
                actual: state.status,
            });
        }
        let Some(pending) = &state.last_attack else {
            return Err(CombatError::NoPendingAttack);
        };
        if pending.attacker == self.side {
            return Err(CombatError::AttackerCannotDefend);
        }
        if state.current_turn != Some(self.side) {
            return Err(CombatError::NotPlayersTurn { side: self.side });
        }
        if let DefenseChoice::Spend(kind) = self.choice {
            if state.combatant(self.side).defenses.count(kind) == 0 {
                return Err(CombatError::InvalidDefense { kind });
            }
        }
        Ok(())
    }

    fn apply(
        &self,
        state: &mut CombatState,
        _env: &CombatEnv<'_>,
    ) -> Result<CombatEvent, CombatError> {
        let Some(pending) = state.last_attack.take() else {
            return Err(CombatError::NoPendingAttack);
        };
        let attacker = pending.attacker;
        let defender = self.side;

        let (resolution, damage) = match self.choice {
            DefenseChoice::Skip => {
                state.combatant_mut(defender).apply_damage(pending.value);
                state.current_turn = Some(defender);
                (DefenseResolution::Skipped, pending.value)
            }
            DefenseChoice::Spend(kind) => {
                if !state.combatant_mut(defender).defenses.spend(kind) {
                    return Err(CombatError::InvalidDefense { kind });
                }
                match kind {
                    DefenseKind::Dodge => {
                        state.current_turn = Some(defender);
                        (DefenseResolution::Dodged, 0)
                    }
                    DefenseKind::Reflect => {
                        state.combatant_mut(attacker).apply_damage(pending.value);
                        state.current_turn = Some(attacker);
                        (DefenseResolution::Reflected, pending.value)
                    }
                    DefenseKind::Block => {
                        let mitigated = pending.value.saturating_sub(BLOCK_MITIGATION);
                        state.combatant_mut(defender).apply_damage(mitigated);
                        state.current_turn = Some(attacker);
                        (DefenseResolution::Blocked, mitigated)
                    }
                }
            }
        };

        if state.combatant(defender).is_defeated() {
            state.finish(attacker);
        } else if state.combatant(attacker).is_defeated() {
            state.finish(defender);
        }

        Ok(CombatEvent::DefenseResolved {
            side: defender,
            resolution,
            damage,
            winner: state.winner_address().cloned(),
        })
    }
}
