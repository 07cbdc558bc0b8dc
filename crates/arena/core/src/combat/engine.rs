//! Command dispatch for combat.
//!
//! [`CombatEngine`] is the authoritative reducer for [`CombatState`]. It
//! routes commands through the transition pipeline and commits the new state
//! only when the whole pipeline succeeds, so every command is all-or-nothing
//! against the input snapshot.

use super::state::{CombatState, PlayerSide};
use super::transition::{
    CombatEnv, CombatEvent, CombatTransition, DefenseChoice, ResolveDefense, RollAbility,
    RollInitiative, TransitionPhase, TransitionPhaseError,
};

/// Player intents the engine understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CombatCommand {
    RollInitiative { side: PlayerSide },
    RollAbility { side: PlayerSide },
    ResolveDefense { side: PlayerSide, choice: DefenseChoice },
}

/// Combat engine over a mutable match state.
pub struct CombatEngine<'a> {
    state: &'a mut CombatState,
}

impl<'a> CombatEngine<'a> {
    pub fn new(state: &'a mut CombatState) -> Self {
        Self { state }
    }

    /// Executes a command by driving it through `pre_validate → apply →
    /// post_validate`. On success the state is committed and the observable
    /// [`CombatEvent`] returned; on failure the state is left untouched.
    pub fn execute(
        &mut self,
        env: &CombatEnv<'_>,
        command: &CombatCommand,
    ) -> Result<CombatEvent, TransitionPhaseError> {
        match *command {
            CombatCommand::RollInitiative { side } => {
                self.drive(&RollInitiative { side }, env)
            }
            CombatCommand::RollAbility { side } => self.drive(&RollAbility { side }, env),
            CombatCommand::ResolveDefense { side, choice } => {
                self.drive(&ResolveDefense { side, choice }, env)
            }
        }
    }

    fn drive<T: CombatTransition>(
        &mut self,
        transition: &T,
        env: &CombatEnv<'_>,
    ) -> Result<CombatEvent, TransitionPhaseError> {
        transition
            .pre_validate(self.state)
            .map_err(|error| TransitionPhaseError::new(TransitionPhase::PreValidate, error))?;

        // Apply against a working copy; commit only on success.
        let mut working = self.state.clone();
        let event = transition
            .apply(&mut working, env)
            .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

        transition
            .post_validate(&working)
            .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

        *self.state = working;
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::character::{
        Ability, AbilityBook, Character, CharacterId, DefenseKind, PlayerAddress,
    };
    use crate::combat::error::CombatError;
    use crate::combat::state::{CombatantState, DefenseInventory, MatchStatus};
    use crate::rng::RngOracle;

    use super::super::transition::DefenseResolution;
    use super::*;

    /// Returns scripted faces in order, ignoring seeds.
    struct ScriptedRng {
        rolls: Mutex<VecDeque<u32>>,
    }

    impl ScriptedRng {
        fn faces(faces: &[u32]) -> Self {
            // roll_die computes (next % 6) + 1, so store face - 1
            Self {
                rolls: Mutex::new(faces.iter().map(|f| f - 1).collect()),
            }
        }
    }

    impl RngOracle for ScriptedRng {
        fn next_u32(&self, _seed: u64) -> u32 {
            self.rolls
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    fn fighter(id: u32) -> Character {
        Character::new(
            CharacterId(id),
            format!("fighter-{id}"),
            100,
            AbilityBook::new(vec![
                Ability::attack("jab", 10),
                Ability::attack("cross", 20),
                Ability::attack("haymaker", 40),
                Ability::defense("slip", DefenseKind::Dodge),
                Ability::defense("guard", DefenseKind::Block),
                Ability::defense("counter", DefenseKind::Reflect),
            ])
            .unwrap(),
        )
    }

    fn fresh_match() -> CombatState {
        CombatState::new(
            CombatantState::new(PlayerAddress::from("0xaaa"), fighter(1)),
            CombatantState::new(PlayerAddress::from("0xbbb"), fighter(2)),
            7,
        )
    }

    /// Initiative resolved, player one to act.
    fn started_match() -> CombatState {
        let mut state = fresh_match();
        let rng = ScriptedRng::faces(&[5, 2]);
        let env = CombatEnv { rng: &rng };
        let mut engine = CombatEngine::new(&mut state);
        engine
            .execute(&env, &CombatCommand::RollInitiative { side: PlayerSide::One })
            .unwrap();
        engine
            .execute(&env, &CombatCommand::RollInitiative { side: PlayerSide::Two })
            .unwrap();
        assert_eq!(state.status, MatchStatus::InProgress);
        assert_eq!(state.current_turn, Some(PlayerSide::One));
        state
    }

    fn exec(state: &mut CombatState, faces: &[u32], command: CombatCommand) -> CombatEvent {
        let rng = ScriptedRng::faces(faces);
        let env = CombatEnv { rng: &rng };
        CombatEngine::new(state).execute(&env, &command).unwrap()
    }

    fn exec_err(state: &mut CombatState, command: CombatCommand) -> CombatError {
        let rng = ScriptedRng::faces(&[1]);
        let env = CombatEnv { rng: &rng };
        CombatEngine::new(state)
            .execute(&env, &command)
            .unwrap_err()
            .error
    }

    #[test]
    fn higher_initiative_roll_goes_first() {
        let mut state = fresh_match();
        let event = exec(
            &mut state,
            &[3],
            CombatCommand::RollInitiative { side: PlayerSide::Two },
        );
        assert!(matches!(event, CombatEvent::InitiativeRolled { .. }));
        assert_eq!(state.status, MatchStatus::CharacterSelect);

        let event = exec(
            &mut state,
            &[6],
            CombatCommand::RollInitiative { side: PlayerSide::One },
        );
        assert!(matches!(
            event,
            CombatEvent::InitiativeResolved { first: PlayerSide::One, .. }
        ));
        assert_eq!(state.status, MatchStatus::InProgress);
        assert_eq!(state.current_turn, Some(PlayerSide::One));
    }

    #[test]
    fn initiative_tie_clears_both_rolls() {
        let mut state = fresh_match();
        exec(&mut state, &[4], CombatCommand::RollInitiative { side: PlayerSide::One });
        let event = exec(
            &mut state,
            &[4],
            CombatCommand::RollInitiative { side: PlayerSide::Two },
        );
        assert!(matches!(event, CombatEvent::InitiativeTied { .. }));
        assert_eq!(state.status, MatchStatus::CharacterSelect);
        assert!(state.player1.initiative_roll.is_none());
        assert!(state.player2.initiative_roll.is_none());
    }

    #[test]
    fn double_initiative_roll_is_rejected() {
        let mut state = fresh_match();
        exec(&mut state, &[4], CombatCommand::RollInitiative { side: PlayerSide::One });
        let err = exec_err(&mut state, CombatCommand::RollInitiative { side: PlayerSide::One });
        assert_eq!(err, CombatError::AlreadyRolled { side: PlayerSide::One });
    }

    #[test]
    fn defense_roll_is_banked_and_passes_turn() {
        let mut state = started_match();
        // Face 4 is slip (dodge)
        let event = exec(&mut state, &[4], CombatCommand::RollAbility { side: PlayerSide::One });
        assert!(matches!(
            event,
            CombatEvent::DefenseBanked { kind: DefenseKind::Dodge, .. }
        ));
        assert_eq!(state.player1.defenses.count(DefenseKind::Dodge), 1);
        assert_eq!(state.current_turn, Some(PlayerSide::Two));
        assert!(state.last_attack.is_none());
    }

    #[test]
    fn attack_roll_awaits_defender_response() {
        let mut state = started_match();
        // Face 3 is haymaker (40)
        let event = exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        assert!(matches!(event, CombatEvent::AttackDeclared { value: 40, .. }));
        let pending = state.last_attack.as_ref().unwrap();
        assert_eq!(pending.attacker, PlayerSide::One);
        assert_eq!(state.current_turn, Some(PlayerSide::Two));

        // Defender cannot roll while the attack is unresolved
        let err = exec_err(&mut state, CombatCommand::RollAbility { side: PlayerSide::Two });
        assert_eq!(err, CombatError::AttackUnresolved);
    }

    #[test]
    fn skipping_defense_applies_full_damage_and_returns_turn() {
        let mut state = started_match();
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        let event = exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Skip,
            },
        );
        assert!(matches!(
            event,
            CombatEvent::DefenseResolved { resolution: DefenseResolution::Skipped, damage: 40, .. }
        ));
        assert_eq!(state.player2.current_health, 60);
        assert_eq!(state.current_turn, Some(PlayerSide::Two));
        assert!(state.last_attack.is_none());
    }

    #[test]
    fn dodge_negates_damage_and_keeps_defender_turn() {
        let mut state = started_match();
        // P1 banks nothing; P2 banks a dodge first
        exec(&mut state, &[1], CombatCommand::RollAbility { side: PlayerSide::One });
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense { side: PlayerSide::Two, choice: DefenseChoice::Skip },
        );
        exec(&mut state, &[4], CombatCommand::RollAbility { side: PlayerSide::Two });
        assert_eq!(state.player2.defenses.count(DefenseKind::Dodge), 1);

        // P1 attacks for 40, P2 dodges
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        let health_before = state.player2.current_health;
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Dodge),
            },
        );
        assert_eq!(state.player2.current_health, health_before);
        assert_eq!(state.player2.defenses.count(DefenseKind::Dodge), 0);
        assert_eq!(state.current_turn, Some(PlayerSide::Two));
    }

    #[test]
    fn block_mitigates_twenty_five_and_floors_at_zero() {
        let mut inventory = DefenseInventory::default();
        inventory.bank(DefenseKind::Block);
        inventory.bank(DefenseKind::Block);

        let mut state = started_match();
        state.player2.defenses = inventory;

        // 40-damage attack blocked: 15 lands, turn back to attacker
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        let event = exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Block),
            },
        );
        assert!(matches!(
            event,
            CombatEvent::DefenseResolved { resolution: DefenseResolution::Blocked, damage: 15, .. }
        ));
        assert_eq!(state.player2.current_health, 85);
        assert_eq!(state.current_turn, Some(PlayerSide::One));

        // 10-damage attack blocked entirely
        exec(&mut state, &[1], CombatCommand::RollAbility { side: PlayerSide::One });
        let event = exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Block),
            },
        );
        assert!(matches!(
            event,
            CombatEvent::DefenseResolved { resolution: DefenseResolution::Blocked, damage: 0, .. }
        ));
        assert_eq!(state.player2.current_health, 85);
    }

    #[test]
    fn reflect_redirects_damage_to_attacker() {
        let mut state = started_match();
        state.player2.defenses.bank(DefenseKind::Reflect);

        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Reflect),
            },
        );
        assert_eq!(state.player1.current_health, 60);
        assert_eq!(state.player2.current_health, 100);
        assert_eq!(state.current_turn, Some(PlayerSide::One));
    }

    #[test]
    fn spending_a_depleted_defense_is_rejected_without_mutation() {
        let mut state = started_match();
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });

        let before = state.clone();
        let err = exec_err(
            &mut state,
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Block),
            },
        );
        assert_eq!(err, CombatError::InvalidDefense { kind: DefenseKind::Block });
        assert_eq!(state, before);
    }

    #[test]
    fn attacker_cannot_resolve_its_own_attack() {
        let mut state = started_match();
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        let err = exec_err(
            &mut state,
            CombatCommand::ResolveDefense { side: PlayerSide::One, choice: DefenseChoice::Skip },
        );
        assert_eq!(err, CombatError::AttackerCannotDefend);
    }

    #[test]
    fn acting_out_of_turn_is_rejected() {
        let mut state = started_match();
        let before = state.clone();
        let err = exec_err(&mut state, CombatCommand::RollAbility { side: PlayerSide::Two });
        assert_eq!(err, CombatError::NotPlayersTurn { side: PlayerSide::Two });
        assert_eq!(state, before);
    }

    #[test]
    fn lethal_damage_finishes_the_match() {
        let mut state = started_match();
        state.player2.current_health = 30;

        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        let event = exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense { side: PlayerSide::Two, choice: DefenseChoice::Skip },
        );

        assert_eq!(state.status, MatchStatus::Finished);
        assert_eq!(state.winner, Some(PlayerSide::One));
        assert_eq!(state.player2.current_health, 0);
        assert_eq!(state.current_turn, None);
        match event {
            CombatEvent::DefenseResolved { winner: Some(address), .. } => {
                assert_eq!(address, PlayerAddress::from("0xaaa"));
            }
            other => panic!("unexpected event {other:?}"),
        }

        // No further commands accepted
        let err = exec_err(&mut state, CombatCommand::RollAbility { side: PlayerSide::One });
        assert_eq!(
            err,
            CombatError::WrongStatus {
                expected: MatchStatus::InProgress,
                actual: MatchStatus::Finished,
            }
        );
    }

    #[test]
    fn reflected_lethal_damage_defeats_the_attacker() {
        let mut state = started_match();
        state.player1.current_health = 40;
        state.player2.defenses.bank(DefenseKind::Reflect);

        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Reflect),
            },
        );

        assert_eq!(state.status, MatchStatus::Finished);
        assert_eq!(state.winner, Some(PlayerSide::Two));
        assert_eq!(state.player1.current_health, 0);
    }

    #[test]
    fn banked_dodge_scenario_from_end_to_end() {
        // Defender banks a dodge on an earlier turn, attacker lands a 40
        // attack, defender dodges: health unchanged, count back to zero,
        // turn stays with the defender.
        let mut state = started_match();
        exec(&mut state, &[2], CombatCommand::RollAbility { side: PlayerSide::One });
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense { side: PlayerSide::Two, choice: DefenseChoice::Skip },
        );
        // P2 holds the turn after skipping; rolls face 4 → dodge banked
        exec(&mut state, &[4], CombatCommand::RollAbility { side: PlayerSide::Two });
        exec(&mut state, &[3], CombatCommand::RollAbility { side: PlayerSide::One });
        exec(
            &mut state,
            &[],
            CombatCommand::ResolveDefense {
                side: PlayerSide::Two,
                choice: DefenseChoice::Spend(DefenseKind::Dodge),
            },
        );
        assert_eq!(state.player2.current_health, 80); // only the skipped 20 landed
        assert_eq!(state.player2.defenses.count(DefenseKind::Dodge), 0);
        assert_eq!(state.current_turn, Some(PlayerSide::Two));
    }
}
