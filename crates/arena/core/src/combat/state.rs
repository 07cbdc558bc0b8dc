//! In-memory combat state for one match.

use crate::character::{Character, DefenseKind, DieFace, PlayerAddress};
use crate::rng::compute_seed;

/// Lifecycle of a playable match.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum MatchStatus {
    /// Slot-level placeholder before both players are known. The runtime
    /// only materializes matches for ready slots, so records it creates
    /// start at `CharacterSelect`.
    Waiting,
    /// Both players known; initiative rolls decide who acts first.
    CharacterSelect,
    /// Turn loop is live.
    InProgress,
    /// Terminal; `winner` is set and no further commands are accepted.
    Finished,
}

/// Which of the two combatants a command refers to.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum PlayerSide {
    One,
    Two,
}

impl PlayerSide {
    pub fn opponent(&self) -> PlayerSide {
        match self {
            PlayerSide::One => PlayerSide::Two,
            PlayerSide::Two => PlayerSide::One,
        }
    }

    /// Stable numeric tag used for seed derivation.
    pub(crate) fn tag(&self) -> u32 {
        match self {
            PlayerSide::One => 1,
            PlayerSide::Two => 2,
        }
    }
}

/// Banked defense counts, accumulated by rolling defense abilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DefenseInventory {
    dodge: u8,
    block: u8,
    reflect: u8,
}

impl DefenseInventory {
    pub fn count(&self, kind: DefenseKind) -> u8 {
        match kind {
            DefenseKind::Dodge => self.dodge,
            DefenseKind::Block => self.block,
            DefenseKind::Reflect => self.reflect,
        }
    }

    pub fn bank(&mut self, kind: DefenseKind) {
        let slot = self.slot_mut(kind);
        *slot = slot.saturating_add(1);
    }

    /// Decrement the count for `kind`. Returns `false` when none is banked.
    pub fn spend(&mut self, kind: DefenseKind) -> bool {
        let slot = self.slot_mut(kind);
        if *slot == 0 {
            return false;
        }
        *slot -= 1;
        true
    }

    fn slot_mut(&mut self, kind: DefenseKind) -> &mut u8 {
        match kind {
            DefenseKind::Dodge => &mut self.dodge,
            DefenseKind::Block => &mut self.block,
            DefenseKind::Reflect => &mut self.reflect,
        }
    }
}

/// An attack awaiting the defender's response.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendingAttack {
    /// Name of the ability that was rolled.
    pub ability: String,
    /// Damage the attack carries before mitigation.
    pub value: u32,
    pub attacker: PlayerSide,
}

/// One combatant's slice of the match state.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatantState {
    pub address: PlayerAddress,
    pub character: Character,
    pub current_health: u32,
    pub defenses: DefenseInventory,
    /// The "who goes first" roll, kept until initiative resolves.
    pub initiative_roll: Option<DieFace>,
    /// Most recent in-progress roll, recorded for observers.
    pub last_roll: Option<DieFace>,
}

impl CombatantState {
    pub fn new(address: PlayerAddress, character: Character) -> Self {
        let current_health = character.base_health;
        Self {
            address,
            character,
            current_health,
            defenses: DefenseInventory::default(),
            initiative_roll: None,
            last_roll: None,
        }
    }

    pub fn is_defeated(&self) -> bool {
        self.current_health == 0
    }

    /// Apply damage with a floor of zero health.
    pub(crate) fn apply_damage(&mut self, damage: u32) {
        self.current_health = self.current_health.saturating_sub(damage);
    }
}

/// Full state of one match, owned by whoever drives the engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombatState {
    pub player1: CombatantState,
    pub player2: CombatantState,
    pub status: MatchStatus,
    /// Set once the match is in progress; `None` again when finished.
    pub current_turn: Option<PlayerSide>,
    pub winner: Option<PlayerSide>,
    pub last_attack: Option<PendingAttack>,
    /// Base seed all dice rolls derive from.
    seed: u64,
    /// Sequence number of the next random event.
    nonce: u64,
}

impl CombatState {
    /// Create a playable match for two known players.
    pub fn new(player1: CombatantState, player2: CombatantState, seed: u64) -> Self {
        Self {
            player1,
            player2,
            status: MatchStatus::CharacterSelect,
            current_turn: None,
            winner: None,
            last_attack: None,
            seed,
            nonce: 0,
        }
    }

    pub fn combatant(&self, side: PlayerSide) -> &CombatantState {
        match side {
            PlayerSide::One => &self.player1,
            PlayerSide::Two => &self.player2,
        }
    }

    pub fn combatant_mut(&mut self, side: PlayerSide) -> &mut CombatantState {
        match side {
            PlayerSide::One => &mut self.player1,
            PlayerSide::Two => &mut self.player2,
        }
    }

    /// Resolve which side an address plays on.
    pub fn side_of(&self, address: &PlayerAddress) -> Option<PlayerSide> {
        if &self.player1.address == address {
            Some(PlayerSide::One)
        } else if &self.player2.address == address {
            Some(PlayerSide::Two)
        } else {
            None
        }
    }

    pub fn winner_address(&self) -> Option<&PlayerAddress> {
        self.winner.map(|side| &self.combatant(side).address)
    }

    /// Derive the seed for the next random event and advance the sequence.
    pub(crate) fn next_seed(&mut self, actor: PlayerSide, context: u32) -> u64 {
        let seed = compute_seed(self.seed, self.nonce, actor.tag(), context);
        self.nonce += 1;
        seed
    }

    /// Mark the match terminal with `winner`.
    pub(crate) fn finish(&mut self, winner: PlayerSide) {
        self.status = MatchStatus::Finished;
        self.winner = Some(winner);
        self.current_turn = None;
        self.last_attack = None;
    }
}
