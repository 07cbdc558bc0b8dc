//! Character definitions and the die-face to ability mapping.
//!
//! A character exposes exactly one ability per die face. The mapping is an
//! explicit, validated structure ([`AbilityBook`]) so combat code never
//! indexes an array with an unchecked integer.

use std::fmt;

use thiserror::Error;

/// Opaque player identifier (a wallet address upstream).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerAddress(String);

impl PlayerAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerAddress {
    fn from(address: &str) -> Self {
        Self::new(address)
    }
}

/// Identifier used to look characters up through [`CharacterOracle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterId(pub u32);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "character-{}", self.0)
    }
}

/// Handle to the external character asset (NFT reference upstream). Opaque
/// to the rules; carried through bracket slots for collaborators.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharacterRef(String);

impl CharacterRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Errors raised while validating character definitions.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterError {
    #[error("a character exposes exactly {expected} abilities, got {found}")]
    WrongAbilityCount { expected: usize, found: usize },

    #[error("die face must be between 1 and 6, got {0}")]
    InvalidDieFace(u8),
}

/// One face of a six-sided die, validated at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DieFace(u8);

impl DieFace {
    pub const SIDES: u8 = 6;

    pub fn new(face: u8) -> Result<Self, CharacterError> {
        if (1..=Self::SIDES).contains(&face) {
            Ok(Self(face))
        } else {
            Err(CharacterError::InvalidDieFace(face))
        }
    }

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Wrap an oracle d6 roll (1..=6) into a face without a fallible path.
    pub(crate) fn from_d6(roll: u32) -> Self {
        Self(((roll.saturating_sub(1) % Self::SIDES as u32) + 1) as u8)
    }

    /// Zero-based slot index into an [`AbilityBook`].
    pub(crate) fn slot(&self) -> usize {
        self.0 as usize - 1
    }
}

impl fmt::Display for DieFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three defense resolutions a banked defense ability can produce.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DefenseKind {
    /// Negates the incoming damage entirely; defender keeps the turn.
    Dodge,
    /// Fixed 25-point mitigation; turn passes back to the attacker.
    Block,
    /// Redirects the incoming damage to the attacker.
    Reflect,
}

/// What an ability does when its face is rolled.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AbilityKind {
    /// Deals `value` damage, pending the defender's response.
    Attack { value: u32 },
    /// Banked into the roller's defense inventory for later use.
    Defense { kind: DefenseKind },
}

/// A single entry of a character's ability book.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub name: String,
    pub kind: AbilityKind,
}

impl Ability {
    pub fn attack(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            kind: AbilityKind::Attack { value },
        }
    }

    pub fn defense(name: impl Into<String>, kind: DefenseKind) -> Self {
        Self {
            name: name.into(),
            kind: AbilityKind::Defense { kind },
        }
    }
}

/// Explicit die-face to ability mapping, exactly one ability per face.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityBook {
    slots: [Ability; DieFace::SIDES as usize],
}

impl AbilityBook {
    /// Build a book from an ordered ability list, face 1 first.
    pub fn new(abilities: Vec<Ability>) -> Result<Self, CharacterError> {
        let slots: [Ability; DieFace::SIDES as usize] =
            abilities
                .try_into()
                .map_err(|rest: Vec<Ability>| CharacterError::WrongAbilityCount {
                    expected: DieFace::SIDES as usize,
                    found: rest.len(),
                })?;
        Ok(Self { slots })
    }

    pub fn ability_for(&self, face: DieFace) -> &Ability {
        &self.slots[face.slot()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Ability> {
        self.slots.iter()
    }
}

/// A playable character: identity, base health, and its ability book.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    pub base_health: u32,
    pub abilities: AbilityBook,
}

impl Character {
    pub fn new(
        id: CharacterId,
        name: impl Into<String>,
        base_health: u32,
        abilities: AbilityBook,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            base_health,
            abilities,
        }
    }
}

/// Lookup of character definitions by id.
///
/// Stands in for the external character/NFT metadata service; the runtime
/// provides an in-memory roster implementation.
pub trait CharacterOracle: Send + Sync {
    fn character(&self, id: CharacterId) -> Option<Character>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn six_attacks() -> Vec<Ability> {
        (1..=6).map(|i| Ability::attack(format!("strike-{i}"), 10 * i)).collect()
    }

    #[test]
    fn ability_book_requires_six_entries() {
        let err = AbilityBook::new(six_attacks()[..4].to_vec()).unwrap_err();
        assert_eq!(
            err,
            CharacterError::WrongAbilityCount {
                expected: 6,
                found: 4
            }
        );
        assert!(AbilityBook::new(six_attacks()).is_ok());
    }

    #[test]
    fn die_face_validates_bounds() {
        assert!(DieFace::new(0).is_err());
        assert!(DieFace::new(7).is_err());
        for face in 1..=6 {
            assert_eq!(DieFace::new(face).unwrap().value(), face);
        }
    }

    #[test]
    fn faces_map_to_ordered_slots() {
        let book = AbilityBook::new(six_attacks()).unwrap();
        let third = book.ability_for(DieFace::new(3).unwrap());
        assert_eq!(third.name, "strike-3");
        assert_eq!(third.kind, AbilityKind::Attack { value: 30 });
    }

    #[test]
    fn defense_kind_round_trips_through_strings() {
        use std::str::FromStr;
        assert_eq!(DefenseKind::Dodge.to_string(), "dodge");
        assert_eq!(DefenseKind::from_str("reflect").unwrap(), DefenseKind::Reflect);
    }
}
