//! Character roster backing the rules crate's lookup seam.

use std::collections::HashMap;

use arena_core::{Character, CharacterId, CharacterOracle};

/// In-memory [`CharacterOracle`] built from a fixed set of characters.
///
/// Stands in for the external character metadata service. The orchestrator
/// resolves every entrant through this before materializing a match.
pub struct RosterOracle {
    characters: HashMap<CharacterId, Character>,
}

impl RosterOracle {
    pub fn new(characters: impl IntoIterator<Item = Character>) -> Self {
        Self {
            characters: characters
                .into_iter()
                .map(|character| (character.id, character))
                .collect(),
        }
    }

    pub fn insert(&mut self, character: Character) {
        self.characters.insert(character.id, character);
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

impl CharacterOracle for RosterOracle {
    fn character(&self, id: CharacterId) -> Option<Character> {
        self.characters.get(&id).cloned()
    }
}
