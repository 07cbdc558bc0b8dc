//! In-memory repositories for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use super::error::{RepositoryError, Result};
use super::traits::{MatchRepository, TournamentRepository};
use super::types::{MatchDocument, MatchId, TournamentDocument, TournamentId};

/// In-memory implementation of [`MatchRepository`].
#[derive(Default)]
pub struct InMemoryMatchRepo {
    documents: RwLock<HashMap<MatchId, MatchDocument>>,
}

impl InMemoryMatchRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MatchRepository for InMemoryMatchRepo {
    fn save(&self, document: &MatchDocument) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        documents.insert(document.id, document.clone());
        Ok(())
    }

    fn load(&self, id: MatchId) -> Result<Option<MatchDocument>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(documents.get(&id).cloned())
    }

    fn delete(&self, id: MatchId) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        documents.remove(&id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<MatchId>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<MatchId> = documents.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

/// In-memory implementation of [`TournamentRepository`].
#[derive(Default)]
pub struct InMemoryTournamentRepo {
    documents: RwLock<HashMap<TournamentId, TournamentDocument>>,
}

impl InMemoryTournamentRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TournamentRepository for InMemoryTournamentRepo {
    fn save(&self, document: &TournamentDocument) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        documents.insert(document.id, document.clone());
        Ok(())
    }

    fn load(&self, id: TournamentId) -> Result<Option<TournamentDocument>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(documents.get(&id).cloned())
    }

    fn delete(&self, id: TournamentId) -> Result<()> {
        let mut documents = self
            .documents
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        documents.remove(&id);
        Ok(())
    }

    fn list_ids(&self) -> Result<Vec<TournamentId>> {
        let documents = self
            .documents
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut ids: Vec<TournamentId> = documents.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use arena_core::{
        Ability, AbilityBook, Character, CharacterId, CombatState, CombatantState, DefenseKind,
        PlayerAddress,
    };

    use super::*;

    fn sample_match(id: u64) -> MatchDocument {
        let character = Character::new(
            CharacterId(1),
            "brawler",
            100,
            AbilityBook::new(vec![
                Ability::attack("jab", 10),
                Ability::attack("cross", 20),
                Ability::attack("hook", 30),
                Ability::attack("uppercut", 40),
                Ability::defense("slip", DefenseKind::Dodge),
                Ability::defense("guard", DefenseKind::Block),
            ])
            .unwrap(),
        );
        let combat = CombatState::new(
            CombatantState::new(PlayerAddress::from("0xaaa"), character.clone()),
            CombatantState::new(PlayerAddress::from("0xbbb"), character),
            7,
        );
        MatchDocument::new(MatchId(id), combat, false, None, Utc::now())
    }

    #[test]
    fn save_then_load_round_trips() {
        let repo = InMemoryMatchRepo::new();
        let document = sample_match(1);
        repo.save(&document).unwrap();
        assert_eq!(repo.load(MatchId(1)).unwrap(), Some(document));
        assert_eq!(repo.load(MatchId(2)).unwrap(), None);
    }

    #[test]
    fn save_overwrites_existing_document() {
        let repo = InMemoryMatchRepo::new();
        let mut document = sample_match(3);
        repo.save(&document).unwrap();
        document.wagered = true;
        repo.save(&document).unwrap();
        assert!(repo.load(MatchId(3)).unwrap().unwrap().wagered);
        assert_eq!(repo.list_ids().unwrap(), vec![MatchId(3)]);
    }

    #[test]
    fn delete_removes_the_document() {
        let repo = InMemoryMatchRepo::new();
        repo.save(&sample_match(5)).unwrap();

        repo.delete(MatchId(5)).unwrap();
        assert_eq!(repo.load(MatchId(5)).unwrap(), None);
        assert!(repo.list_ids().unwrap().is_empty());

        // Absent ids delete without error
        repo.delete(MatchId(5)).unwrap();
    }
}
