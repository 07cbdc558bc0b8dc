//! Background tasks, internal to the crate.
//!
//! Every live match and every live tournament is owned by exactly one
//! worker task. All mutation flows through that worker's command channel,
//! so no record is ever written from two places.

mod match_service;
mod tournament_service;

pub(crate) use match_service::{FinishRoute, MatchAction, MatchCommand, MatchWorker};
pub(crate) use tournament_service::{TournamentCommand, TournamentWorker};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use tokio::sync::mpsc;

use arena_core::{
    CharacterId, CharacterOracle, CombatState, CombatantState, PlayerAddress, compute_seed,
};

use crate::api::{OrchestratorError, Result};
use crate::events::EventBus;
use crate::repository::{
    MatchDocument, MatchId, MatchRepository, TournamentLink, TournamentRepository,
};
use crate::settlement::Settlement;

// Seed-derivation contexts, one per record kind.
pub(crate) const SEED_CTX_MATCH: u32 = 0;
pub(crate) const SEED_CTX_BRACKET: u32 = 1;

/// Live command channels of running match workers.
///
/// No panic can occur while the lock is held, so a poisoned guard still
/// protects a consistent map and is recovered rather than propagated.
#[derive(Clone, Default)]
pub(crate) struct MatchRegistry {
    inner: Arc<RwLock<HashMap<MatchId, mpsc::Sender<MatchCommand>>>>,
}

impl MatchRegistry {
    pub fn insert(&self, id: MatchId, commands: mpsc::Sender<MatchCommand>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, commands);
    }

    pub fn get(&self, id: MatchId) -> Option<mpsc::Sender<MatchCommand>> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn remove(&self, id: MatchId) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

/// Everything a worker needs to spawn and serve further workers.
#[derive(Clone)]
pub(crate) struct WorkerContext {
    pub matches: Arc<dyn MatchRepository>,
    pub tournaments: Arc<dyn TournamentRepository>,
    pub roster: Arc<dyn CharacterOracle>,
    pub settlement: Arc<dyn Settlement>,
    pub bus: EventBus,
    pub registry: MatchRegistry,
    pub next_id: Arc<AtomicU64>,
    pub base_seed: u64,
    pub command_buffer: usize,
}

impl WorkerContext {
    /// Allocate the next record id, starting from 1.
    pub fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Materialize a match: resolve both characters, persist the document,
    /// spawn the worker, and register its command channel.
    pub fn spawn_match(
        &self,
        players: [(PlayerAddress, CharacterId); 2],
        wagered: bool,
        link: Option<TournamentLink>,
        route: FinishRoute,
    ) -> Result<(MatchId, mpsc::Sender<MatchCommand>)> {
        let id = MatchId(self.allocate_id());
        let [player1, player2] = players;

        let character1 = self
            .roster
            .character(player1.1)
            .ok_or(OrchestratorError::UnknownCharacter { id: player1.1 })?;
        let character2 = self
            .roster
            .character(player2.1)
            .ok_or(OrchestratorError::UnknownCharacter { id: player2.1 })?;

        let seed = compute_seed(self.base_seed, id.0, 0, SEED_CTX_MATCH);
        let combat = CombatState::new(
            CombatantState::new(player1.0, character1),
            CombatantState::new(player2.0, character2),
            seed,
        );
        let document = MatchDocument::new(id, combat, wagered, link, Utc::now());
        self.matches.save(&document)?;

        let (command_tx, command_rx) = mpsc::channel(self.command_buffer);
        let worker = MatchWorker::new(
            document,
            self.matches.clone(),
            self.settlement.clone(),
            self.bus.clone(),
            self.registry.clone(),
            command_rx,
            route,
        );
        tokio::spawn(worker.run());
        self.registry.insert(id, command_tx.clone());

        tracing::info!(
            target: "arena_runtime::workers",
            %id,
            wagered,
            linked = link.is_some(),
            "match worker started"
        );

        Ok((id, command_tx))
    }
}
