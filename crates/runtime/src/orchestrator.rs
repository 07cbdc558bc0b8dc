//! High-level orchestrator and builder.
//!
//! The orchestrator is the single entry point: it creates matches and
//! tournaments, spawning one worker task per record, and hands out
//! cloneable handles. It owns no mutable state itself beyond the id
//! counter and the registry of live match channels.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use tokio::sync::{broadcast, mpsc};

use arena_core::{Bracket, CharacterOracle, Entrant, PcgRng, compute_seed};

use crate::api::{MatchHandle, OrchestratorError, Result, TournamentHandle};
use crate::events::{Event, EventBus, Topic};
use crate::repository::{
    InMemoryMatchRepo, InMemoryTournamentRepo, MatchId, MatchRepository, TournamentConfig,
    TournamentDocument, TournamentId, TournamentRepository,
};
use crate::settlement::{LoggingSettlement, Settlement};
use crate::workers::{FinishRoute, MatchRegistry, SEED_CTX_BRACKET, TournamentWorker, WorkerContext};

/// Orchestrator configuration shared across workers.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub event_capacity: usize,
    pub command_buffer: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            event_capacity: 100,
            command_buffer: 32,
        }
    }
}

/// Entry point for creating and observing matches and tournaments.
pub struct Orchestrator {
    ctx: WorkerContext,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    /// Create a standalone match between two entrants and start its worker.
    ///
    /// Wagered matches report their outcome through the settlement callback
    /// when they finish.
    pub fn create_match(
        &self,
        player1: Entrant,
        player2: Entrant,
        wagered: bool,
    ) -> Result<MatchHandle> {
        let (id, commands) = self.ctx.spawn_match(
            [
                (player1.address, player1.character_id),
                (player2.address, player2.character_id),
            ],
            wagered,
            None,
            FinishRoute::Standalone,
        )?;
        Ok(MatchHandle::new(id, commands, self.ctx.bus.clone()))
    }

    /// Seed a bracket from the entrants and start its tournament worker.
    ///
    /// The worker materializes matches for the opening round immediately.
    /// An entrant count that does not match the configured size is accepted
    /// with partially filled slots.
    pub fn create_tournament(
        &self,
        entrants: Vec<Entrant>,
        config: TournamentConfig,
    ) -> Result<TournamentHandle> {
        if entrants.len() != config.size.entrants() as usize {
            tracing::warn!(
                target: "arena_runtime::orchestrator",
                expected = config.size.entrants(),
                found = entrants.len(),
                "entrant count does not match bracket size"
            );
        }

        // Every entrant's character must resolve before any slot is seeded,
        // otherwise an unknown id would only surface when its match spawns
        for entrant in &entrants {
            self.ctx
                .roster
                .character(entrant.character_id)
                .ok_or(OrchestratorError::UnknownCharacter {
                    id: entrant.character_id,
                })?;
        }

        let id = TournamentId(self.ctx.allocate_id());
        let seed = compute_seed(self.ctx.base_seed, id.0, 0, SEED_CTX_BRACKET);
        let bracket = Bracket::generate(entrants, config.size, &PcgRng, seed);

        let now = chrono::Utc::now();
        let document = TournamentDocument {
            id,
            config,
            bracket,
            created_at: now,
            updated_at: now,
        };
        self.ctx.tournaments.save(&document)?;

        let (command_tx, command_rx) = mpsc::channel(self.ctx.command_buffer);
        let worker =
            TournamentWorker::new(document, self.ctx.clone(), command_rx, command_tx.clone());
        tokio::spawn(worker.run());

        tracing::info!(
            target: "arena_runtime::orchestrator",
            %id,
            size = config.size.entrants(),
            winners = config.number_of_winners,
            "tournament worker started"
        );

        Ok(TournamentHandle::new(
            id,
            command_tx,
            self.ctx.bus.clone(),
            self.ctx.tournaments.clone(),
        ))
    }

    /// Handle to a live match, tournament-spawned ones included. Returns
    /// `None` once the match has finished.
    pub fn match_handle(&self, id: MatchId) -> Option<MatchHandle> {
        let commands = self.ctx.registry.get(id)?;
        Some(MatchHandle::new(id, commands, self.ctx.bus.clone()))
    }

    /// Subscribe to a topic without going through a handle.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.ctx.bus.subscribe(topic)
    }

    /// The shared event bus, for advanced usage.
    pub fn event_bus(&self) -> &EventBus {
        &self.ctx.bus
    }
}

/// Builder for [`Orchestrator`] with flexible configuration.
pub struct OrchestratorBuilder {
    config: OrchestratorConfig,
    roster: Option<Arc<dyn CharacterOracle>>,
    matches: Option<Arc<dyn MatchRepository>>,
    tournaments: Option<Arc<dyn TournamentRepository>>,
    settlement: Option<Arc<dyn Settlement>>,
    seed: Option<u64>,
}

impl OrchestratorBuilder {
    fn new() -> Self {
        Self {
            config: OrchestratorConfig::default(),
            roster: None,
            matches: None,
            tournaments: None,
            settlement: None,
            seed: None,
        }
    }

    /// Override orchestrator configuration.
    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the required character roster.
    pub fn characters(mut self, roster: impl CharacterOracle + 'static) -> Self {
        self.roster = Some(Arc::new(roster));
        self
    }

    /// Override the match repository (defaults to in-memory).
    pub fn match_repository(mut self, repository: impl MatchRepository + 'static) -> Self {
        self.matches = Some(Arc::new(repository));
        self
    }

    /// Override the tournament repository (defaults to in-memory).
    pub fn tournament_repository(
        mut self,
        repository: impl TournamentRepository + 'static,
    ) -> Self {
        self.tournaments = Some(Arc::new(repository));
        self
    }

    /// Override the settlement callback (defaults to logging only).
    pub fn settlement(mut self, settlement: impl Settlement + 'static) -> Self {
        self.settlement = Some(Arc::new(settlement));
        self
    }

    /// Fix the base seed. Every die roll and bracket seeding derives from
    /// it, so a fixed seed makes whole runs replayable. Defaults to a
    /// random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator> {
        let roster = self.roster.ok_or(OrchestratorError::MissingRoster)?;
        let base_seed = self.seed.unwrap_or_else(rand::random);

        let ctx = WorkerContext {
            matches: self.matches.unwrap_or_else(|| Arc::new(InMemoryMatchRepo::new())),
            tournaments: self
                .tournaments
                .unwrap_or_else(|| Arc::new(InMemoryTournamentRepo::new())),
            roster,
            settlement: self
                .settlement
                .unwrap_or_else(|| Arc::new(LoggingSettlement)),
            bus: EventBus::with_capacity(self.config.event_capacity),
            registry: MatchRegistry::default(),
            next_id: Arc::new(AtomicU64::new(0)),
            base_seed,
            command_buffer: self.config.command_buffer,
        };

        Ok(Orchestrator { ctx })
    }
}
