//! Worker task that owns one live match.
//!
//! Commands arrive over an mpsc channel and are applied through the combat
//! engine, which commits state all-or-nothing. After every accepted command
//! the document is persisted and an event published. The worker exits once
//! the match finishes.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use arena_core::{
    CombatCommand, CombatEngine, CombatEnv, CombatEvent, DefenseChoice, MatchStatus, PcgRng,
    PlayerAddress, SlotId,
};

use crate::api::{OrchestratorError, Result};
use crate::events::{Event, EventBus, MatchEvent};
use crate::repository::{MatchDocument, MatchRepository};
use crate::settlement::{MatchOutcome, Settlement};

use super::tournament_service::TournamentCommand;
use super::MatchRegistry;

/// Commands understood by a match worker. Players are identified by
/// address; the worker resolves their side and rejects strangers.
pub(crate) enum MatchCommand {
    Execute {
        player: PlayerAddress,
        action: MatchAction,
        reply: oneshot::Sender<Result<CombatEvent>>,
    },
    Snapshot {
        reply: oneshot::Sender<MatchDocument>,
    },
}

/// What a player wants to do, before side resolution.
pub(crate) enum MatchAction {
    RollInitiative,
    RollAbility,
    ResolveDefense(DefenseChoice),
}

/// Where a finished match reports its outcome.
pub(crate) enum FinishRoute {
    /// Nothing beyond settlement; created directly by a client.
    Standalone,
    /// The match decides a bracket slot; its winner is reported to the
    /// owning tournament worker.
    Tournament {
        slot: SlotId,
        commands: mpsc::Sender<TournamentCommand>,
    },
}

/// Background task that processes commands for one match.
pub(crate) struct MatchWorker {
    document: MatchDocument,
    matches: Arc<dyn MatchRepository>,
    settlement: Arc<dyn Settlement>,
    bus: EventBus,
    registry: MatchRegistry,
    command_rx: mpsc::Receiver<MatchCommand>,
    route: FinishRoute,
}

impl MatchWorker {
    pub fn new(
        document: MatchDocument,
        matches: Arc<dyn MatchRepository>,
        settlement: Arc<dyn Settlement>,
        bus: EventBus,
        registry: MatchRegistry,
        command_rx: mpsc::Receiver<MatchCommand>,
        route: FinishRoute,
    ) -> Self {
        Self {
            document,
            matches,
            settlement,
            bus,
            registry,
            command_rx,
            route,
        }
    }

    /// Main worker loop. Ends when the match finishes or every handle is
    /// dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.command_rx.recv().await {
            match command {
                MatchCommand::Execute {
                    player,
                    action,
                    reply,
                } => {
                    let result = self.execute(&player, action);
                    let _ = reply.send(result);
                    if self.document.combat.status == MatchStatus::Finished {
                        self.finish().await;
                        break;
                    }
                }
                MatchCommand::Snapshot { reply } => {
                    let _ = reply.send(self.document.clone());
                }
            }
        }

        self.registry.remove(self.document.id);
        tracing::debug!(
            target: "arena_runtime::workers",
            id = %self.document.id,
            "match worker stopped"
        );
    }

    fn execute(&mut self, player: &PlayerAddress, action: MatchAction) -> Result<CombatEvent> {
        let Some(side) = self.document.combat.side_of(player) else {
            tracing::debug!(
                target: "arena_runtime::workers",
                id = %self.document.id,
                %player,
                "command from an address outside the match"
            );
            return Err(OrchestratorError::UnknownPlayer {
                address: player.clone(),
            });
        };
        let command = match action {
            MatchAction::RollInitiative => CombatCommand::RollInitiative { side },
            MatchAction::RollAbility => CombatCommand::RollAbility { side },
            MatchAction::ResolveDefense(choice) => CombatCommand::ResolveDefense { side, choice },
        };

        let env = CombatEnv { rng: &PcgRng };
        let mut engine = CombatEngine::new(&mut self.document.combat);

        match engine.execute(&env, &command) {
            Ok(event) => {
                self.document.updated_at = Utc::now();
                self.matches.save(&self.document)?;
                self.bus.publish(Event::Match(MatchEvent::Updated {
                    id: self.document.id,
                    status: self.document.combat.status,
                    event: event.clone(),
                }));
                Ok(event)
            }
            Err(rejection) => {
                tracing::debug!(
                    target: "arena_runtime::workers",
                    id = %self.document.id,
                    phase = rejection.phase.as_str(),
                    error = %rejection.error,
                    "combat command rejected"
                );
                self.bus.publish(Event::Match(MatchEvent::Rejected {
                    id: self.document.id,
                    phase: rejection.phase.as_str().to_string(),
                    reason: rejection.error.to_string(),
                }));
                Err(rejection.into())
            }
        }
    }

    /// Settle, report to the owning tournament, then publish the terminal
    /// event. Runs exactly once per match.
    async fn finish(&mut self) {
        let Some(winner_side) = self.document.combat.winner else {
            return;
        };
        let winner = self.document.combat.combatant(winner_side).address.clone();

        if self.document.wagered {
            let loser = self
                .document
                .combat
                .combatant(winner_side.opponent())
                .address
                .clone();
            let outcome = MatchOutcome {
                match_id: self.document.id,
                winner: winner.clone(),
                loser,
            };
            if let Err(error) = self.settlement.settle(&outcome).await {
                tracing::error!(
                    target: "arena_runtime::workers",
                    id = %self.document.id,
                    %error,
                    "settlement failed"
                );
            }
        }

        if let FinishRoute::Tournament { slot, commands } = &self.route {
            let report = TournamentCommand::MatchFinished {
                match_id: self.document.id,
                slot: *slot,
                winner: winner.clone(),
            };
            if commands.send(report).await.is_err() {
                tracing::error!(
                    target: "arena_runtime::workers",
                    id = %self.document.id,
                    "tournament worker unavailable for finished match"
                );
            }
        }

        self.bus.publish(Event::Match(MatchEvent::Finished {
            id: self.document.id,
            winner,
        }));
    }
}
