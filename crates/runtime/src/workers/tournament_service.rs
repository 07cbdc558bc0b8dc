//! Worker task that owns one live tournament.
//!
//! The worker holds the authoritative bracket. Match workers report their
//! winners here; each report advances the bracket, routes semifinal losers
//! when a third-place decider is configured, and materializes matches for
//! every slot that just became ready. The worker exits once the bracket is
//! complete.

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};

use arena_core::{MatchRef, PlayerAddress, Round, SlotId, Timestamp};

use crate::api::{OrchestratorError, Result};
use crate::events::{Event, TournamentEvent};
use crate::repository::{MatchId, TournamentDocument, TournamentLink};

use super::match_service::FinishRoute;
use super::WorkerContext;

/// Commands understood by a tournament worker.
pub(crate) enum TournamentCommand {
    /// A linked match finished; advance its winner.
    MatchFinished {
        match_id: MatchId,
        slot: SlotId,
        winner: PlayerAddress,
    },
    Snapshot {
        reply: oneshot::Sender<TournamentDocument>,
    },
}

/// Background task that processes commands for one tournament.
pub(crate) struct TournamentWorker {
    document: TournamentDocument,
    ctx: WorkerContext,
    command_rx: mpsc::Receiver<TournamentCommand>,
    /// Handed to every spawned match worker so it can report back.
    command_tx: mpsc::Sender<TournamentCommand>,
}

impl TournamentWorker {
    pub fn new(
        document: TournamentDocument,
        ctx: WorkerContext,
        command_rx: mpsc::Receiver<TournamentCommand>,
        command_tx: mpsc::Sender<TournamentCommand>,
    ) -> Self {
        Self {
            document,
            ctx,
            command_rx,
            command_tx,
        }
    }

    /// Main worker loop.
    pub async fn run(mut self) {
        // The seeded first round is materialized before any command
        if let Err(error) = self.materialize().and_then(|_| self.persist()) {
            tracing::error!(
                target: "arena_runtime::workers",
                id = %self.document.id,
                %error,
                "failed to materialize opening round"
            );
        }

        while let Some(command) = self.command_rx.recv().await {
            match command {
                TournamentCommand::MatchFinished {
                    match_id,
                    slot,
                    winner,
                } => {
                    if let Err(error) = self.advance(match_id, slot, &winner) {
                        tracing::error!(
                            target: "arena_runtime::workers",
                            id = %self.document.id,
                            %match_id,
                            %slot,
                            %error,
                            "failed to advance bracket"
                        );
                        continue;
                    }
                    if self.document.bracket.is_complete() {
                        self.complete();
                        break;
                    }
                }
                TournamentCommand::Snapshot { reply } => {
                    let _ = reply.send(self.document.clone());
                }
            }
        }

        tracing::debug!(
            target: "arena_runtime::workers",
            id = %self.document.id,
            "tournament worker stopped"
        );
    }

    fn advance(&mut self, match_id: MatchId, slot: SlotId, winner: &PlayerAddress) -> Result<()> {
        // A reported winner must actually occupy the slot it decides
        if let Some(decided) = self.document.bracket.slot(slot)
            && !decided.has_player(winner)
        {
            return Err(OrchestratorError::WinnerMismatch {
                slot,
                winner: winner.clone(),
            });
        }

        let now = Timestamp(Utc::now().timestamp_millis() as u64);
        let mut bracket = self.document.bracket.progress_winner(slot, winner, now)?;

        // Semifinal losers feed the third-place decider when four ranked
        // places are paid out.
        let decided_round = bracket.slot(slot).map(|s| s.round);
        if decided_round == Some(Round::Semifinals) && self.document.config.number_of_winners >= 4 {
            bracket = bracket.assign_semifinal_loser(slot)?;
        }
        self.document.bracket = bracket;

        tracing::info!(
            target: "arena_runtime::workers",
            id = %self.document.id,
            %match_id,
            %slot,
            %winner,
            "bracket slot decided"
        );
        self.ctx
            .bus
            .publish(Event::Tournament(TournamentEvent::BracketUpdated {
                id: self.document.id,
                slot,
                winner: winner.clone(),
            }));

        self.materialize()?;
        self.persist()
    }

    /// Spawn a match for every ready slot that has none linked yet.
    fn materialize(&mut self) -> Result<()> {
        let pending: Vec<_> = self
            .document
            .bracket
            .ready_slots()
            .filter(|slot| slot.linked_match.is_none())
            .filter_map(|slot| {
                let (Some(p1), Some(p2)) = (slot.player1.as_ref(), slot.player2.as_ref()) else {
                    return None;
                };
                Some((
                    slot.id,
                    [
                        (p1.address.clone(), p1.character_id),
                        (p2.address.clone(), p2.character_id),
                    ],
                ))
            })
            .collect();

        for (slot, players) in pending {
            let link = TournamentLink {
                tournament: self.document.id,
                slot,
            };
            let route = FinishRoute::Tournament {
                slot,
                commands: self.command_tx.clone(),
            };
            let (match_id, _commands) = self.ctx.spawn_match(players, false, Some(link), route)?;
            self.document.bracket = self
                .document
                .bracket
                .link_match(slot, MatchRef::new(match_id.to_string()))?;

            self.ctx
                .bus
                .publish(Event::Tournament(TournamentEvent::MatchReady {
                    id: self.document.id,
                    slot,
                    match_id,
                }));
        }

        Ok(())
    }

    fn complete(&mut self) {
        let standings = self
            .document
            .bracket
            .top_winners(self.document.config.number_of_winners as usize);

        tracing::info!(
            target: "arena_runtime::workers",
            id = %self.document.id,
            places = standings.len(),
            "tournament complete"
        );
        self.ctx
            .bus
            .publish(Event::Tournament(TournamentEvent::Completed {
                id: self.document.id,
                standings,
            }));

        if let Err(error) = self.persist() {
            tracing::error!(
                target: "arena_runtime::workers",
                id = %self.document.id,
                %error,
                "failed to persist completed tournament"
            );
        }
    }

    fn persist(&mut self) -> Result<()> {
        self.document.updated_at = Utc::now();
        self.ctx.tournaments.save(&self.document)?;
        Ok(())
    }
}
