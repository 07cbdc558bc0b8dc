//! Cloneable facades for issuing commands to workers.
//!
//! Handles hide the channel plumbing: each method sends a command with a
//! oneshot reply and awaits the worker's answer. Once a match worker has
//! exited every [`MatchHandle`] method returns
//! [`OrchestratorError::CommandChannelClosed`]; tournament reads fall back
//! to the repository, which holds the final persisted snapshot.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};

use arena_core::{Bracket, CombatEvent, DefenseChoice, Participant, PlayerAddress};

use crate::events::{Event, EventBus, Topic};
use crate::repository::{
    MatchDocument, MatchId, TournamentDocument, TournamentId, TournamentRepository,
};
use crate::workers::{MatchAction, MatchCommand, TournamentCommand};

use super::errors::{OrchestratorError, Result};

/// Client-facing handle to one live match.
///
/// Players are identified by address; the worker resolves their side and
/// rejects addresses that are not in the match.
#[derive(Clone)]
pub struct MatchHandle {
    id: MatchId,
    commands: mpsc::Sender<MatchCommand>,
    bus: EventBus,
}

impl MatchHandle {
    pub(crate) fn new(id: MatchId, commands: mpsc::Sender<MatchCommand>, bus: EventBus) -> Self {
        Self { id, commands, bus }
    }

    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Roll the "who goes first" die for the given player.
    pub async fn roll_initiative(&self, player: &PlayerAddress) -> Result<CombatEvent> {
        self.execute(player, MatchAction::RollInitiative).await
    }

    /// Roll the ability die for the player whose turn it is.
    pub async fn roll_ability(&self, player: &PlayerAddress) -> Result<CombatEvent> {
        self.execute(player, MatchAction::RollAbility).await
    }

    /// Answer the pending attack.
    pub async fn resolve_defense(
        &self,
        player: &PlayerAddress,
        choice: DefenseChoice,
    ) -> Result<CombatEvent> {
        self.execute(player, MatchAction::ResolveDefense(choice))
            .await
    }

    /// Read the current match document.
    pub async fn snapshot(&self) -> Result<MatchDocument> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(MatchCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| OrchestratorError::CommandChannelClosed)?;

        reply_rx.await.map_err(OrchestratorError::ReplyChannelClosed)
    }

    /// Subscribe to this match's events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe(Topic::Match(self.id))
    }

    async fn execute(&self, player: &PlayerAddress, action: MatchAction) -> Result<CombatEvent> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.commands
            .send(MatchCommand::Execute {
                player: player.clone(),
                action,
                reply: reply_tx,
            })
            .await
            .map_err(|_| OrchestratorError::CommandChannelClosed)?;

        reply_rx
            .await
            .map_err(OrchestratorError::ReplyChannelClosed)?
    }
}

/// Client-facing handle to one tournament.
#[derive(Clone)]
pub struct TournamentHandle {
    id: TournamentId,
    commands: mpsc::Sender<TournamentCommand>,
    bus: EventBus,
    tournaments: Arc<dyn TournamentRepository>,
}

impl TournamentHandle {
    pub(crate) fn new(
        id: TournamentId,
        commands: mpsc::Sender<TournamentCommand>,
        bus: EventBus,
        tournaments: Arc<dyn TournamentRepository>,
    ) -> Self {
        Self {
            id,
            commands,
            bus,
            tournaments,
        }
    }

    pub fn id(&self) -> TournamentId {
        self.id
    }

    /// Read the current tournament document. Served by the worker while it
    /// runs and from the repository once it has exited.
    pub async fn snapshot(&self) -> Result<TournamentDocument> {
        let (reply_tx, reply_rx) = oneshot::channel();
        let sent = self
            .commands
            .send(TournamentCommand::Snapshot { reply: reply_tx })
            .await;
        if sent.is_ok() {
            if let Ok(document) = reply_rx.await {
                return Ok(document);
            }
        }

        // The worker persists before exiting, so the stored copy is final
        self.tournaments
            .load(self.id)?
            .ok_or(OrchestratorError::TournamentNotFound { id: self.id })
    }

    /// The current bracket snapshot.
    pub async fn bracket(&self) -> Result<Bracket> {
        Ok(self.snapshot().await?.bracket)
    }

    /// Ranked places decided so far, capped at the configured winner count.
    /// Empty until the finals are decided.
    pub async fn standings(&self) -> Result<Vec<Participant>> {
        let document = self.snapshot().await?;
        Ok(document
            .bracket
            .top_winners(document.config.number_of_winners as usize))
    }

    /// Subscribe to this tournament's events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe(Topic::Tournament(self.id))
    }
}
