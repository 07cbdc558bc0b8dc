//! Repository contracts for saving and loading runtime documents.

use super::Result;
use super::types::{MatchDocument, MatchId, TournamentDocument, TournamentId};

/// Storage for match documents, keyed by [`MatchId`].
///
/// `save` is an upsert; workers call it after every accepted command, so the
/// stored copy always reflects the last committed state.
pub trait MatchRepository: Send + Sync {
    fn save(&self, document: &MatchDocument) -> Result<()>;

    fn load(&self, id: MatchId) -> Result<Option<MatchDocument>>;

    /// Remove a stored document. Deleting an absent id is not an error.
    fn delete(&self, id: MatchId) -> Result<()>;

    fn list_ids(&self) -> Result<Vec<MatchId>>;
}

/// Storage for tournament documents, keyed by [`TournamentId`].
pub trait TournamentRepository: Send + Sync {
    fn save(&self, document: &TournamentDocument) -> Result<()>;

    fn load(&self, id: TournamentId) -> Result<Option<TournamentDocument>>;

    /// Remove a stored document. Deleting an absent id is not an error.
    fn delete(&self, id: TournamentId) -> Result<()>;

    fn list_ids(&self) -> Result<Vec<TournamentId>>;
}
