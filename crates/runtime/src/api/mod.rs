//! Client-facing surface of the runtime.

mod errors;
mod handle;

pub use errors::{OrchestratorError, Result};
pub use handle::{MatchHandle, TournamentHandle};
