//! Single-elimination tournament brackets.
//!
//! [`Bracket::generate`] seeds entrants randomly and lays out every round's
//! slots up front, including the dedicated third-place decider. Progression
//! ([`Bracket::progress_winner`]) never mutates in place: it returns a fresh
//! snapshot for the caller to persist.

mod engine;
mod error;
mod round;
mod slot;

pub use engine::Bracket;
pub use error::BracketError;
pub use round::{BracketSize, Round};
pub use slot::{BracketSlot, Entrant, MatchRef, Participant, SlotId, Timestamp};
