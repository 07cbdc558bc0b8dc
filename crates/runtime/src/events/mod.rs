//! Topic-based event routing.
//!
//! Every match and tournament gets its own topic, so observers follow just
//! the records they care about without filtering a global stream.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{MatchEvent, TournamentEvent};
