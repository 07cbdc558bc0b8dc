//! Bracket tiers and supported tournament sizes.

/// A bracket tier, ordered from the widest round to the finals, plus the
/// dedicated third-place decider which feeds no further round.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Round {
    #[strum(serialize = "round_of_32")]
    RoundOf32,
    #[strum(serialize = "round_of_16")]
    RoundOf16,
    Quarterfinals,
    Semifinals,
    Finals,
    ThirdPlace,
}

impl Round {
    /// Label a round by the number of slots it holds.
    pub fn for_slot_count(slots: u32) -> Round {
        match slots {
            1 => Round::Finals,
            2 => Round::Semifinals,
            4 => Round::Quarterfinals,
            8 => Round::RoundOf16,
            _ => Round::RoundOf32,
        }
    }

    /// The round a winner advances into, if any.
    pub fn next(&self) -> Option<Round> {
        match self {
            Round::RoundOf32 => Some(Round::RoundOf16),
            Round::RoundOf16 => Some(Round::Quarterfinals),
            Round::Quarterfinals => Some(Round::Semifinals),
            Round::Semifinals => Some(Round::Finals),
            Round::Finals | Round::ThirdPlace => None,
        }
    }
}

/// Supported tournament sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BracketSize {
    Eight,
    Sixteen,
    ThirtyTwo,
}

impl BracketSize {
    pub fn entrants(&self) -> u32 {
        match self {
            BracketSize::Eight => 8,
            BracketSize::Sixteen => 16,
            BracketSize::ThirtyTwo => 32,
        }
    }

    pub fn from_entrants(count: u32) -> Option<BracketSize> {
        match count {
            8 => Some(BracketSize::Eight),
            16 => Some(BracketSize::Sixteen),
            32 => Some(BracketSize::ThirtyTwo),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_are_labelled_by_slot_count() {
        assert_eq!(Round::for_slot_count(1), Round::Finals);
        assert_eq!(Round::for_slot_count(2), Round::Semifinals);
        assert_eq!(Round::for_slot_count(4), Round::Quarterfinals);
        assert_eq!(Round::for_slot_count(8), Round::RoundOf16);
        assert_eq!(Round::for_slot_count(16), Round::RoundOf32);
    }

    #[test]
    fn finals_and_third_place_have_no_successor() {
        assert_eq!(Round::Finals.next(), None);
        assert_eq!(Round::ThirdPlace.next(), None);
        assert_eq!(Round::Semifinals.next(), Some(Round::Finals));
    }

    #[test]
    fn round_names_serialize_snake_case() {
        assert_eq!(Round::RoundOf16.to_string(), "round_of_16");
        assert_eq!(Round::ThirdPlace.to_string(), "third_place");
    }
}
