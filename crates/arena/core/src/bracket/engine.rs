//! Bracket generation, progression, and standings.

use crate::character::PlayerAddress;
use crate::rng::{RngOracle, shuffle};

use super::error::BracketError;
use super::round::{BracketSize, Round};
use super::slot::{BracketSlot, Entrant, Participant, SlotId, Timestamp};

/// Ordered collection of every slot of one tournament.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bracket {
    size: BracketSize,
    slots: Vec<BracketSlot>,
}

impl Bracket {
    /// Seed entrants and lay out every round's slots.
    ///
    /// Entrants are shuffled (Fisher-Yates over the oracle) and paired two
    /// at a time into `size/2` first-round slots; later rounds get empty
    /// placeholder slots halving down to one finals slot, plus exactly one
    /// third-place slot at position 0. An entrant count that does not match
    /// `size` is tolerated: missing players leave slots partially filled,
    /// surplus entrants are not seeded. Callers decide whether to warn.
    pub fn generate(
        mut entrants: Vec<Entrant>,
        size: BracketSize,
        rng: &dyn RngOracle,
        seed: u64,
    ) -> Bracket {
        shuffle(&mut entrants, rng, seed);
        let participants: Vec<Participant> = entrants
            .into_iter()
            .enumerate()
            .map(|(index, entrant)| Participant {
                address: entrant.address,
                character_id: entrant.character_id,
                character_ref: entrant.character_ref,
                seed_position: index as u32 + 1,
            })
            .collect();

        let mut slots = Vec::new();
        let mut next_id = 0u32;
        let mut slot_id = move || {
            next_id += 1;
            SlotId(next_id)
        };

        let first_round_slots = size.entrants() / 2;
        let round = Round::for_slot_count(first_round_slots);
        for position in 1..=first_round_slots {
            let base = ((position - 1) * 2) as usize;
            slots.push(BracketSlot::new(
                slot_id(),
                round,
                position,
                participants.get(base).cloned(),
                participants.get(base + 1).cloned(),
            ));
        }

        // Placeholder slots for every later round, down to the finals.
        let mut count = first_round_slots / 2;
        while count >= 1 {
            let round = Round::for_slot_count(count);
            for position in 1..=count {
                slots.push(BracketSlot::new(slot_id(), round, position, None, None));
            }
            count /= 2;
        }

        // The third-place decider, filled only when four winners are needed.
        slots.push(BracketSlot::new(slot_id(), Round::ThirdPlace, 0, None, None));

        Bracket { size, slots }
    }

    pub fn size(&self) -> BracketSize {
        self.size
    }

    pub fn slots(&self) -> &[BracketSlot] {
        &self.slots
    }

    pub fn slot(&self, id: SlotId) -> Option<&BracketSlot> {
        self.slots.iter().find(|slot| slot.id == id)
    }

    /// Slots with both players assigned and no winner yet.
    pub fn ready_slots(&self) -> impl Iterator<Item = &BracketSlot> {
        self.slots.iter().filter(|slot| slot.is_ready())
    }

    pub fn finals_slot(&self) -> Option<&BracketSlot> {
        self.slots.iter().find(|slot| slot.round == Round::Finals)
    }

    pub fn third_place_slot(&self) -> Option<&BracketSlot> {
        self.slots.iter().find(|slot| slot.round == Round::ThirdPlace)
    }

    /// Record the link between a slot and its playable match record.
    pub fn link_match(&self, slot: SlotId, reference: super::slot::MatchRef) -> Result<Bracket, BracketError> {
        let mut next = self.clone();
        let target = next
            .slots
            .iter_mut()
            .find(|s| s.id == slot)
            .ok_or(BracketError::MatchNotFound { slot })?;
        target.linked_match = Some(reference);
        Ok(next)
    }

    /// Mark a slot decided and advance the winner one round up.
    ///
    /// Returns an updated snapshot; the input is never mutated. Winners of
    /// odd-position slots land in `player1` of the `ceil(position / 2)` slot
    /// of the next round, even positions in `player2`. The finals and the
    /// third-place slot feed no further round.
    pub fn progress_winner(
        &self,
        slot: SlotId,
        winner: &PlayerAddress,
        now: Timestamp,
    ) -> Result<Bracket, BracketError> {
        let mut next = self.clone();
        let index = next
            .slots
            .iter()
            .position(|s| s.id == slot)
            .ok_or(BracketError::MatchNotFound { slot })?;

        {
            let current = &next.slots[index];
            if current.is_decided() {
                return Err(BracketError::MatchAlreadyDecided { slot });
            }
            if !current.has_player(winner) {
                return Err(BracketError::WinnerNotInMatch {
                    slot,
                    address: winner.clone(),
                });
            }
        }

        next.slots[index].winner = Some(winner.clone());
        next.slots[index].completed_at = Some(now);

        let round = next.slots[index].round;
        let position = next.slots[index].position;
        if matches!(round, Round::Finals | Round::ThirdPlace) {
            return Ok(next);
        }

        let advancing = next.slots[index]
            .winner_participant()
            .cloned()
            .ok_or(BracketError::WinnerNotInMatch {
                slot,
                address: winner.clone(),
            })?;

        let dest_round = round.next().ok_or(BracketError::NextMatchNotFound {
            round,
            position,
        })?;
        let dest_position = position.div_ceil(2);
        let destination = next
            .slots
            .iter_mut()
            .find(|s| s.round == dest_round && s.position == dest_position)
            .ok_or(BracketError::NextMatchNotFound {
                round: dest_round,
                position: dest_position,
            })?;

        let target = if position % 2 == 1 {
            &mut destination.player1
        } else {
            &mut destination.player2
        };
        if target.is_some() {
            return Err(BracketError::DestinationOccupied {
                round: dest_round,
                position: dest_position,
            });
        }
        *target = Some(advancing);

        Ok(next)
    }

    /// Route a decided semifinal's loser into the third-place slot.
    ///
    /// Odd semifinal positions fill `player1`, even positions `player2`.
    /// Only invoked when the tournament is configured for four winners.
    pub fn assign_semifinal_loser(&self, slot: SlotId) -> Result<Bracket, BracketError> {
        let mut next = self.clone();
        let source = next
            .slots
            .iter()
            .find(|s| s.id == slot)
            .ok_or(BracketError::MatchNotFound { slot })?;
        if source.round != Round::Semifinals {
            return Err(BracketError::NotASemifinal { slot });
        }
        let loser = source
            .loser_participant()
            .cloned()
            .ok_or(BracketError::MatchNotDecided { slot })?;
        let position = source.position;

        let third = next
            .slots
            .iter_mut()
            .find(|s| s.round == Round::ThirdPlace)
            .ok_or(BracketError::NextMatchNotFound {
                round: Round::ThirdPlace,
                position: 0,
            })?;
        let target = if position % 2 == 1 {
            &mut third.player1
        } else {
            &mut third.player2
        };
        if target.is_some() {
            return Err(BracketError::DestinationOccupied {
                round: Round::ThirdPlace,
                position: 0,
            });
        }
        *target = Some(loser);

        Ok(next)
    }

    /// Finals decided and, when the third-place slot was populated, that
    /// slot decided too. An empty third-place slot never blocks completion.
    pub fn is_complete(&self) -> bool {
        let finals_done = self
            .finals_slot()
            .map(|slot| slot.is_decided())
            .unwrap_or(false);
        let third_done = self
            .third_place_slot()
            .map(|slot| !slot.is_populated() || slot.is_decided())
            .unwrap_or(true);
        finals_done && third_done
    }

    /// Ranked standings: 1st/2nd from the finals, 3rd/4th strictly from the
    /// third-place slot. While that slot is unresolved, 3rd/4th are omitted.
    /// Ranks beyond 4th are not derivable from a single-elimination bracket
    /// and are never fabricated.
    pub fn top_winners(&self, number_of_winners: usize) -> Vec<Participant> {
        let mut standings = Vec::new();
        let Some(finals) = self.finals_slot() else {
            return standings;
        };
        let Some(first) = finals.winner_participant() else {
            return standings;
        };
        standings.push(first.clone());
        if let Some(second) = finals.loser_participant() {
            standings.push(second.clone());
        }

        if number_of_winners >= 4 {
            if let Some(third_slot) = self.third_place_slot() {
                if let (Some(third), Some(fourth)) = (
                    third_slot.winner_participant(),
                    third_slot.loser_participant(),
                ) {
                    standings.push(third.clone());
                    standings.push(fourth.clone());
                }
            }
        }

        standings.truncate(number_of_winners);
        standings
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::character::{CharacterId, CharacterRef, PlayerAddress};
    use crate::rng::PcgRng;

    use super::*;

    fn entrants(count: u32) -> Vec<Entrant> {
        (0..count)
            .map(|i| Entrant {
                address: PlayerAddress::new(format!("0xplayer{i}")),
                character_id: CharacterId(i),
                character_ref: CharacterRef::new(format!("asset-{i}")),
            })
            .collect()
    }

    fn generate(count: u32, size: BracketSize) -> Bracket {
        Bracket::generate(entrants(count), size, &PcgRng, 42)
    }

    fn decide(bracket: &Bracket, slot: SlotId, winner_is_player1: bool) -> (Bracket, PlayerAddress) {
        let s = bracket.slot(slot).unwrap();
        let winner = if winner_is_player1 {
            s.player1.as_ref().unwrap().address.clone()
        } else {
            s.player2.as_ref().unwrap().address.clone()
        };
        (
            bracket.progress_winner(slot, &winner, Timestamp(1)).unwrap(),
            winner,
        )
    }

    #[test]
    fn slot_counts_match_single_elimination_shape() {
        for (count, size) in [
            (8, BracketSize::Eight),
            (16, BracketSize::Sixteen),
            (32, BracketSize::ThirtyTwo),
        ] {
            let bracket = generate(count, size);
            let first_round = Round::for_slot_count(count / 2);
            let first_round_slots = bracket
                .slots()
                .iter()
                .filter(|slot| slot.round == first_round)
                .count();
            assert_eq!(first_round_slots as u32, count / 2);
            // N - 1 playable slots plus the third-place decider
            assert_eq!(bracket.slots().len() as u32, count - 1 + 1);
            assert_eq!(
                bracket
                    .slots()
                    .iter()
                    .filter(|slot| slot.round == Round::ThirdPlace)
                    .count(),
                1
            );
        }
    }

    #[test]
    fn seeding_is_a_permutation() {
        let bracket = generate(16, BracketSize::Sixteen);
        let mut addresses = HashSet::new();
        let mut seeds = HashSet::new();
        for participant in bracket
            .slots()
            .iter()
            .flat_map(|slot| slot.participants())
        {
            assert!(addresses.insert(participant.address.clone()));
            assert!(seeds.insert(participant.seed_position));
        }
        assert_eq!(addresses.len(), 16);
        assert_eq!(seeds, (1..=16).collect());
    }

    #[test]
    fn undersized_entrant_list_leaves_partial_slots() {
        let bracket = Bracket::generate(entrants(6), BracketSize::Eight, &PcgRng, 42);
        let quarterfinal_slots: Vec<_> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Quarterfinals)
            .collect();
        assert_eq!(quarterfinal_slots.len(), 4);
        let ready = quarterfinal_slots.iter().filter(|s| s.is_ready()).count();
        assert_eq!(ready, 3);
    }

    #[test]
    fn winners_advance_by_position_parity() {
        let bracket = generate(8, BracketSize::Eight);
        let quarterfinals: Vec<SlotId> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Quarterfinals)
            .map(|slot| slot.id)
            .collect();

        // Odd position → player1 of ceil(pos / 2); even → player2
        let (bracket, winner1) = decide(&bracket, quarterfinals[0], true);
        let (bracket, winner2) = decide(&bracket, quarterfinals[1], false);

        let semifinal = bracket
            .slots()
            .iter()
            .find(|slot| slot.round == Round::Semifinals && slot.position == 1)
            .unwrap();
        assert_eq!(semifinal.player1.as_ref().unwrap().address, winner1);
        assert_eq!(semifinal.player2.as_ref().unwrap().address, winner2);

        let (bracket, winner3) = decide(&bracket, quarterfinals[2], true);
        let semifinal2 = bracket
            .slots()
            .iter()
            .find(|slot| slot.round == Round::Semifinals && slot.position == 2)
            .unwrap();
        assert_eq!(semifinal2.player1.as_ref().unwrap().address, winner3);
    }

    #[test]
    fn progress_winner_returns_new_snapshot() {
        let bracket = generate(8, BracketSize::Eight);
        let slot = bracket.ready_slots().next().unwrap();
        let winner = slot.player1.as_ref().unwrap().address.clone();
        let updated = bracket
            .progress_winner(slot.id, &winner, Timestamp(9))
            .unwrap();
        assert!(bracket.slot(slot.id).unwrap().winner.is_none());
        assert_eq!(updated.slot(slot.id).unwrap().winner, Some(winner));
        assert_eq!(
            updated.slot(slot.id).unwrap().completed_at,
            Some(Timestamp(9))
        );
    }

    #[test]
    fn unknown_slot_and_foreign_winner_are_rejected() {
        let bracket = generate(8, BracketSize::Eight);
        let missing = SlotId(999);
        assert_eq!(
            bracket
                .progress_winner(missing, &PlayerAddress::from("0xplayer0"), Timestamp(0))
                .unwrap_err(),
            BracketError::MatchNotFound { slot: missing }
        );

        let slot = bracket.ready_slots().next().unwrap();
        let outsider = PlayerAddress::from("0xnotinmatch");
        assert_eq!(
            bracket
                .progress_winner(slot.id, &outsider, Timestamp(0))
                .unwrap_err(),
            BracketError::WinnerNotInMatch {
                slot: slot.id,
                address: outsider,
            }
        );
    }

    #[test]
    fn deciding_a_slot_twice_is_rejected() {
        let bracket = generate(8, BracketSize::Eight);
        let slot = bracket.ready_slots().next().unwrap().id;
        let (updated, winner) = decide(&bracket, slot, true);
        assert_eq!(
            updated
                .progress_winner(slot, &winner, Timestamp(2))
                .unwrap_err(),
            BracketError::MatchAlreadyDecided { slot }
        );
    }

    /// Drive an 8-entrant bracket to completion, routing semifinal losers
    /// through the third-place decider.
    fn run_full_bracket() -> Bracket {
        let mut bracket = generate(8, BracketSize::Eight);
        for round in [Round::Quarterfinals, Round::Semifinals] {
            let ids: Vec<SlotId> = bracket
                .slots()
                .iter()
                .filter(|slot| slot.round == round)
                .map(|slot| slot.id)
                .collect();
            for id in ids {
                let (next, _) = decide(&bracket, id, true);
                bracket = next;
                if round == Round::Semifinals {
                    bracket = bracket.assign_semifinal_loser(id).unwrap();
                }
            }
        }
        for round in [Round::ThirdPlace, Round::Finals] {
            let id = bracket
                .slots()
                .iter()
                .find(|slot| slot.round == round)
                .unwrap()
                .id;
            let (next, _) = decide(&bracket, id, true);
            bracket = next;
        }
        bracket
    }

    #[test]
    fn completion_requires_populated_third_place_to_resolve() {
        let mut bracket = generate(8, BracketSize::Eight);
        assert!(!bracket.is_complete());

        let ids: Vec<SlotId> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Quarterfinals)
            .map(|slot| slot.id)
            .collect();
        for id in ids {
            bracket = decide(&bracket, id, true).0;
        }
        let semis: Vec<SlotId> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Semifinals)
            .map(|slot| slot.id)
            .collect();
        for id in semis {
            bracket = decide(&bracket, id, true).0;
            bracket = bracket.assign_semifinal_loser(id).unwrap();
        }
        assert!(!bracket.is_complete());

        // Finals decided but the populated third-place slot is not
        let finals = bracket.finals_slot().unwrap().id;
        bracket = decide(&bracket, finals, true).0;
        assert!(!bracket.is_complete());

        let third = bracket.third_place_slot().unwrap().id;
        bracket = decide(&bracket, third, false).0;
        assert!(bracket.is_complete());
    }

    #[test]
    fn empty_third_place_slot_does_not_block_completion() {
        // Two-winner tournament: semifinal losers are never routed
        let mut bracket = generate(8, BracketSize::Eight);
        for round in [Round::Quarterfinals, Round::Semifinals, Round::Finals] {
            let ids: Vec<SlotId> = bracket
                .slots()
                .iter()
                .filter(|slot| slot.round == round)
                .map(|slot| slot.id)
                .collect();
            for id in ids {
                bracket = decide(&bracket, id, true).0;
            }
        }
        assert!(bracket.is_complete());
        assert_eq!(bracket.top_winners(2).len(), 2);
    }

    #[test]
    fn semifinal_losers_fill_third_place_by_parity() {
        let mut bracket = generate(8, BracketSize::Eight);
        let ids: Vec<SlotId> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Quarterfinals)
            .map(|slot| slot.id)
            .collect();
        for id in ids {
            bracket = decide(&bracket, id, true).0;
        }

        let semis: Vec<(SlotId, u32)> = bracket
            .slots()
            .iter()
            .filter(|slot| slot.round == Round::Semifinals)
            .map(|slot| (slot.id, slot.position))
            .collect();
        let mut losers = Vec::new();
        for (id, _position) in &semis {
            let loser = bracket
                .slot(*id)
                .unwrap()
                .player2
                .as_ref()
                .unwrap()
                .address
                .clone();
            bracket = decide(&bracket, *id, true).0;
            bracket = bracket.assign_semifinal_loser(*id).unwrap();
            losers.push(loser);
        }

        let third = bracket.third_place_slot().unwrap();
        assert_eq!(third.player1.as_ref().unwrap().address, losers[0]);
        assert_eq!(third.player2.as_ref().unwrap().address, losers[1]);
    }

    #[test]
    fn top_winners_come_from_finals_and_third_place() {
        let bracket = run_full_bracket();
        let standings = bracket.top_winners(4);
        assert_eq!(standings.len(), 4);

        let finals = bracket.finals_slot().unwrap();
        assert_eq!(
            standings[0].address,
            finals.winner_participant().unwrap().address
        );
        assert_eq!(
            standings[1].address,
            finals.loser_participant().unwrap().address
        );

        let third = bracket.third_place_slot().unwrap();
        assert_eq!(
            standings[2].address,
            third.winner_participant().unwrap().address
        );
        assert_eq!(
            standings[3].address,
            third.loser_participant().unwrap().address
        );
    }

    #[test]
    fn unresolved_third_place_omits_lower_ranks() {
        let mut bracket = generate(8, BracketSize::Eight);
        for round in [Round::Quarterfinals, Round::Semifinals, Round::Finals] {
            let ids: Vec<SlotId> = bracket
                .slots()
                .iter()
                .filter(|slot| slot.round == round)
                .map(|slot| slot.id)
                .collect();
            for id in ids {
                bracket = decide(&bracket, id, true).0;
            }
        }
        // Four winners requested, third-place never played
        let standings = bracket.top_winners(4);
        assert_eq!(standings.len(), 2);
    }
}
