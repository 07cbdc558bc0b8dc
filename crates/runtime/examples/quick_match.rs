//! Plays one match between two scripted players and logs every event.
//!
//! ```sh
//! RUST_LOG=info cargo run -p arena-runtime --example quick_match
//! ```

use arena_core::{
    Ability, AbilityBook, Character, CharacterId, CharacterRef, CombatEvent, DefenseChoice,
    DefenseKind, Entrant, MatchStatus, PlayerAddress,
};
use arena_runtime::{Orchestrator, RosterOracle};

fn brawler(id: u32, name: &str) -> Character {
    Character::new(
        CharacterId(id),
        name,
        100,
        AbilityBook::new(vec![
            Ability::attack("jab", 10),
            Ability::attack("cross", 20),
            Ability::attack("haymaker", 40),
            Ability::defense("slip", DefenseKind::Dodge),
            Ability::defense("guard", DefenseKind::Block),
            Ability::defense("counter", DefenseKind::Reflect),
        ])
        .unwrap(),
    )
}

fn entrant(address: &str, character: u32) -> Entrant {
    Entrant {
        address: PlayerAddress::from(address),
        character_id: CharacterId(character),
        character_ref: CharacterRef::new(format!("asset-{character}")),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let orchestrator = Orchestrator::builder()
        .characters(RosterOracle::new([
            brawler(1, "crusher"),
            brawler(2, "dancer"),
        ]))
        .build()?;

    let handle = orchestrator.create_match(entrant("0xalice", 1), entrant("0xbob", 2), false)?;

    loop {
        let document = handle.snapshot().await?;
        match document.combat.status {
            MatchStatus::CharacterSelect => {
                let player = if document.combat.player1.initiative_roll.is_none() {
                    document.combat.player1.address.clone()
                } else {
                    document.combat.player2.address.clone()
                };
                let event = handle.roll_initiative(&player).await?;
                tracing::info!(?event, "initiative");
            }
            MatchStatus::InProgress => {
                let side = document
                    .combat
                    .current_turn
                    .ok_or("in-progress match lost its turn")?;
                let player = document.combat.combatant(side).address.clone();
                let event = if document.combat.last_attack.is_some() {
                    // Spend a dodge when one is banked, otherwise eat the hit
                    let banked = document
                        .combat
                        .combatant(side)
                        .defenses
                        .count(DefenseKind::Dodge)
                        > 0;
                    let choice = if banked {
                        DefenseChoice::Spend(DefenseKind::Dodge)
                    } else {
                        DefenseChoice::Skip
                    };
                    handle.resolve_defense(&player, choice).await?
                } else {
                    handle.roll_ability(&player).await?
                };
                tracing::info!(?event, "turn");
                if let CombatEvent::DefenseResolved {
                    winner: Some(winner),
                    ..
                } = event
                {
                    tracing::info!(%winner, "match over");
                    break;
                }
            }
            MatchStatus::Finished => break,
            MatchStatus::Waiting => unreachable!(),
        }
    }

    Ok(())
}
