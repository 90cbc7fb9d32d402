//! Interactive play: a table with human seats driven round after round through a `HumanInput`.

pub mod console;

use crate::SimulationError;
use blackjack_engine::prelude::*;
use tracing::info;

/// Plays rounds until a human leaves or no human can cover the minimum bet any more.
/// Returns the number of rounds played.
pub fn play_session<I: HumanInput>(table: &mut Table, input: &mut I) -> Result<u64, SimulationError> {
    if !table.seats().iter().any(|seat| seat.is_human()) {
        return Err(SimulationError::Config(
            "an interactive game needs a human seat".to_string(),
        ));
    }

    let mut rounds = 0;
    loop {
        let minimum = table.minimum();
        if !table
            .seats()
            .iter()
            .any(|seat| seat.is_human() && seat.can_play(minimum))
        {
            info!(minimum, "no human can cover the minimum bet");
            break;
        }
        match table.play_round(input) {
            Ok(_) => rounds += 1,
            Err(GameError::LeftTable(name)) => {
                info!(%name, "left the table");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(rounds)
}
