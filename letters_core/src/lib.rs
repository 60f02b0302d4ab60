use std::sync::Arc;

use collaborator::Collaborator;
use game::{Game, GameError};
use player::{Participant, PlayerId};

pub mod action;
pub mod card;
pub mod collaborator;
pub mod config;
pub mod deck;
pub mod event;
pub mod game;
pub mod host;
pub mod pending;
pub mod play;
pub mod player;
pub mod processor;
pub mod random_playing_computer;
pub mod remote;
pub mod resolver;
pub mod round;
pub mod utils;

#[cfg(test)]
mod testing;

/// Plays a whole game with default settings and returns its winners.
pub async fn run_game(
    participants: Vec<Participant>,
    collaborator: Arc<dyn Collaborator>,
) -> Result<Vec<PlayerId>, GameError> {
    let mut game = Game::create(participants, collaborator)?;
    game.run().await?;
    Ok(game.winners().to_vec())
}
