use thiserror::Error;

use crate::{
    card::{Card, Effect},
    player::{PlayerError, PlayerId},
};

/// Atomic steps a card effect is broken down into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameAction {
    Draw { player: PlayerId, amount: usize },
    Discard { player: PlayerId, card: Card },
    DiscardSelection { player: PlayerId, amount: usize },
    PlaceCardsOnBottom { player: PlayerId, amount: usize },
    Eliminate(Vec<PlayerId>),
    AddInfo {
        player: PlayerId,
        target: PlayerId,
        cards: Vec<Card>,
    },
    AddEffect { player: PlayerId, effects: Vec<Effect> },
    RemoveEffect { player: PlayerId, effects: Vec<Effect> },
    Swap { player: PlayerId, target: PlayerId },
    NoEffect,
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Eliminated(Vec<PlayerId>),
    /// The player answered a selection request with an unusable selection.
    Penalized(PlayerId),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    #[error("player {0} is not seated in this round")]
    UnknownPlayer(PlayerId),
    #[error("player {0} is already out of the round")]
    PlayerEliminated(PlayerId),
    #[error(transparent)]
    Player(#[from] PlayerError),
}

impl ActionError {
    /// Errors that mean the round state can no longer be trusted.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ActionError::UnknownPlayer(_))
    }
}

pub type ActionResult = Result<Outcome, ActionError>;
