use async_trait::async_trait;
use thiserror::Error;

use crate::{card::Card, event::EventEntry, game::GameId, play::Play, player::PlayerId};

/// Why a participant did not deliver a usable answer to a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("the participant did not answer in time")]
    TimedOut,
    #[error("player {0} already has an outstanding request")]
    Busy(PlayerId),
    #[error("the request was cancelled before an answer arrived")]
    Cancelled,
    #[error("the participant refused to answer")]
    Refused,
    #[error("the participant can no longer be reached")]
    Disconnected,
}

/// The surface the hosting layer implements so the engine can ask
/// participants for decisions and tell them what happened.
#[async_trait]
pub trait Collaborator: Send + Sync {
    async fn get_player_action(
        &self,
        game: GameId,
        player: PlayerId,
        hand: &[Card],
        legal_targets: &[PlayerId],
    ) -> Result<Play, RequestError>;

    async fn request_card_selection(
        &self,
        game: GameId,
        player: PlayerId,
        count: usize,
        available: &[Card],
    ) -> Result<Vec<Card>, RequestError>;

    async fn notify(&self, game: GameId, entry: &EventEntry);
}
