use std::{collections::HashSet, sync::Arc};

use itertools::Itertools;
use rand::{rngs::StdRng, SeedableRng};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    collaborator::Collaborator,
    config::GameConfig,
    deck::Deck,
    event::{filter_events, Event, EventEntry},
    player::{Participant, Player, PlayerId},
    round::{GameView, Round, RoundError},
};

pub type GameId = Uuid;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("a game needs 2 to 6 players, got {0}")]
    PlayerCount(usize),
    #[error("player {0} is seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("round {round} failed: {source}")]
    Round { round: u32, source: RoundError },
    #[error("no one won after {0} rounds")]
    RoundLimit(u32),
}

pub struct Game {
    id: GameId,
    players: Vec<Player>,
    history: Vec<EventEntry>,
    collaborator: Arc<dyn Collaborator>,
    config: GameConfig,
    rng: StdRng,
    rounds_played: u32,
    winners: Vec<PlayerId>,
}

impl Game {
    pub fn create(
        participants: Vec<Participant>,
        collaborator: Arc<dyn Collaborator>,
    ) -> Result<Self, GameError> {
        Self::with_config(participants, collaborator, GameConfig::default())
    }

    pub fn with_config(
        participants: Vec<Participant>,
        collaborator: Arc<dyn Collaborator>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&participants.len()) {
            return Err(GameError::PlayerCount(participants.len()));
        }
        let mut seen = HashSet::new();
        if let Some(p) = participants.iter().find(|p| !seen.insert(p.id)) {
            return Err(GameError::DuplicatePlayer(p.id));
        }
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Game {
            id: Uuid::new_v4(),
            players: participants.into_iter().map(Player::new).collect(),
            history: vec![],
            collaborator,
            config,
            rng,
            rounds_played: 0,
            winners: vec![],
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }

    /// Empty until the game has been played to its end.
    pub fn winners(&self) -> &[PlayerId] {
        &self.winners
    }

    pub fn history(&self) -> &[EventEntry] {
        &self.history
    }

    /// The history as `viewer` was allowed to see it; `None` sees everything.
    pub fn history_for(&self, viewer: Option<PlayerId>) -> Vec<Event> {
        filter_events(&self.history, viewer)
    }

    pub fn is_finished(&self) -> bool {
        self.players
            .iter()
            .any(|p| p.score() >= self.config.win_score)
    }

    /// Plays rounds until someone reaches the winning score, then announces
    /// the winners once.
    pub async fn run(&mut self) -> Result<(), GameError> {
        log::info!(
            "[game {}] starting with {}",
            self.id,
            self.players.iter().map(Player::name).join(", ")
        );
        let mut last_winners = vec![];
        while !self.is_finished() {
            if self.rounds_played >= self.config.max_rounds {
                log::error!("[game {}] gave up after {} rounds", self.id, self.rounds_played);
                return Err(GameError::RoundLimit(self.rounds_played));
            }
            let deck = Deck::new(self.config.deck, &mut self.rng);
            last_winners = self.play_round(deck, &last_winners).await?;
        }

        self.winners = game_winners(&self.players, self.config.win_score);
        log::info!("[game {}] won by {:?}", self.id, self.winners);
        let entry = EventEntry::public(Event::Winner(self.winners.clone()));
        self.collaborator.notify(self.id, &entry).await;
        self.history.push(entry);
        Ok(())
    }

    /// Plays one round with `deck` and scores its winners.
    pub async fn play_round(
        &mut self,
        deck: Deck,
        last_winners: &[PlayerId],
    ) -> Result<Vec<PlayerId>, GameError> {
        let round = self.rounds_played + 1;
        log::info!("[game {}] [round] {} begins", self.id, round);
        let view = GameView {
            id: self.id,
            players: &mut self.players,
            history: &mut self.history,
            collaborator: self.collaborator.as_ref(),
        };
        let winners = match Round::new(view, deck, last_winners, &mut self.rng) {
            Ok(r) => r.run().await,
            Err(e) => Err(e),
        }
        .map_err(|source| {
            log::error!("[game {}] [round] {} failed: {}", self.id, round, source);
            GameError::Round { round, source }
        })?;

        for player in self.players.iter_mut() {
            if winners.contains(&player.id()) {
                player.add_point();
            }
        }
        self.rounds_played = round;
        log::info!(
            "[game {}] [round] {} won by {:?}, scores {:?}",
            self.id,
            round,
            winners,
            self.players.iter().map(|p| (p.id(), p.score())).collect_vec()
        );
        Ok(winners)
    }
}

/// Everyone at the top score once it reached `threshold`, ties going to the
/// most valuable cards played over the whole game.
pub fn game_winners(players: &[Player], threshold: u32) -> Vec<PlayerId> {
    let top = match players.iter().map(Player::score).max() {
        Some(top) if top >= threshold => top,
        _ => return vec![],
    };
    let leaders = players.iter().filter(|p| p.score() == top).collect_vec();
    let best = leaders
        .iter()
        .map(|p| p.lifetime_rank_total())
        .max()
        .unwrap_or_default();
    leaders
        .into_iter()
        .filter(|p| p.lifetime_rank_total() == best)
        .map(Player::id)
        .collect()
}
