use std::sync::Mutex;

use async_trait::async_trait;
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use strum::IntoEnumIterator;

use crate::{
    card::Card,
    collaborator::{Collaborator, RequestError},
    event::EventEntry,
    game::GameId,
    play::Play,
    player::PlayerId,
};

/// Answers every request with a random legal decision.
pub struct RandomPlayingComputer {
    rng: Mutex<StdRng>,
}

impl Default for RandomPlayingComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomPlayingComputer {
    pub fn new() -> Self {
        RandomPlayingComputer {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomPlayingComputer {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn decide(&self, me: PlayerId, hand: &[Card], legal_targets: &[PlayerId]) -> Play {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        choose_play(me, hand, legal_targets, &mut *rng)
    }

    pub fn choose_cards(&self, count: usize, available: &[Card]) -> Vec<Card> {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
        choose_cards(count, available, &mut *rng)
    }
}

/// Picks a card that does not knock the player out, then a target and a
/// guess for it when the card asks for them.
pub fn choose_play<R: Rng + ?Sized>(
    me: PlayerId,
    hand: &[Card],
    legal_targets: &[PlayerId],
    rng: &mut R,
) -> Play {
    let mut options = hand
        .iter()
        .copied()
        .filter(|&c| c != Card::Princess)
        .collect::<Vec<_>>();
    if hand.contains(&Card::Countess) && (hand.contains(&Card::King) || hand.contains(&Card::Prince))
    {
        options = vec![Card::Countess];
    }
    options.shuffle(rng);
    let card = match options.first() {
        Some(&card) => card,
        None => hand.first().copied().unwrap_or(Card::Princess),
    };

    let mut play = Play::new(card);
    if card.needs_opponent() {
        let others = legal_targets
            .iter()
            .copied()
            .filter(|&id| id != me)
            .collect::<Vec<_>>();
        play.opponent = others.choose(rng).copied();
        if play.opponent.is_none() && card.allows_self_target() {
            play.opponent = Some(me);
        }
    }
    if card.needs_guess() {
        let guesses = Card::iter().filter(|&c| c != Card::Guard).collect::<Vec<_>>();
        play.guess = guesses.choose(rng).copied();
    }
    play
}

pub fn choose_cards<R: Rng + ?Sized>(count: usize, available: &[Card], rng: &mut R) -> Vec<Card> {
    let mut cards = available.to_vec();
    cards.shuffle(rng);
    cards.truncate(count);
    cards
}

#[async_trait]
impl Collaborator for RandomPlayingComputer {
    async fn get_player_action(
        &self,
        _game: GameId,
        player: PlayerId,
        hand: &[Card],
        legal_targets: &[PlayerId],
    ) -> Result<Play, RequestError> {
        Ok(self.decide(player, hand, legal_targets))
    }

    async fn request_card_selection(
        &self,
        _game: GameId,
        _player: PlayerId,
        count: usize,
        available: &[Card],
    ) -> Result<Vec<Card>, RequestError> {
        Ok(self.choose_cards(count, available))
    }

    async fn notify(&self, _game: GameId, _entry: &EventEntry) {}
}
