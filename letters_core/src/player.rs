use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    card::{Card, Effect, EffectDuration},
    utils::VecExtensions,
};

/// Identifier assigned to a participant by the hosting layer.
pub type PlayerId = usize;

/// A seat requested by the host when creating a game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: PlayerId,
    pub name: String,
}

impl Participant {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Participant {
            id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("player {player} does not hold a {card}")]
    CardNotInHand { player: PlayerId, card: Card },
}

#[derive(Debug, Clone)]
pub struct Player {
    id: PlayerId,
    name: String,
    hand: Vec<Card>,
    played: Vec<Card>,
    effects: Vec<Effect>,
    alive: bool,
    score: u32,
    opponent_info: HashMap<PlayerId, Vec<Card>>,
    lifetime_rank_total: u32,
}

impl Player {
    pub fn new(participant: Participant) -> Self {
        Player {
            id: participant.id,
            name: participant.name,
            hand: vec![],
            played: vec![],
            effects: vec![],
            alive: true,
            score: 0,
            opponent_info: HashMap::new(),
            lifetime_rank_total: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hand(&self) -> &[Card] {
        &self.hand
    }

    pub fn played(&self) -> &[Card] {
        &self.played
    }

    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn opponent_info(&self) -> &HashMap<PlayerId, Vec<Card>> {
        &self.opponent_info
    }

    /// Rank sum of every card this player moved to a played pile during the game.
    pub fn lifetime_rank_total(&self) -> u32 {
        self.lifetime_rank_total
    }

    /// Rank sum of the cards played in the current (or just finished) round.
    pub fn played_rank_total(&self) -> u32 {
        self.played.iter().map(Card::value).sum()
    }

    pub fn highest_card(&self) -> Option<Card> {
        self.hand.iter().max().copied()
    }

    pub fn play(&mut self, card: Card) -> Result<Card, PlayerError> {
        let card = self
            .hand
            .remove_first_where(|&c| c == card)
            .ok_or(PlayerError::CardNotInHand {
                player: self.id,
                card,
            })?;
        self.push_played(card);
        Ok(card)
    }

    pub fn draw(&mut self, cards: impl IntoIterator<Item = Card>) {
        self.hand.extend(cards);
    }

    /// Plays the first hand card whatever it is.
    pub fn discard(&mut self) -> Option<Card> {
        if self.hand.is_empty() {
            return None;
        }
        let card = self.hand.remove(0);
        self.push_played(card);
        Some(card)
    }

    /// Marks the player as out of the round, folding the whole hand.
    pub fn die(&mut self) -> Vec<Card> {
        self.alive = false;
        let mut folded = vec![];
        while let Some(card) = self.discard() {
            folded.push(card);
        }
        folded
    }

    pub fn reset_state(&mut self) {
        self.hand.clear();
        self.played.clear();
        self.opponent_info.clear();
        self.effects
            .retain(|e| e.duration == EffectDuration::Game);
        self.alive = true;
    }

    pub fn remove_turn_effects(&mut self) -> Vec<Effect> {
        let (removed, kept) = self
            .effects
            .drain(..)
            .partition(|e| e.duration == EffectDuration::Turn);
        self.effects = kept;
        removed
    }

    pub fn must_force_play(&self) -> bool {
        self.hand.contains(&Card::Countess)
            && (self.hand.contains(&Card::King) || self.hand.contains(&Card::Prince))
    }

    pub fn is_protected(&self) -> bool {
        self.effects.iter().any(|e| e.card == Card::Handmaid)
    }

    /// Takes every listed card out of the hand, or none of them if one is missing.
    pub fn remove_cards(&mut self, cards: &[Card]) -> Result<(), PlayerError> {
        let mut remaining = self.hand.clone();
        for &card in cards {
            remaining
                .remove_first_where(|&c| c == card)
                .ok_or(PlayerError::CardNotInHand {
                    player: self.id,
                    card,
                })?;
        }
        self.hand = remaining;
        Ok(())
    }

    pub fn set_hand(&mut self, hand: Vec<Card>) {
        self.hand = hand;
    }

    pub fn take_hand(&mut self) -> Vec<Card> {
        std::mem::take(&mut self.hand)
    }

    pub fn add_effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn remove_effect(&mut self, effect: &Effect) -> bool {
        self.effects.remove_first_where(|e| e == effect).is_some()
    }

    pub fn learn(&mut self, opponent: PlayerId, cards: Vec<Card>) {
        self.opponent_info.insert(opponent, cards);
    }

    pub fn add_point(&mut self) {
        self.score += 1;
    }

    fn push_played(&mut self, card: Card) {
        self.lifetime_rank_total += card.value();
        self.played.push(card);
    }
}
