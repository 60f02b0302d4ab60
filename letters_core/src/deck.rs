use std::collections::VecDeque;

use rand::{seq::SliceRandom, Rng};

use crate::card::{Card, DeckKind};

/// Draw pile of one round plus the card put aside face down before dealing.
#[derive(Debug, Clone)]
pub struct Deck {
    draw_pile: VecDeque<Card>,
    set_aside: Card,
}

impl Deck {
    pub fn new<R: Rng + ?Sized>(kind: DeckKind, rng: &mut R) -> Self {
        let mut cards = kind.cards();
        cards.shuffle(rng);
        let mut draw_pile = VecDeque::from(cards);
        // every configuration holds more than one card
        let set_aside = draw_pile.pop_front().unwrap_or(Card::Guard);
        Deck {
            draw_pile,
            set_aside,
        }
    }

    /// A deck whose draw order is known in advance, front first.
    pub fn stacked(draw_pile: Vec<Card>, set_aside: Card) -> Self {
        Deck {
            draw_pile: draw_pile.into(),
            set_aside,
        }
    }

    pub fn draw(&mut self) -> Option<Card> {
        self.draw_pile.pop_front()
    }

    pub fn draw_many(&mut self, amount: usize) -> Vec<Card> {
        let amount = amount.min(self.draw_pile.len());
        self.draw_pile.drain(..amount).collect()
    }

    pub fn put_cards_on_bottom(&mut self, cards: &[Card]) {
        self.draw_pile.extend(cards.iter().copied());
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.draw_pile.make_contiguous().shuffle(rng);
    }

    pub fn is_empty(&self) -> bool {
        self.draw_pile.is_empty()
    }

    pub fn len(&self) -> usize {
        self.draw_pile.len()
    }

    pub fn set_aside(&self) -> Card {
        self.set_aside
    }

    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.draw_pile.iter()
    }

    /// Cards this deck accounts for, the set aside card included.
    pub fn total_cards(&self) -> usize {
        self.draw_pile.len() + 1
    }
}
