use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::{EnumMessage, IntoEnumIterator};
use strum_macros::{Display, EnumIter, EnumMessage, EnumString};

#[derive(
    Debug,
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    PartialOrd,
    Ord,
    Display,
    EnumIter,
    EnumString,
    EnumMessage,
    Serialize,
    Deserialize,
)]
pub enum Card {
    #[strum(
        message = "If you play this card, nothing happens right away, but you are marked as a spy until the end of the round."
    )]
    Spy,
    #[strum(
        message = "If you play this card, you choose an opponent and attempt to guess their card. If you guess right they drop out of the round. You may not guess the Guard."
    )]
    Guard,
    #[strum(message = "If you play this card, you choose an opponent and see their card.")]
    Priest,
    #[strum(
        message = "If you play this card, you compare your other card against the card of an opponent. The one with the lower card drops out of the round. If they are equal no one drops out."
    )]
    Baron,
    #[strum(
        message = "If you play this card, you cannot be targeted by other players until your next turn."
    )]
    Handmaid,
    #[strum(
        message = "If you play this card, you force a player (yourself included) to fold their card and fetch a new one from the deck."
    )]
    Prince,
    #[strum(
        message = "If you play this card, you draw two cards and then put two cards of your choice at the bottom of the deck."
    )]
    Chancellor,
    #[strum(
        message = "If you play this card, you choose an opponent and exchange your other card with theirs."
    )]
    King,
    #[strum(
        message = "If you in addition to this card hold either Prince or King, you must play it instead of the King or Prince."
    )]
    Countess,
    #[strum(
        message = "You must never play this card. If you play or fold it by any means (for example if an opponent plays the Prince), you drop out."
    )]
    Princess,
}

impl Card {
    pub fn rules() -> String {
        Card::iter().map(|c| c.rule()).join("\n")
    }

    pub fn needs_guess(&self) -> bool {
        self == &Card::Guard
    }

    pub fn needs_opponent(&self) -> bool {
        matches!(
            self,
            Card::Guard | Card::Priest | Card::Baron | Card::Prince | Card::King
        )
    }

    /// Only the Prince may be aimed at the player who plays it.
    pub fn allows_self_target(&self) -> bool {
        self == &Card::Prince
    }

    pub fn rule(&self) -> String {
        format!(
            "{} [value = {}]: {}",
            self,
            self.value(),
            self.get_message().unwrap_or("No rule")
        )
    }

    pub fn value(&self) -> u32 {
        *self as u32
    }
}

/// Card multisets a round can be dealt from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeckKind {
    #[default]
    Classic,
    Extended,
}

impl DeckKind {
    pub fn counts(&self) -> &'static [(Card, usize)] {
        match self {
            DeckKind::Classic => &[
                (Card::Princess, 1),
                (Card::Countess, 1),
                (Card::King, 1),
                (Card::Prince, 2),
                (Card::Handmaid, 2),
                (Card::Baron, 2),
                (Card::Priest, 2),
                (Card::Guard, 5),
            ],
            DeckKind::Extended => &[
                (Card::Princess, 1),
                (Card::Countess, 1),
                (Card::King, 1),
                (Card::Chancellor, 2),
                (Card::Prince, 2),
                (Card::Handmaid, 2),
                (Card::Baron, 2),
                (Card::Priest, 2),
                (Card::Guard, 6),
                (Card::Spy, 2),
            ],
        }
    }

    pub fn cards(&self) -> Vec<Card> {
        self.counts()
            .iter()
            .flat_map(|&(card, count)| std::iter::repeat(card).take(count))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.counts().iter().map(|(_, count)| count).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectDuration {
    Turn,
    Round,
    Game,
}

/// A temporary status attached to a player by a played card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Effect {
    pub card: Card,
    pub duration: EffectDuration,
    pub description: String,
}

impl Effect {
    pub fn new(card: Card, duration: EffectDuration, description: &str) -> Self {
        Effect {
            card,
            duration,
            description: description.to_string(),
        }
    }

    pub fn protection() -> Self {
        Effect::new(
            Card::Handmaid,
            EffectDuration::Turn,
            "protected until the start of the next own turn",
        )
    }

    pub fn spy() -> Self {
        Effect::new(Card::Spy, EffectDuration::Round, "played a spy this round")
    }
}
