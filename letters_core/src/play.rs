use serde::{Deserialize, Serialize};

use crate::{card::Card, player::PlayerId};

/// A decision returned by a participant for the current turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Play {
    pub card: Card,
    pub opponent: Option<PlayerId>,
    pub guess: Option<Card>,
}

impl Play {
    pub fn new(card: Card) -> Self {
        Play {
            card,
            opponent: None,
            guess: None,
        }
    }

    pub fn against(card: Card, opponent: PlayerId) -> Self {
        Play {
            card,
            opponent: Some(opponent),
            guess: None,
        }
    }

    pub fn guessing(opponent: PlayerId, guess: Card) -> Self {
        Play {
            card: Card::Guard,
            opponent: Some(opponent),
            guess: Some(guess),
        }
    }
}
