use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::card::DeckKind;

/// How long a participant may think before the request counts as unanswered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    pub action: Duration,
    pub selection: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Timeouts {
            action: Duration::from_secs(120),
            selection: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub win_score: u32,
    pub deck: DeckKind,
    /// Rounds after which a game without a winner is given up.
    pub max_rounds: u32,
    pub seed: Option<u64>,
    pub timeouts: Timeouts,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            win_score: 3,
            deck: DeckKind::Classic,
            max_rounds: 100,
            seed: None,
            timeouts: Timeouts::default(),
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = GameConfig::default();
        assert_eq!(config.win_score, 3);
        assert_eq!(config.deck, DeckKind::Classic);
        assert_eq!(config.timeouts.action, Duration::from_secs(120));
        assert_eq!(config.timeouts.selection, Duration::from_secs(60));
    }

    #[test]
    fn partial_json_should_fill_in_defaults() {
        let config =
            GameConfig::from_json(r#"{ "win_score": 5, "deck": "Extended", "seed": 9 }"#).unwrap();

        assert_eq!(config.win_score, 5);
        assert_eq!(config.deck, DeckKind::Extended);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.max_rounds, 100);
        assert_eq!(config.timeouts, Timeouts::default());
    }

    #[test]
    fn timeouts_should_read_from_json() {
        let config = GameConfig::from_json(
            r#"{ "timeouts": { "action": { "secs": 5, "nanos": 0 } } }"#,
        )
        .unwrap();

        assert_eq!(config.timeouts.action, Duration::from_secs(5));
        assert_eq!(config.timeouts.selection, Duration::from_secs(60));
    }
}
