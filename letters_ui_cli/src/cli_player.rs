use std::{
    io::{self, BufRead, Write},
    str::FromStr,
};

use itertools::Itertools;
use strum::IntoEnumIterator;

use letters_core::{
    card::Card,
    collaborator::RequestError,
    event::Event,
    play::Play,
    player::PlayerId,
    utils::SliceExtensions,
};

static RULES: &str = "
*** Love Letter ***
Stay in the round until the deck runs out, then hold the most valuable card, or be the last one standing.
Everybody starts with one hidden card. On your turn you pick up a second card and play one of the two;
most cards act when played. Press c to see what card does what. One card is set aside face down at the
start of each round and never comes back. Win a round to earn a point, three points win the game.";

#[derive(Debug, PartialEq)]
enum CliAction {
    Quit,
    Rules,
    CardEffects,
    Card(Card),
    Player(PlayerId),
}

#[derive(Debug, PartialEq, Eq)]
struct ParseActionError;

impl CliAction {
    fn info(&self, players: &[String]) -> String {
        match self {
            CliAction::Quit => "quit".to_string(),
            CliAction::Rules => "display rules".to_string(),
            CliAction::CardEffects => "display card effects".to_string(),
            CliAction::Card(c) => c.rule(),
            CliAction::Player(id) => name(players, *id),
        }
    }

    fn cmd_str(&self) -> String {
        match self {
            CliAction::Quit => "q".to_string(),
            CliAction::Rules => "r".to_string(),
            CliAction::CardEffects => "c".to_string(),
            CliAction::Card(c) => c.to_string(),
            CliAction::Player(id) => id.to_string(),
        }
    }
}

impl FromStr for CliAction {
    type Err = ParseActionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "q" => Ok(CliAction::Quit),
            "r" => Ok(CliAction::Rules),
            "c" => Ok(CliAction::CardEffects),
            _ => {
                if let Ok(card) = Card::from_str(s) {
                    Ok(CliAction::Card(card))
                } else if let Ok(id) = usize::from_str(s) {
                    Ok(CliAction::Player(id))
                } else {
                    Err(ParseActionError)
                }
            }
        }
    }
}

fn name(players: &[String], id: PlayerId) -> String {
    players
        .get(id)
        .cloned()
        .unwrap_or_else(|| format!("Player {id}"))
}

/// The seat played from the terminal. Prompts block on stdin, so callers run
/// them on a blocking thread.
#[derive(Clone)]
pub struct CliPlayer {
    pub id: PlayerId,
    pub players: Vec<String>,
}

impl CliPlayer {
    pub fn new(id: PlayerId, players: Vec<String>) -> CliPlayer {
        CliPlayer { id, players }
    }

    pub fn ask_name() -> String {
        print!("Please Enter Name: ");
        let _ = io::stdout().flush();
        match io::stdin().lock().lines().next() {
            Some(Ok(line)) if !line.trim().is_empty() => line.trim().to_string(),
            _ => "You".to_string(),
        }
    }

    /// `None` once stdin is closed.
    fn query_user(&self, cmds: &[CliAction], prompt: &str) -> Option<CliAction> {
        println!("\n{}", prompt);
        loop {
            for cmd in cmds {
                println!("- [{}]: {}", cmd.cmd_str(), cmd.info(&self.players));
            }
            print!(">");
            let _ = io::stdout().flush();
            let line = io::stdin().lock().lines().next()?.ok()?;
            match CliAction::from_str(line.trim()) {
                Ok(action) if cmds.contains(&action) => return Some(action),
                _ => println!("Unknown choice: {}", line.trim()),
            }
        }
    }

    fn with_help(options: impl IntoIterator<Item = CliAction>) -> Vec<CliAction> {
        let mut queries = vec![CliAction::Quit, CliAction::Rules, CliAction::CardEffects];
        queries.extend(options);
        queries
    }

    /// Keeps asking until one of `options` is picked. Quitting refuses the
    /// request, which costs the round.
    fn choose(&self, options: Vec<CliAction>, prompt: &str) -> Result<CliAction, RequestError> {
        let queries = Self::with_help(options);
        loop {
            match self.query_user(&queries, prompt) {
                None => return Err(RequestError::Disconnected),
                Some(CliAction::Quit) => return Err(RequestError::Refused),
                Some(CliAction::Rules) => println!("{}", RULES),
                Some(CliAction::CardEffects) => println!("{}", Card::rules()),
                Some(action) => return Ok(action),
            }
        }
    }

    fn choose_card(&self, cards: &[Card], prompt: &str) -> Result<Card, RequestError> {
        let options = cards.iter().unique().map(|&c| CliAction::Card(c)).collect();
        match self.choose(options, prompt)? {
            CliAction::Card(card) => Ok(card),
            _ => Err(RequestError::Refused),
        }
    }

    fn choose_opponent(&self, card: Card, targets: &[PlayerId]) -> Result<Option<PlayerId>, RequestError> {
        let targets = targets
            .iter()
            .copied()
            .filter(|&id| id != self.id || card.allows_self_target())
            .collect_vec();
        if targets.is_empty() {
            println!("Nobody can be targeted, the card will have no effect.");
            return Ok(None);
        }
        if let Some(&only) = targets.single_element() {
            return Ok(Some(only));
        }
        let options = targets.iter().map(|&id| CliAction::Player(id)).collect();
        match self.choose(
            options,
            "Choose the player against whom you want to play the card:",
        )? {
            CliAction::Player(id) => Ok(Some(id)),
            _ => Err(RequestError::Refused),
        }
    }

    pub fn obtain_play(&self, hand: &[Card], targets: &[PlayerId]) -> Result<Play, RequestError> {
        println!("\nYour hand: {}", hand.iter().join(", "));
        let card = self.choose_card(hand, "Choose the card you want to play:")?;
        let mut play = Play::new(card);
        if card.needs_opponent() {
            play.opponent = self.choose_opponent(card, targets)?;
        }
        if card.needs_guess() && play.opponent.is_some() {
            let guesses = Card::iter().filter(|&c| c != Card::Guard).collect_vec();
            play.guess = Some(self.choose_card(
                &guesses,
                "Choose the card you want to guess the opponent has:",
            )?);
        }
        Ok(play)
    }

    pub fn obtain_selection(&self, count: usize, available: &[Card]) -> Result<Vec<Card>, RequestError> {
        let mut remaining = available.to_vec();
        let mut selection = vec![];
        while selection.len() < count {
            let card = self.choose_card(
                &remaining,
                &format!(
                    "Choose a card to put at the bottom of the deck ({} of {}):",
                    selection.len() + 1,
                    count
                ),
            )?;
            if let Some(index) = remaining.iter().position(|&c| c == card) {
                remaining.remove(index);
            }
            selection.push(card);
        }
        Ok(selection)
    }

    fn format_play(&self, play: &Play) -> String {
        let op_str = play
            .opponent
            .map(|op| format!("\n\tOpponent: {}", name(&self.players, op)));
        let guess_str = play.guess.map(|g| format!("\n\tGuess: {g}"));
        format!(
            "\n\t{}{}{}",
            play.card,
            op_str.unwrap_or_default(),
            guess_str.unwrap_or_default()
        )
    }

    fn format_cards(cards: &[Option<Card>]) -> String {
        cards
            .iter()
            .map(|c| c.map(|c| c.to_string()).unwrap_or_else(|| "***".to_string()))
            .join(", ")
    }

    pub fn print_event(&self, event: &Event) {
        let players = &self.players;
        match event {
            Event::TurnStarted(pl) => {
                println!("================================================");
                println!("~ Turn: {}", name(players, *pl));
            }
            Event::Play(pl, p) => println!(
                "~ Play: {} played {}",
                name(players, *pl),
                self.format_play(p)
            ),
            Event::DropOut(pl) => println!("~ DropOut: {}", name(players, *pl)),
            Event::Fold(pl, c, reason) => println!(
                "~ Fold: {} folded {}, {}",
                name(players, *pl),
                c,
                reason
            ),
            Event::PickUp(pl, cards, remaining) => println!(
                "~ PickUp: {} picked up {}, {} cards remaining in deck",
                name(players, *pl),
                Self::format_cards(cards),
                remaining
            ),
            Event::LearnedCard(pl, op, cards) => println!(
                "~ LearnedCard: {} learned that {} has {}",
                name(players, *pl),
                name(players, *op),
                Self::format_cards(cards)
            ),
            Event::EffectApplied(pl, effect) => println!(
                "~ Effect: {} gained {}",
                name(players, *pl),
                effect.description
            ),
            Event::EffectRemoved(pl, effect) => println!(
                "~ Effect: {} lost {}",
                name(players, *pl),
                effect.description
            ),
            Event::HandUpdated(pl, cards) => println!(
                "~ Hand: {} now holds {}",
                name(players, *pl),
                Self::format_cards(cards)
            ),
            Event::Log(text) => println!("~ {}", text),
            Event::RoundEnded(winners) => {
                let banner = winners.iter().map(|&p| name(players, p)).join(", ");
                println!("*** Round won by {} ***", banner);
            }
            Event::Winner(winners) => {
                let banner = winners.iter().map(|&p| name(players, p)).join(", ");
                println!("Winner is {}", banner);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_action_should_parse_commands_cards_and_players() {
        assert_eq!(CliAction::from_str("q"), Ok(CliAction::Quit));
        assert_eq!(CliAction::from_str("Baron"), Ok(CliAction::Card(Card::Baron)));
        assert_eq!(CliAction::from_str("2"), Ok(CliAction::Player(2)));
        assert_eq!(CliAction::from_str("nope"), Err(ParseActionError));
    }

    #[test]
    fn hidden_cards_should_be_masked() {
        assert_eq!(
            CliPlayer::format_cards(&[Some(Card::King), None]),
            "King, ***"
        );
    }
}
