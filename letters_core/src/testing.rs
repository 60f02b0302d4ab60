use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{
    card::Card,
    collaborator::{Collaborator, RequestError},
    event::{Event, EventEntry},
    game::GameId,
    play::Play,
    player::{Participant, Player, PlayerId},
    random_playing_computer::RandomPlayingComputer,
};

/// Players 0..n named P0, P1, ... holding the given hands.
pub fn seated(hands: &[&[Card]]) -> Vec<Player> {
    hands
        .iter()
        .enumerate()
        .map(|(id, hand)| {
            let mut player = Player::new(Participant::new(id, &format!("P{id}")));
            player.draw(hand.iter().copied());
            player
        })
        .collect()
}

pub fn participants(count: usize) -> Vec<Participant> {
    (0..count)
        .map(|id| Participant::new(id, &format!("P{id}")))
        .collect()
}

/// Answers from scripted queues first and falls back to random legal
/// decisions once a queue runs dry. Records every notification and request.
pub struct ScriptedCollaborator {
    plays: Mutex<VecDeque<Result<Play, RequestError>>>,
    selections: Mutex<VecDeque<Result<Vec<Card>, RequestError>>>,
    events: Mutex<Vec<EventEntry>>,
    asked: Mutex<Vec<(PlayerId, Vec<Card>, Vec<PlayerId>)>>,
    fallback: RandomPlayingComputer,
}

impl ScriptedCollaborator {
    pub fn new() -> Self {
        ScriptedCollaborator {
            plays: Mutex::new(VecDeque::new()),
            selections: Mutex::new(VecDeque::new()),
            events: Mutex::new(vec![]),
            asked: Mutex::new(vec![]),
            fallback: RandomPlayingComputer::seeded(17),
        }
    }

    pub fn play(&self, answer: Result<Play, RequestError>) {
        self.plays.lock().unwrap().push_back(answer);
    }

    pub fn select(&self, answer: Result<Vec<Card>, RequestError>) {
        self.selections.lock().unwrap().push_back(answer);
    }

    pub fn events(&self) -> Vec<EventEntry> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| predicate(&e.event))
            .count()
    }

    /// Every action request as (player, hand, legal targets).
    pub fn asked(&self) -> Vec<(PlayerId, Vec<Card>, Vec<PlayerId>)> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl Collaborator for ScriptedCollaborator {
    async fn get_player_action(
        &self,
        game: GameId,
        player: PlayerId,
        hand: &[Card],
        legal_targets: &[PlayerId],
    ) -> Result<Play, RequestError> {
        self.asked
            .lock()
            .unwrap()
            .push((player, hand.to_vec(), legal_targets.to_vec()));
        let scripted = self.plays.lock().unwrap().pop_front();
        match scripted {
            Some(answer) => answer,
            None => {
                self.fallback
                    .get_player_action(game, player, hand, legal_targets)
                    .await
            }
        }
    }

    async fn request_card_selection(
        &self,
        game: GameId,
        player: PlayerId,
        count: usize,
        available: &[Card],
    ) -> Result<Vec<Card>, RequestError> {
        let scripted = self.selections.lock().unwrap().pop_front();
        match scripted {
            Some(answer) => answer,
            None => {
                self.fallback
                    .request_card_selection(game, player, count, available)
                    .await
            }
        }
    }

    async fn notify(&self, _game: GameId, entry: &EventEntry) {
        self.events.lock().unwrap().push(entry.clone());
    }
}
