use std::collections::VecDeque;

use itertools::Itertools;
use rand::{seq::SliceRandom, Rng};
use thiserror::Error;

use crate::{
    action::{ActionError, GameAction},
    card::Card,
    collaborator::{Collaborator, RequestError},
    deck::Deck,
    event::{Event, EventEntry, EventVisibility},
    game::GameId,
    play::Play,
    player::{Player, PlayerError, PlayerId},
    processor::ActionProcessor,
    resolver::{resolve, ResolveContext, ResolveError},
};

#[derive(Debug, Error)]
pub enum RoundError {
    #[error("no living players are left in the rotation")]
    NoLivingPlayers,
    #[error("player {0} is not seated in this round")]
    UnknownPlayer(PlayerId),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error(transparent)]
    Player(#[from] PlayerError),
}

/// Reasons a turn's decision is refused. Every one of them costs the player
/// the round.
#[derive(Debug, Error)]
enum Rejection {
    #[error("{0}")]
    NoAnswer(#[from] RequestError),
    #[error("{0}")]
    Illegal(#[from] ResolveError),
    #[error("{0}")]
    NotHeld(#[from] PlayerError),
}

/// What a round may touch of the game that runs it.
pub struct GameView<'a> {
    pub id: GameId,
    pub players: &'a mut [Player],
    pub history: &'a mut Vec<EventEntry>,
    pub collaborator: &'a dyn Collaborator,
}

pub struct Round<'a> {
    view: GameView<'a>,
    deck: Deck,
    order: VecDeque<PlayerId>,
}

impl<'a> Round<'a> {
    /// Seats everyone in roster order starting with the chosen starter and
    /// clears what the players kept from the previous round.
    pub fn new<R: Rng + ?Sized>(
        view: GameView<'a>,
        deck: Deck,
        last_winners: &[PlayerId],
        rng: &mut R,
    ) -> Result<Self, RoundError> {
        let starter =
            starting_player(&*view.players, last_winners, rng).ok_or(RoundError::NoLivingPlayers)?;
        let mut order: VecDeque<PlayerId> = view.players.iter().map(Player::id).collect();
        let offset = order.iter().position(|&id| id == starter).unwrap_or(0);
        order.rotate_left(offset);
        for player in view.players.iter_mut() {
            player.reset_state();
        }
        log::debug!("[game {}] round order {:?}", view.id, order);
        Ok(Round { view, deck, order })
    }

    pub fn deck(&self) -> &Deck {
        &self.deck
    }

    pub fn players(&self) -> &[Player] {
        &*self.view.players
    }

    pub fn order(&self) -> Vec<PlayerId> {
        self.order.iter().copied().collect()
    }

    pub fn is_over(&self) -> bool {
        self.order.len() <= 1 || self.deck.is_empty()
    }

    /// Deals, plays turns until the round is decided and returns its winners.
    pub async fn run(mut self) -> Result<Vec<PlayerId>, RoundError> {
        self.deal().await?;
        while !self.is_over() {
            self.take_turn().await?;
        }
        Ok(self.finish().await)
    }

    pub async fn deal(&mut self) -> Result<(), RoundError> {
        let actions = self
            .order
            .iter()
            .map(|&player| GameAction::Draw { player, amount: 1 })
            .collect();
        self.apply(actions).await
    }

    pub async fn take_turn(&mut self) -> Result<(), RoundError> {
        let id = self.order.pop_front().ok_or(RoundError::NoLivingPlayers)?;
        let index = self.index_of(id)?;
        log::debug!("[game {}] turn of {}", self.view.id, self.view.players[index].name());

        for effect in self.view.players[index].remove_turn_effects() {
            self.notify(EventEntry::public(Event::EffectRemoved(id, effect)))
                .await;
        }
        self.notify(EventEntry::public(Event::TurnStarted(id))).await;
        if !self.deck.is_empty() {
            self.apply(vec![GameAction::Draw {
                player: id,
                amount: 1,
            }])
            .await?;
        }

        if self.view.players[index].hand().is_empty() {
            log::warn!("[game {}] player {} has nothing to play", self.view.id, id);
        } else {
            match self.decide(index).await {
                Ok(play) => self.play_card(index, play).await?,
                Err(rejection) => self.penalize(index, rejection).await?,
            }
        }

        if self.view.players[index].is_alive() {
            self.order.push_back(id);
        }
        let players = &*self.view.players;
        self.order
            .retain(|&id| players.iter().any(|p| p.id() == id && p.is_alive()));
        Ok(())
    }

    async fn decide(&mut self, index: usize) -> Result<Play, Rejection> {
        let player = &self.view.players[index];
        let id = player.id();
        if player.must_force_play() {
            let text = format!("{} must play the Countess", player.name());
            self.notify(EventEntry::public(Event::Log(text))).await;
            return Ok(Play::new(Card::Countess));
        }
        let hand = player.hand().to_vec();
        let targets = self.legal_targets();
        let play = self
            .view
            .collaborator
            .get_player_action(self.view.id, id, &hand, &targets)
            .await?;
        Ok(play)
    }

    async fn play_card(&mut self, index: usize, play: Play) -> Result<(), RoundError> {
        let id = self.view.players[index].id();
        let resolved = if self.view.players[index].hand().contains(&play.card) {
            let ctx = ResolveContext {
                source: id,
                players: &*self.view.players,
                deck_remaining: self.deck.len(),
            };
            resolve(play.card, &ctx, &play).map_err(Rejection::from)
        } else {
            Err(Rejection::NotHeld(PlayerError::CardNotInHand {
                player: id,
                card: play.card,
            }))
        };
        let actions = match resolved {
            Ok(actions) => actions,
            Err(rejection) => return self.penalize(index, rejection).await,
        };

        self.view.players[index].play(play.card)?;
        self.notify(EventEntry::public(Event::Play(id, play))).await;
        self.apply(actions).await
    }

    async fn penalize(&mut self, index: usize, rejection: Rejection) -> Result<(), RoundError> {
        let player = &self.view.players[index];
        log::warn!(
            "[game {}] {} is out of the round: {}",
            self.view.id,
            player.name(),
            rejection
        );
        let actions = vec![
            GameAction::Log(format!("{} is out of the round: {}", player.name(), rejection)),
            GameAction::Eliminate(vec![player.id()]),
        ];
        self.apply(actions).await
    }

    /// Announces the surviving hands and the winners, then opens the round's
    /// private history to everyone.
    async fn finish(&mut self) -> Vec<PlayerId> {
        let winners = round_winners(&*self.view.players);
        let reveals = self
            .view
            .players
            .iter()
            .filter(|p| p.is_alive())
            .map(|p| format!("{} ends the round holding {}", p.name(), p.hand().iter().join(", ")))
            .collect_vec();
        for text in reveals {
            self.notify(EventEntry::public(Event::Log(text))).await;
        }
        log::info!("[game {}] round won by {:?}", self.view.id, winners);
        self.notify(EventEntry::public(Event::RoundEnded(winners.clone())))
            .await;
        for e in self.view.history.iter_mut() {
            e.visibility = EventVisibility::Public;
        }
        winners
    }

    /// Living, unprotected players, the one whose turn it is included.
    fn legal_targets(&self) -> Vec<PlayerId> {
        self.view
            .players
            .iter()
            .filter(|p| p.is_alive() && !p.is_protected())
            .map(Player::id)
            .collect()
    }

    fn index_of(&self, id: PlayerId) -> Result<usize, RoundError> {
        self.view
            .players
            .iter()
            .position(|p| p.id() == id)
            .ok_or(RoundError::UnknownPlayer(id))
    }

    fn processor(&mut self) -> ActionProcessor<'_> {
        ActionProcessor::new(
            self.view.id,
            &mut *self.view.players,
            &mut self.deck,
            &mut *self.view.history,
            self.view.collaborator,
        )
    }

    async fn notify(&mut self, entry: EventEntry) {
        self.processor().notify(entry).await;
    }

    async fn apply(&mut self, actions: Vec<GameAction>) -> Result<(), RoundError> {
        let results = self.processor().process(actions).await;
        match results
            .into_iter()
            .filter_map(Result::err)
            .find(ActionError::is_fatal)
        {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

/// No previous winner: anyone. One: that one. Several: whoever played the
/// most valuable cards last round, ties at random.
pub fn starting_player<R: Rng + ?Sized>(
    players: &[Player],
    last_winners: &[PlayerId],
    rng: &mut R,
) -> Option<PlayerId> {
    let candidates = players
        .iter()
        .filter(|p| last_winners.contains(&p.id()))
        .collect_vec();
    match candidates.len() {
        0 => players.choose(rng).map(Player::id),
        1 => Some(candidates[0].id()),
        _ => {
            let best = candidates.iter().map(|p| p.played_rank_total()).max()?;
            candidates
                .into_iter()
                .filter(|p| p.played_rank_total() == best)
                .collect_vec()
                .choose(rng)
                .map(|p| p.id())
        }
    }
}

/// The last survivor, or every survivor holding the highest card.
pub fn round_winners(players: &[Player]) -> Vec<PlayerId> {
    let living = players.iter().filter(|p| p.is_alive()).collect_vec();
    let best = living.iter().filter_map(|p| p.highest_card()).max();
    living
        .into_iter()
        .filter(|p| p.highest_card() == best)
        .map(Player::id)
        .collect()
}
