use std::collections::VecDeque;

use itertools::Itertools;

use crate::{
    action::{ActionError, ActionResult, GameAction, Outcome},
    card::Card,
    collaborator::Collaborator,
    deck::Deck,
    event::{visible, Event, EventEntry},
    game::GameId,
    player::{Player, PlayerId},
    utils::VecExtensions,
};

/// Applies atomic actions to the live state of a round, telling the
/// collaborator about each consequential step.
pub struct ActionProcessor<'a> {
    game: GameId,
    players: &'a mut [Player],
    deck: &'a mut Deck,
    history: &'a mut Vec<EventEntry>,
    collaborator: &'a dyn Collaborator,
}

impl<'a> ActionProcessor<'a> {
    pub fn new(
        game: GameId,
        players: &'a mut [Player],
        deck: &'a mut Deck,
        history: &'a mut Vec<EventEntry>,
        collaborator: &'a dyn Collaborator,
    ) -> Self {
        ActionProcessor {
            game,
            players,
            deck,
            history,
            collaborator,
        }
    }

    /// Runs every action in order, including the ones they cascade into, and
    /// reports one result per action. A failing action never stops the rest.
    pub async fn process(&mut self, actions: Vec<GameAction>) -> Vec<ActionResult> {
        let mut queue = VecDeque::from(actions);
        let mut results = vec![];
        while let Some(action) = queue.pop_front() {
            log::debug!("[game {}] applying {:?}", self.game, action);
            let result = self.apply(action, &mut queue).await;
            if let Err(e) = &result {
                log::warn!("[game {}] action skipped: {}", self.game, e);
            }
            results.push(result);
        }
        results
    }

    pub async fn notify(&mut self, entry: EventEntry) {
        log::trace!("[game {}] notify {:?}", self.game, entry);
        self.collaborator.notify(self.game, &entry).await;
        self.history.push(entry);
    }

    async fn apply(&mut self, action: GameAction, queue: &mut VecDeque<GameAction>) -> ActionResult {
        match action {
            GameAction::Draw { player, amount } => {
                self.living(player)?;
                let cards = self.deck.draw_many(amount);
                self.living(player)?.draw(cards.iter().copied());
                let remaining = self.deck.len();
                self.notify(EventEntry::private(
                    player,
                    Event::PickUp(player, visible(&cards), remaining),
                ))
                .await;
                Ok(Outcome::Applied)
            }
            GameAction::Discard { player, card } => {
                let card = self.living(player)?.play(card)?;
                self.notify(EventEntry::public(Event::Fold(
                    player,
                    card,
                    "forced to discard".to_string(),
                )))
                .await;
                if card == Card::Princess {
                    queue.push_front(GameAction::Eliminate(vec![player]));
                }
                Ok(Outcome::Applied)
            }
            GameAction::DiscardSelection { player, amount } => {
                match self.select(player, amount).await? {
                    Some(selection) => {
                        for card in selection.into_iter().rev() {
                            queue.push_front(GameAction::Discard { player, card });
                        }
                        Ok(Outcome::Applied)
                    }
                    None => self.penalize(player, queue),
                }
            }
            GameAction::PlaceCardsOnBottom { player, amount } => {
                let Some(selection) = self.select(player, amount).await? else {
                    return self.penalize(player, queue);
                };
                let holder = self.living(player)?;
                holder.remove_cards(&selection)?;
                let hand = visible(holder.hand());
                let name = holder.name().to_string();
                self.deck.put_cards_on_bottom(&selection);
                self.notify(EventEntry::private(player, Event::HandUpdated(player, hand)))
                    .await;
                self.notify(EventEntry::public(Event::Log(format!(
                    "{} put {} card(s) at the bottom of the deck",
                    name,
                    selection.len()
                ))))
                .await;
                Ok(Outcome::Applied)
            }
            GameAction::Eliminate(ids) => {
                let mut eliminated = vec![];
                for id in ids {
                    let index = self.index_of(id)?;
                    if !self.players[index].is_alive() {
                        continue;
                    }
                    let folded = self.players[index].die();
                    for card in folded {
                        self.notify(EventEntry::public(Event::Fold(
                            id,
                            card,
                            "dropped out of the round".to_string(),
                        )))
                        .await;
                    }
                    self.notify(EventEntry::public(Event::DropOut(id))).await;
                    eliminated.push(id);
                }
                Ok(Outcome::Eliminated(eliminated))
            }
            GameAction::AddInfo {
                player,
                target,
                cards,
            } => {
                self.living(player)?.learn(target, cards.clone());
                let names = (self.name_of(player)?, self.name_of(target)?);
                self.notify(EventEntry::private(
                    player,
                    Event::LearnedCard(player, target, visible(&cards)),
                ))
                .await;
                self.notify(EventEntry::public(Event::Log(format!(
                    "{} looked at the hand of {}",
                    names.0, names.1
                ))))
                .await;
                Ok(Outcome::Applied)
            }
            GameAction::AddEffect { player, effects } => {
                for effect in effects {
                    self.living(player)?.add_effect(effect.clone());
                    self.notify(EventEntry::public(Event::EffectApplied(player, effect)))
                        .await;
                }
                Ok(Outcome::Applied)
            }
            GameAction::RemoveEffect { player, effects } => {
                for effect in effects {
                    if self.living(player)?.remove_effect(&effect) {
                        self.notify(EventEntry::public(Event::EffectRemoved(player, effect)))
                            .await;
                    }
                }
                Ok(Outcome::Applied)
            }
            GameAction::Swap { player, target } => {
                let (a, b) = (self.index_of(player)?, self.index_of(target)?);
                for id in [player, target] {
                    self.living(id)?;
                }
                if a != b {
                    let hand = self.players[a].take_hand();
                    let other = self.players[b].take_hand();
                    self.players[a].set_hand(other);
                    self.players[b].set_hand(hand);
                }
                for index in [a, b].into_iter().unique() {
                    let id = self.players[index].id();
                    let hand = visible(self.players[index].hand());
                    self.notify(EventEntry::private(id, Event::HandUpdated(id, hand)))
                        .await;
                }
                let text = format!(
                    "{} swapped hands with {}",
                    self.players[a].name(),
                    self.players[b].name()
                );
                self.notify(EventEntry::public(Event::Log(text))).await;
                Ok(Outcome::Applied)
            }
            GameAction::NoEffect => {
                self.notify(EventEntry::public(Event::Log(
                    "The action had no effect".to_string(),
                )))
                .await;
                Ok(Outcome::Applied)
            }
            GameAction::Log(text) => {
                self.notify(EventEntry::public(Event::Log(text))).await;
                Ok(Outcome::Applied)
            }
        }
    }

    /// Asks `player` for `amount` of their hand cards. `None` means the
    /// answer was missing or unusable.
    async fn select(&mut self, player: PlayerId, amount: usize) -> Result<Option<Vec<Card>>, ActionError> {
        let hand = self.living(player)?.hand().to_vec();
        if amount == 0 {
            return Ok(Some(vec![]));
        }
        let answer = self
            .collaborator
            .request_card_selection(self.game, player, amount, &hand)
            .await;
        match answer {
            Ok(selection) if selection.len() == amount && holds_all(&hand, &selection) => {
                Ok(Some(selection))
            }
            Ok(selection) => {
                log::warn!(
                    "[game {}] player {} selected {:?} out of {:?}, {} card(s) were requested",
                    self.game,
                    player,
                    selection,
                    hand,
                    amount
                );
                Ok(None)
            }
            Err(e) => {
                log::warn!("[game {}] player {} did not select: {}", self.game, player, e);
                Ok(None)
            }
        }
    }

    fn penalize(&mut self, player: PlayerId, queue: &mut VecDeque<GameAction>) -> ActionResult {
        let name = self.name_of(player)?;
        queue.push_front(GameAction::Eliminate(vec![player]));
        queue.push_front(GameAction::Log(format!(
            "{} did not make a valid selection",
            name
        )));
        Ok(Outcome::Penalized(player))
    }

    fn index_of(&self, id: PlayerId) -> Result<usize, ActionError> {
        self.players
            .iter()
            .position(|p| p.id() == id)
            .ok_or(ActionError::UnknownPlayer(id))
    }

    fn name_of(&self, id: PlayerId) -> Result<String, ActionError> {
        Ok(self.players[self.index_of(id)?].name().to_string())
    }

    fn living(&mut self, id: PlayerId) -> Result<&mut Player, ActionError> {
        let index = self.index_of(id)?;
        let player = &mut self.players[index];
        if player.is_alive() {
            Ok(player)
        } else {
            Err(ActionError::PlayerEliminated(id))
        }
    }
}

fn holds_all(hand: &[Card], selection: &[Card]) -> bool {
    let mut remaining = hand.to_vec();
    selection
        .iter()
        .all(|&card| remaining.remove_first_where(|&c| c == card).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::Effect,
        collaborator::RequestError,
        testing::{seated, ScriptedCollaborator},
    };
    use uuid::Uuid;

    struct Table {
        players: Vec<Player>,
        deck: Deck,
        history: Vec<EventEntry>,
        collaborator: ScriptedCollaborator,
    }

    impl Table {
        fn new(hands: &[&[Card]], pile: &[Card]) -> Self {
            Table {
                players: seated(hands),
                deck: Deck::stacked(pile.to_vec(), Card::Spy),
                history: vec![],
                collaborator: ScriptedCollaborator::new(),
            }
        }

        async fn run(&mut self, actions: Vec<GameAction>) -> Vec<ActionResult> {
            ActionProcessor::new(
                Uuid::nil(),
                &mut self.players,
                &mut self.deck,
                &mut self.history,
                &self.collaborator,
            )
            .process(actions)
            .await
        }
    }

    #[tokio::test]
    async fn draw_should_move_cards_from_deck_to_hand() {
        let mut table = Table::new(&[&[Card::Guard]], &[Card::King, Card::Baron]);

        let results = table
            .run(vec![GameAction::Draw {
                player: 0,
                amount: 1,
            }])
            .await;

        assert_eq!(results, vec![Ok(Outcome::Applied)]);
        assert_eq!(table.players[0].hand(), &[Card::Guard, Card::King]);
        assert_eq!(table.deck.len(), 1);
        assert_eq!(
            table.collaborator.events(),
            vec![EventEntry::private(
                0,
                Event::PickUp(0, vec![Some(Card::King)], 1)
            )]
        );
    }

    #[tokio::test]
    async fn discarding_the_princess_should_eliminate() {
        let mut table = Table::new(&[&[Card::Princess], &[Card::Guard]], &[Card::King]);

        let results = table
            .run(vec![
                GameAction::Discard {
                    player: 0,
                    card: Card::Princess,
                },
                GameAction::Draw {
                    player: 0,
                    amount: 1,
                },
            ])
            .await;

        assert_eq!(
            results,
            vec![
                Ok(Outcome::Applied),
                Ok(Outcome::Eliminated(vec![0])),
                Err(ActionError::PlayerEliminated(0)),
            ]
        );
        assert!(!table.players[0].is_alive());
        assert_eq!(table.deck.len(), 1);
    }

    #[tokio::test]
    async fn eliminate_should_fold_the_whole_hand_and_ignore_the_dead() {
        let mut table = Table::new(&[&[Card::Guard, Card::Baron], &[Card::King]], &[]);
        table.players[1].die();

        let results = table.run(vec![GameAction::Eliminate(vec![0, 1])]).await;

        assert_eq!(results, vec![Ok(Outcome::Eliminated(vec![0]))]);
        assert!(table.players[0].hand().is_empty());
        assert_eq!(table.players[0].played(), &[Card::Guard, Card::Baron]);
        assert!(table
            .collaborator
            .events()
            .contains(&EventEntry::public(Event::DropOut(0))));
    }

    #[tokio::test]
    async fn unknown_player_should_be_reported_as_fatal_without_stopping() {
        let mut table = Table::new(&[&[Card::Guard]], &[]);

        let results = table
            .run(vec![
                GameAction::Eliminate(vec![9]),
                GameAction::Log("still running".to_string()),
            ])
            .await;

        assert!(results[0].as_ref().unwrap_err().is_fatal());
        assert_eq!(results[1], Ok(Outcome::Applied));
    }

    #[tokio::test]
    async fn place_cards_on_bottom_should_return_the_selection() {
        let mut table = Table::new(
            &[&[Card::Guard, Card::Princess, Card::Baron], &[Card::King]],
            &[Card::Priest],
        );
        table
            .collaborator
            .select(Ok(vec![Card::Guard, Card::Baron]));

        let results = table
            .run(vec![GameAction::PlaceCardsOnBottom {
                player: 0,
                amount: 2,
            }])
            .await;

        assert_eq!(results, vec![Ok(Outcome::Applied)]);
        assert_eq!(table.players[0].hand(), &[Card::Princess]);
        assert_eq!(
            table.deck.cards().copied().collect::<Vec<_>>(),
            vec![Card::Priest, Card::Guard, Card::Baron]
        );
    }

    #[tokio::test]
    async fn invalid_selection_should_eliminate_as_a_penalty() {
        for answer in [
            Ok(vec![Card::Guard]),
            Ok(vec![Card::King, Card::Guard]),
            Ok(vec![Card::Guard, Card::Guard]),
            Err(RequestError::TimedOut),
        ] {
            let mut table = Table::new(
                &[&[Card::Guard, Card::Princess, Card::Baron], &[Card::King]],
                &[],
            );
            table.collaborator.select(answer);

            let results = table
                .run(vec![GameAction::PlaceCardsOnBottom {
                    player: 0,
                    amount: 2,
                }])
                .await;

            assert_eq!(results[0], Ok(Outcome::Penalized(0)));
            assert_eq!(results.last(), Some(&Ok(Outcome::Eliminated(vec![0]))));
            assert!(!table.players[0].is_alive());
            assert_eq!(table.players[0].played().len(), 3);
            assert!(table.deck.is_empty());
        }
    }

    #[tokio::test]
    async fn discard_selection_should_discard_each_selected_card() {
        let mut table = Table::new(&[&[Card::Guard, Card::Princess, Card::Baron]], &[]);
        table.collaborator.select(Ok(vec![Card::Baron, Card::Guard]));

        let results = table
            .run(vec![GameAction::DiscardSelection {
                player: 0,
                amount: 2,
            }])
            .await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(Result::is_ok));
        assert_eq!(table.players[0].hand(), &[Card::Princess]);
        assert_eq!(table.players[0].played(), &[Card::Baron, Card::Guard]);
        assert!(table.players[0].is_alive());
    }

    #[tokio::test]
    async fn swap_should_exchange_hands_and_tell_both() {
        let mut table = Table::new(&[&[Card::Guard], &[Card::Princess]], &[]);

        let results = table
            .run(vec![GameAction::Swap {
                player: 0,
                target: 1,
            }])
            .await;

        assert_eq!(results, vec![Ok(Outcome::Applied)]);
        assert_eq!(table.players[0].hand(), &[Card::Princess]);
        assert_eq!(table.players[1].hand(), &[Card::Guard]);
        let events = table.collaborator.events();
        assert!(events.contains(&EventEntry::private(
            0,
            Event::HandUpdated(0, vec![Some(Card::Princess)])
        )));
        assert!(events.contains(&EventEntry::private(
            1,
            Event::HandUpdated(1, vec![Some(Card::Guard)])
        )));
    }

    #[tokio::test]
    async fn effects_and_info_should_update_the_player() {
        let mut table = Table::new(&[&[Card::Guard], &[Card::Countess]], &[]);

        table
            .run(vec![
                GameAction::AddEffect {
                    player: 0,
                    effects: vec![Effect::protection()],
                },
                GameAction::AddInfo {
                    player: 0,
                    target: 1,
                    cards: vec![Card::Countess],
                },
            ])
            .await;

        assert!(table.players[0].is_protected());
        assert_eq!(
            table.players[0].opponent_info().get(&1),
            Some(&vec![Card::Countess])
        );

        table
            .run(vec![GameAction::RemoveEffect {
                player: 0,
                effects: vec![Effect::protection()],
            }])
            .await;

        assert!(!table.players[0].is_protected());
    }

    #[tokio::test]
    async fn every_notification_should_be_kept_in_history() {
        let mut table = Table::new(&[&[Card::Guard]], &[]);

        table
            .run(vec![GameAction::NoEffect, GameAction::Log("hello".to_string())])
            .await;

        assert_eq!(table.history, table.collaborator.events());
        assert_eq!(
            table.history.last(),
            Some(&EventEntry::public(Event::Log("hello".to_string())))
        );
    }
}
