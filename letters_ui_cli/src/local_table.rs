use async_trait::async_trait;

use letters_core::{
    card::Card,
    collaborator::{Collaborator, RequestError},
    event::EventEntry,
    game::GameId,
    play::Play,
    player::PlayerId,
    random_playing_computer::RandomPlayingComputer,
};

use crate::cli_player::CliPlayer;

/// One seat at the terminal, every other seat played by the computer.
pub struct LocalTable {
    human: CliPlayer,
    computer: RandomPlayingComputer,
}

impl LocalTable {
    pub fn new(human: CliPlayer, computer: RandomPlayingComputer) -> Self {
        LocalTable { human, computer }
    }

    async fn ask<T, F>(&self, prompt: F) -> Result<T, RequestError>
    where
        T: Send + 'static,
        F: FnOnce(CliPlayer) -> Result<T, RequestError> + Send + 'static,
    {
        let human = self.human.clone();
        tokio::task::spawn_blocking(move || prompt(human))
            .await
            .map_err(|e| {
                log::error!("terminal prompt failed: {}", e);
                RequestError::Disconnected
            })?
    }
}

#[async_trait]
impl Collaborator for LocalTable {
    async fn get_player_action(
        &self,
        game: GameId,
        player: PlayerId,
        hand: &[Card],
        legal_targets: &[PlayerId],
    ) -> Result<Play, RequestError> {
        if player != self.human.id {
            return self
                .computer
                .get_player_action(game, player, hand, legal_targets)
                .await;
        }
        let (hand, targets) = (hand.to_vec(), legal_targets.to_vec());
        self.ask(move |human| human.obtain_play(&hand, &targets))
            .await
    }

    async fn request_card_selection(
        &self,
        game: GameId,
        player: PlayerId,
        count: usize,
        available: &[Card],
    ) -> Result<Vec<Card>, RequestError> {
        if player != self.human.id {
            return self
                .computer
                .request_card_selection(game, player, count, available)
                .await;
        }
        let available = available.to_vec();
        self.ask(move |human| human.obtain_selection(count, &available))
            .await
    }

    async fn notify(&self, _game: GameId, entry: &EventEntry) {
        self.human.print_event(&entry.event_for(Some(self.human.id)));
    }
}
