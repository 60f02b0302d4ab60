use std::{collections::HashMap, sync::Arc};

use thiserror::Error;
use tokio::{
    sync::{mpsc::UnboundedSender, RwLock},
    task::AbortHandle,
};

use crate::{
    card::Card,
    config::GameConfig,
    game::{Game, GameError, GameId},
    pending::{PendingRequests, RequestId, Response, SubmitError},
    play::Play,
    player::{Participant, PlayerId},
    remote::{Outbound, RemoteCollaborator},
};

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Game(#[from] GameError),
    #[error("game {0} is not running")]
    NotFound(GameId),
    #[error("player {0} is already seated in a running game")]
    AlreadyPlaying(PlayerId),
    #[error(transparent)]
    Submit(#[from] SubmitError),
}

struct GameHandle {
    players: Vec<PlayerId>,
    abort: AbortHandle,
}

/// Runs many games side by side, each in its own task, and routes the
/// participants' answers back to them.
pub struct GameHost {
    games: RwLock<HashMap<GameId, GameHandle>>,
    pending: Arc<PendingRequests>,
    outbox: UnboundedSender<Outbound>,
    config: GameConfig,
}

impl GameHost {
    pub fn new(outbox: UnboundedSender<Outbound>, config: GameConfig) -> Self {
        GameHost {
            games: RwLock::new(HashMap::new()),
            pending: Arc::new(PendingRequests::new()),
            outbox,
            config,
        }
    }

    pub fn pending(&self) -> &PendingRequests {
        &self.pending
    }

    pub async fn start(self: &Arc<Self>, participants: Vec<Participant>) -> Result<GameId, HostError> {
        self.start_with(participants, self.config.clone()).await
    }

    /// Registers the game and spawns it. The entry is inserted before the
    /// registry lock is released and removed by a supervisor once the game
    /// task ends, whether it finished, failed, panicked or was closed.
    pub async fn start_with(
        self: &Arc<Self>,
        participants: Vec<Participant>,
        config: GameConfig,
    ) -> Result<GameId, HostError> {
        let mut games = self.games.write().await;
        if let Some(busy) = participants
            .iter()
            .find(|p| games.values().any(|g| g.players.contains(&p.id)))
        {
            return Err(HostError::AlreadyPlaying(busy.id));
        }

        let collaborator = Arc::new(RemoteCollaborator::new(
            Arc::clone(&self.pending),
            self.outbox.clone(),
            config.timeouts,
        ));
        let players = participants.iter().map(|p| p.id).collect();
        let mut game = Game::with_config(participants, collaborator, config)?;
        let id = game.id();
        let task = tokio::spawn(async move {
            game.run().await?;
            Ok::<_, GameError>(game.winners().to_vec())
        });
        games.insert(
            id,
            GameHandle {
                players,
                abort: task.abort_handle(),
            },
        );
        drop(games);
        log::info!("[host] started game {}", id);

        let host = Arc::clone(self);
        tokio::spawn(async move {
            match task.await {
                Ok(Ok(winners)) => log::info!("[host] game {} won by {:?}", id, winners),
                Ok(Err(e)) => log::error!("[host] game {} failed: {}", id, e),
                Err(e) if e.is_cancelled() => log::info!("[host] game {} was closed", id),
                Err(e) => log::error!("[host] game {} panicked: {}", id, e),
            }
            host.forget(id).await;
        });
        Ok(id)
    }

    /// Stops a running game and gives up its open requests.
    pub async fn close(&self, id: GameId) -> Result<(), HostError> {
        let handle = self
            .games
            .write()
            .await
            .remove(&id)
            .ok_or(HostError::NotFound(id))?;
        handle.abort.abort();
        self.cancel_requests(&handle.players);
        log::info!("[host] closed game {}", id);
        Ok(())
    }

    pub fn submit_action(&self, player: PlayerId, request: RequestId, play: Play) -> Result<(), HostError> {
        Ok(self.pending.submit(player, request, Response::Action(play))?)
    }

    pub fn submit_selection(
        &self,
        player: PlayerId,
        request: RequestId,
        cards: Vec<Card>,
    ) -> Result<(), HostError> {
        Ok(self
            .pending
            .submit(player, request, Response::Selection(cards))?)
    }

    pub async fn active_games(&self) -> Vec<GameId> {
        self.games.read().await.keys().copied().collect()
    }

    pub async fn is_running(&self, id: GameId) -> bool {
        self.games.read().await.contains_key(&id)
    }

    async fn forget(&self, id: GameId) {
        if let Some(handle) = self.games.write().await.remove(&id) {
            self.cancel_requests(&handle.players);
            log::debug!("[host] removed game {}", id);
        }
    }

    fn cancel_requests(&self, players: &[PlayerId]) {
        for &player in players {
            self.pending.cancel(player);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    use super::*;
    use crate::{
        remote::{Recipient, ServerMessage},
        testing::participants,
    };

    fn host() -> (Arc<GameHost>, UnboundedReceiver<Outbound>) {
        let (outbox, inbox) = unbounded_channel();
        let config = GameConfig {
            seed: Some(1),
            ..GameConfig::default()
        };
        (Arc::new(GameHost::new(outbox, config)), inbox)
    }

    async fn wait_until_idle(host: &GameHost) {
        while !host.active_games().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn seated_players_should_not_join_a_second_game() {
        let (host, mut inbox) = host();
        let id = host.start(participants(2)).await.unwrap();
        let message = inbox.recv().await.unwrap();
        assert_eq!(message.game, id);

        let again = host.start(participants(3)).await;

        assert!(matches!(again, Err(HostError::AlreadyPlaying(0))));
        assert_eq!(host.active_games().await, vec![id]);
    }

    #[tokio::test]
    async fn invalid_roster_should_not_be_registered() {
        let (host, _inbox) = host();

        let result = host.start(participants(1)).await;

        assert!(matches!(
            result,
            Err(HostError::Game(GameError::PlayerCount(1)))
        ));
        assert!(host.active_games().await.is_empty());
    }

    #[tokio::test]
    async fn closing_should_stop_the_game_and_its_requests() {
        let (host, mut inbox) = host();
        let id = host.start(participants(2)).await.unwrap();
        while host.pending().is_empty() {
            inbox.recv().await.unwrap();
        }

        host.close(id).await.unwrap();

        assert!(!host.is_running(id).await);
        assert!(host.pending().is_empty());
        assert!(matches!(
            host.close(id).await,
            Err(HostError::NotFound(_))
        ));
        // The freed players may start over.
        assert!(host.start(participants(2)).await.is_ok());
    }

    #[tokio::test]
    async fn answers_should_reach_the_right_game() {
        let (host, mut inbox) = host();
        let id = host.start(participants(2)).await.unwrap();

        let request = loop {
            let outbound = inbox.recv().await.unwrap();
            if let ServerMessage::CardPlayRequested { request, .. } = outbound.message {
                break (outbound.recipient, request);
            }
        };
        let player = match request.0 {
            Recipient::Player(p) => p,
            other => panic!("request sent to {:?}", other),
        };

        assert!(matches!(
            host.submit_selection(player, request.1, vec![]),
            Err(HostError::Submit(SubmitError::WrongKind { .. }))
        ));
        assert!(matches!(
            host.submit_action(1 - player, request.1, Play::new(Card::Spy)),
            Err(HostError::Submit(SubmitError::NotFound(_)))
        ));
        assert!(host.is_running(id).await);
        host.close(id).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn silent_players_should_time_out_until_the_game_ends() {
        let (host, _inbox) = host();
        let id = host.start(participants(2)).await.unwrap();

        wait_until_idle(&host).await;

        assert!(!host.is_running(id).await);
        assert!(host.pending().is_empty());
    }
}
