use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::{
    card::Card,
    collaborator::{Collaborator, RequestError},
    config::Timeouts,
    event::{Event, EventEntry, EventVisibility},
    game::GameId,
    pending::{PendingRequests, RequestId, RequestKind, Response},
    play::Play,
    player::PlayerId,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ServerMessage {
    CardPlayRequested {
        request: RequestId,
        cards: Vec<Card>,
        targets: Vec<PlayerId>,
    },
    CardSelectionRequested {
        request: RequestId,
        count: usize,
        cards: Vec<Card>,
    },
    Notify(Event),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    Player(PlayerId),
    Everyone,
    EveryoneBut(PlayerId),
}

/// A message waiting to be delivered by the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outbound {
    pub game: GameId,
    pub recipient: Recipient,
    pub message: ServerMessage,
}

impl Outbound {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Talks to participants over a message channel and waits for their answers
/// in the shared pending request table.
#[derive(Clone)]
pub struct RemoteCollaborator {
    pending: Arc<PendingRequests>,
    outbox: UnboundedSender<Outbound>,
    timeouts: Timeouts,
}

impl RemoteCollaborator {
    pub fn new(
        pending: Arc<PendingRequests>,
        outbox: UnboundedSender<Outbound>,
        timeouts: Timeouts,
    ) -> Self {
        RemoteCollaborator {
            pending,
            outbox,
            timeouts,
        }
    }

    fn send(&self, game: GameId, recipient: Recipient, message: ServerMessage) -> Result<(), RequestError> {
        self.outbox
            .send(Outbound {
                game,
                recipient,
                message,
            })
            .map_err(|_| RequestError::Disconnected)
    }

    async fn ask(
        &self,
        game: GameId,
        player: PlayerId,
        kind: RequestKind,
        message: impl FnOnce(RequestId) -> ServerMessage,
    ) -> Result<Response, RequestError> {
        let ticket = self.pending.open(player, kind)?;
        self.send(game, Recipient::Player(player), message(ticket.id()))?;
        let timeout = match kind {
            RequestKind::Action => self.timeouts.action,
            RequestKind::Selection => self.timeouts.selection,
        };
        ticket.wait(timeout).await
    }
}

#[async_trait]
impl Collaborator for RemoteCollaborator {
    async fn get_player_action(
        &self,
        game: GameId,
        player: PlayerId,
        hand: &[Card],
        legal_targets: &[PlayerId],
    ) -> Result<Play, RequestError> {
        let response = self
            .ask(game, player, RequestKind::Action, |request| {
                ServerMessage::CardPlayRequested {
                    request,
                    cards: hand.to_vec(),
                    targets: legal_targets.to_vec(),
                }
            })
            .await?;
        match response {
            Response::Action(play) => Ok(play),
            Response::Selection(_) => Err(RequestError::Refused),
        }
    }

    async fn request_card_selection(
        &self,
        game: GameId,
        player: PlayerId,
        count: usize,
        available: &[Card],
    ) -> Result<Vec<Card>, RequestError> {
        let response = self
            .ask(game, player, RequestKind::Selection, |request| {
                ServerMessage::CardSelectionRequested {
                    request,
                    count,
                    cards: available.to_vec(),
                }
            })
            .await?;
        match response {
            Response::Selection(cards) => Ok(cards),
            Response::Action(_) => Err(RequestError::Refused),
        }
    }

    async fn notify(&self, game: GameId, entry: &EventEntry) {
        let result = match entry.visibility {
            EventVisibility::Public => self.send(
                game,
                Recipient::Everyone,
                ServerMessage::Notify(entry.event.clone()),
            ),
            EventVisibility::Private(owner) => self
                .send(
                    game,
                    Recipient::Player(owner),
                    ServerMessage::Notify(entry.event.clone()),
                )
                .and_then(|_| {
                    self.send(
                        game,
                        Recipient::EveryoneBut(owner),
                        ServerMessage::Notify(entry.event.redacted()),
                    )
                }),
        };
        if let Err(e) = result {
            log::warn!("[game {}] notification dropped: {}", game, e);
        }
    }
}
