use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::{card::Card, collaborator::RequestError, play::Play, player::PlayerId};

pub type RequestId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    Action,
    Selection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Action(Play),
    Selection(Vec<Card>),
}

impl Response {
    pub fn kind(&self) -> RequestKind {
        match self {
            Response::Action(_) => RequestKind::Action,
            Response::Selection(_) => RequestKind::Selection,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("player {0} has no open request")]
    NotFound(PlayerId),
    #[error("request {0} is not the one player {1} was asked")]
    WrongRequest(RequestId, PlayerId),
    #[error("expected a {expected:?} answer, got {got:?}")]
    WrongKind {
        expected: RequestKind,
        got: RequestKind,
    },
    #[error("the request was already given up")]
    Closed,
}

struct Entry {
    id: RequestId,
    kind: RequestKind,
    responder: oneshot::Sender<Response>,
}

/// At most one open request per participant. Answers arrive from whatever
/// transport the participant uses and are routed to the waiting game.
#[derive(Default)]
pub struct PendingRequests {
    entries: Mutex<HashMap<PlayerId, Entry>>,
}

impl PendingRequests {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<PlayerId, Entry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn open(self: &Arc<Self>, player: PlayerId, kind: RequestKind) -> Result<Ticket, RequestError> {
        let mut entries = self.entries();
        if entries.contains_key(&player) {
            return Err(RequestError::Busy(player));
        }
        let (responder, receiver) = oneshot::channel();
        let id = Uuid::new_v4();
        entries.insert(
            player,
            Entry {
                id,
                kind,
                responder,
            },
        );
        log::trace!("opened {:?} request {} for player {}", kind, id, player);
        Ok(Ticket {
            table: Arc::clone(self),
            player,
            id,
            kind,
            receiver,
        })
    }

    /// Hands `response` to whoever waits on request `id`. Mismatched answers
    /// leave the request open.
    pub fn submit(&self, player: PlayerId, id: RequestId, response: Response) -> Result<(), SubmitError> {
        let mut entries = self.entries();
        let entry = entries.get(&player).ok_or(SubmitError::NotFound(player))?;
        if entry.id != id {
            return Err(SubmitError::WrongRequest(id, player));
        }
        if entry.kind != response.kind() {
            return Err(SubmitError::WrongKind {
                expected: entry.kind,
                got: response.kind(),
            });
        }
        let entry = entries.remove(&player).ok_or(SubmitError::NotFound(player))?;
        entry.responder.send(response).map_err(|_| SubmitError::Closed)
    }

    /// Drops the open request of `player`; its waiter sees `Cancelled`.
    pub fn cancel(&self, player: PlayerId) -> bool {
        self.entries().remove(&player).is_some()
    }

    pub fn is_pending(&self, player: PlayerId) -> bool {
        self.entries().contains_key(&player)
    }

    pub fn request_of(&self, player: PlayerId) -> Option<(RequestId, RequestKind)> {
        self.entries().get(&player).map(|e| (e.id, e.kind))
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    fn release(&self, player: PlayerId, id: RequestId) {
        let mut entries = self.entries();
        if entries.get(&player).map(|e| e.id) == Some(id) {
            entries.remove(&player);
        }
    }
}

/// The waiting side of an open request. Dropping it closes the request.
pub struct Ticket {
    table: Arc<PendingRequests>,
    player: PlayerId,
    id: RequestId,
    kind: RequestKind,
    receiver: oneshot::Receiver<Response>,
}

impl Ticket {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    pub async fn wait(mut self, timeout: Duration) -> Result<Response, RequestError> {
        tokio::select! {
            response = &mut self.receiver => response.map_err(|_| RequestError::Cancelled),
            _ = tokio::time::sleep(timeout) => {
                log::debug!("request {} of player {} timed out", self.id, self.player);
                Err(RequestError::TimedOut)
            }
        }
    }
}

impl Drop for Ticket {
    fn drop(&mut self) {
        self.table.release(self.player, self.id);
    }
}
