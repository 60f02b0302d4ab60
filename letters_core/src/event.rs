use serde::{Deserialize, Serialize};

use crate::{
    card::{Card, Effect},
    play::Play,
    player::PlayerId,
};

/// Everything the engine tells participants about. Cards other players must
/// not see are wrapped in `Option` so they can be blanked out per viewer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Event {
    TurnStarted(PlayerId),
    Play(PlayerId, Play),
    PickUp(PlayerId, Vec<Option<Card>>, usize),
    Fold(PlayerId, Card, String),
    DropOut(PlayerId),
    LearnedCard(PlayerId, PlayerId, Vec<Option<Card>>),
    EffectApplied(PlayerId, Effect),
    EffectRemoved(PlayerId, Effect),
    HandUpdated(PlayerId, Vec<Option<Card>>),
    Log(String),
    RoundEnded(Vec<PlayerId>),
    Winner(Vec<PlayerId>),
}

impl Event {
    /// The participant the event is about, none for broadcast style events.
    pub fn subject(&self) -> Option<PlayerId> {
        match self {
            Event::TurnStarted(p)
            | Event::Play(p, _)
            | Event::PickUp(p, _, _)
            | Event::Fold(p, _, _)
            | Event::DropOut(p)
            | Event::LearnedCard(p, _, _)
            | Event::EffectApplied(p, _)
            | Event::EffectRemoved(p, _)
            | Event::HandUpdated(p, _) => Some(*p),
            Event::Log(_) | Event::RoundEnded(_) | Event::Winner(_) => None,
        }
    }

    /// The event with every card blanked out.
    pub fn redacted(&self) -> Event {
        let hide = |cards: &Vec<Option<Card>>| -> Vec<Option<Card>> { vec![None; cards.len()] };
        match self {
            Event::PickUp(p, cards, remaining) => Event::PickUp(*p, hide(cards), *remaining),
            Event::LearnedCard(p, op, cards) => Event::LearnedCard(*p, *op, hide(cards)),
            Event::HandUpdated(p, cards) => Event::HandUpdated(*p, hide(cards)),
            _ => self.clone(),
        }
    }
}

pub fn visible(cards: &[Card]) -> Vec<Option<Card>> {
    cards.iter().copied().map(Some).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventVisibility {
    Public,
    Private(PlayerId),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventEntry {
    pub visibility: EventVisibility,
    pub event: Event,
}

impl EventEntry {
    pub fn public(event: Event) -> Self {
        EventEntry {
            visibility: EventVisibility::Public,
            event,
        }
    }

    pub fn private(player: PlayerId, event: Event) -> Self {
        EventEntry {
            visibility: EventVisibility::Private(player),
            event,
        }
    }

    pub fn is_visible_to(&self, viewer: Option<PlayerId>) -> bool {
        match (self.visibility, viewer) {
            (EventVisibility::Public, _) | (_, None) => true,
            (EventVisibility::Private(owner), Some(viewer)) => owner == viewer,
        }
    }

    /// The event as `viewer` is allowed to see it; `None` sees everything.
    pub fn event_for(&self, viewer: Option<PlayerId>) -> Event {
        if self.is_visible_to(viewer) {
            self.event.clone()
        } else {
            self.event.redacted()
        }
    }
}

pub fn filter_events(log: &[EventEntry], visible_to: Option<PlayerId>) -> Vec<Event> {
    log.iter().map(|e| e.event_for(visible_to)).collect()
}
