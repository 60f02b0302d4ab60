use thiserror::Error;

use crate::{
    action::GameAction,
    card::{Card, Effect},
    play::Play,
    player::{Player, PlayerId},
    utils::VecExtensions,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("a {played} was announced but a {card} is being resolved")]
    CardMismatch { card: Card, played: Card },
    #[error("player {0} is not seated in this round")]
    UnknownPlayer(PlayerId),
    #[error("a {0} needs a target")]
    MissingTarget(Card),
    #[error("a Guard needs a guess")]
    MissingGuess,
    #[error("a Guard may not guess a {0}")]
    IllegalGuess(Card),
    #[error("a {0} cannot target the player who plays it")]
    SelfTarget(Card),
    #[error("player {0} is out of the round")]
    TargetEliminated(PlayerId),
    #[error("player {0} is protected")]
    TargetProtected(PlayerId),
    #[error("player {0} has no card in hand")]
    EmptyHand(PlayerId),
}

/// Read only view of the round a card is resolved against. The acting player
/// still holds the card being played.
pub struct ResolveContext<'a> {
    pub source: PlayerId,
    pub players: &'a [Player],
    pub deck_remaining: usize,
}

impl<'a> ResolveContext<'a> {
    fn player(&self, id: PlayerId) -> Result<&'a Player, ResolveError> {
        self.players
            .iter()
            .find(|p| p.id() == id)
            .ok_or(ResolveError::UnknownPlayer(id))
    }

    /// Cards `id` holds once `played` has left the acting player's hand.
    fn hand_after(&self, id: PlayerId, played: Card) -> Result<Vec<Card>, ResolveError> {
        let mut hand = self.player(id)?.hand().to_vec();
        if id == self.source {
            hand.remove_first_where(|&c| c == played);
        }
        Ok(hand)
    }

    fn has_other_legal_target(&self) -> bool {
        self.players
            .iter()
            .any(|p| p.id() != self.source && p.is_alive() && !p.is_protected())
    }

    /// Validates `play.opponent` for `card`. `Ok(None)` means the card is
    /// played without effect because nobody can be targeted.
    fn target(&self, card: Card, play: &Play) -> Result<Option<(PlayerId, Card)>, ResolveError> {
        let Some(id) = play.opponent else {
            return if card.allows_self_target() || self.has_other_legal_target() {
                Err(ResolveError::MissingTarget(card))
            } else {
                Ok(None)
            };
        };
        if id == self.source && !card.allows_self_target() {
            return Err(ResolveError::SelfTarget(card));
        }
        let target = self.player(id)?;
        if !target.is_alive() {
            return Err(ResolveError::TargetEliminated(id));
        }
        if id != self.source && target.is_protected() {
            return Err(ResolveError::TargetProtected(id));
        }
        let held = self
            .hand_after(id, card)?
            .first()
            .copied()
            .ok_or(ResolveError::EmptyHand(id))?;
        Ok(Some((id, held)))
    }
}

/// Turns a played card into the actions it causes. Nothing is produced unless
/// the whole play is legal.
pub fn resolve(
    card: Card,
    ctx: &ResolveContext,
    play: &Play,
) -> Result<Vec<GameAction>, ResolveError> {
    if play.card != card {
        return Err(ResolveError::CardMismatch {
            card,
            played: play.card,
        });
    }
    let actor = ctx.player(ctx.source)?;
    let me = actor.id();
    match card {
        Card::Spy => Ok(vec![GameAction::AddEffect {
            player: me,
            effects: vec![Effect::spy()],
        }]),
        Card::Guard => guard(ctx, actor, play),
        Card::Priest => Ok(match ctx.target(card, play)? {
            Some((target, _)) => vec![GameAction::AddInfo {
                player: me,
                target,
                cards: ctx.player(target)?.hand().to_vec(),
            }],
            None => vec![GameAction::NoEffect],
        }),
        Card::Baron => baron(ctx, actor, play),
        Card::Handmaid => Ok(vec![GameAction::AddEffect {
            player: me,
            effects: vec![Effect::protection()],
        }]),
        Card::Prince => {
            let Some((target, held)) = ctx.target(card, play)? else {
                return Ok(vec![GameAction::NoEffect]);
            };
            let mut actions = vec![GameAction::Discard {
                player: target,
                card: held,
            }];
            if held != Card::Princess {
                actions.push(GameAction::Draw {
                    player: target,
                    amount: 1,
                });
            }
            Ok(actions)
        }
        Card::Chancellor => {
            let amount = ctx.deck_remaining.min(2);
            if amount == 0 {
                return Ok(vec![GameAction::NoEffect]);
            }
            Ok(vec![
                GameAction::Draw { player: me, amount },
                GameAction::PlaceCardsOnBottom { player: me, amount },
            ])
        }
        Card::King => Ok(match ctx.target(card, play)? {
            Some((target, _)) => vec![GameAction::Swap { player: me, target }],
            None => vec![GameAction::NoEffect],
        }),
        Card::Countess => Ok(vec![GameAction::NoEffect]),
        Card::Princess => Ok(vec![
            GameAction::Log(format!("{} played the Princess", actor.name())),
            GameAction::Eliminate(vec![me]),
        ]),
    }
}

fn guard(ctx: &ResolveContext, actor: &Player, play: &Play) -> Result<Vec<GameAction>, ResolveError> {
    if let Some(guess @ Card::Guard) = play.guess {
        return Err(ResolveError::IllegalGuess(guess));
    }
    let Some((target, held)) = ctx.target(Card::Guard, play)? else {
        return Ok(vec![GameAction::NoEffect]);
    };
    let guess = play.guess.ok_or(ResolveError::MissingGuess)?;
    let name = ctx.player(target)?.name();
    if held == guess {
        Ok(vec![
            GameAction::Log(format!(
                "{} guessed that {} holds a {}: correct",
                actor.name(),
                name,
                guess
            )),
            GameAction::Eliminate(vec![target]),
        ])
    } else {
        Ok(vec![
            GameAction::Log(format!(
                "{} guessed that {} holds a {}: wrong",
                actor.name(),
                name,
                guess
            )),
            GameAction::NoEffect,
        ])
    }
}

fn baron(ctx: &ResolveContext, actor: &Player, play: &Play) -> Result<Vec<GameAction>, ResolveError> {
    let Some((target, theirs)) = ctx.target(Card::Baron, play)? else {
        return Ok(vec![GameAction::NoEffect]);
    };
    let mine = ctx
        .hand_after(actor.id(), Card::Baron)?
        .first()
        .copied()
        .ok_or(ResolveError::EmptyHand(actor.id()))?;
    let log = GameAction::Log(format!(
        "{} compared cards with {}",
        actor.name(),
        ctx.player(target)?.name()
    ));
    let result = match mine.cmp(&theirs) {
        std::cmp::Ordering::Greater => GameAction::Eliminate(vec![target]),
        std::cmp::Ordering::Less => GameAction::Eliminate(vec![actor.id()]),
        std::cmp::Ordering::Equal => GameAction::NoEffect,
    };
    Ok(vec![log, result])
}
