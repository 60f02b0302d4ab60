use std::{sync::Arc, time::Duration};

use letters_core::{
    card::DeckKind,
    config::GameConfig,
    game::Game,
    host::GameHost,
    player::Participant,
    random_playing_computer::{choose_cards, choose_play, RandomPlayingComputer},
    remote::{Recipient, ServerMessage},
    run_game,
};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::mpsc::unbounded_channel;

fn roster(count: usize) -> Vec<Participant> {
    (0..count)
        .map(|id| Participant::new(id, &format!("Computer {id}")))
        .collect()
}

#[tokio::test]
async fn computers_should_finish_games_of_every_size() {
    for count in 2..=6 {
        let winners = run_game(roster(count), Arc::new(RandomPlayingComputer::seeded(count as u64)))
            .await
            .unwrap();

        assert!(!winners.is_empty());
        assert!(winners.iter().all(|&id| id < count));
    }
}

#[tokio::test]
async fn extended_deck_should_play_to_the_end() {
    for seed in 0..5 {
        let config = GameConfig {
            deck: DeckKind::Extended,
            seed: Some(seed),
            win_score: 4,
            ..GameConfig::default()
        };
        let mut game = Game::with_config(
            roster(6),
            Arc::new(RandomPlayingComputer::seeded(seed)),
            config,
        )
        .unwrap();

        game.run().await.unwrap();

        let top = game.players().iter().map(|p| p.score()).max().unwrap();
        assert!(top >= 4);
        assert!(game
            .winners()
            .iter()
            .all(|&id| game.players()[id].score() == top));
    }
}

#[tokio::test]
async fn hosted_games_should_run_side_by_side() {
    let (outbox, mut inbox) = unbounded_channel();
    let host = Arc::new(GameHost::new(outbox, GameConfig::default()));
    let first = host.start(roster(3)).await.unwrap();
    let second = host
        .start((10..14).map(|id| Participant::new(id, "Remote")).collect())
        .await
        .unwrap();
    assert_ne!(first, second);

    let answering = Arc::clone(&host);
    let clients = tokio::spawn(async move {
        let mut rng = StdRng::seed_from_u64(8);
        let mut winners = 0;
        while let Some(outbound) = inbox.recv().await {
            let Recipient::Player(player) = outbound.recipient else {
                if let ServerMessage::Notify(letters_core::event::Event::Winner(_)) = outbound.message {
                    winners += 1;
                    if winners == 2 {
                        return winners;
                    }
                }
                continue;
            };
            match outbound.message {
                ServerMessage::CardPlayRequested {
                    request,
                    cards,
                    targets,
                } => {
                    let play = choose_play(player, &cards, &targets, &mut rng);
                    answering.submit_action(player, request, play).unwrap();
                }
                ServerMessage::CardSelectionRequested {
                    request,
                    count,
                    cards,
                } => {
                    let selection = choose_cards(count, &cards, &mut rng);
                    answering.submit_selection(player, request, selection).unwrap();
                }
                ServerMessage::Notify(_) => {}
            }
        }
        winners
    });

    let winners = tokio::time::timeout(Duration::from_secs(30), clients)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(winners, 2);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !host.active_games().await.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert!(host.pending().is_empty());
}
