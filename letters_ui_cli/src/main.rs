use std::{env, process, sync::Arc};

use cli_player::CliPlayer;
use letters_core::{
    config::GameConfig, game::Game, player::Participant,
    random_playing_computer::RandomPlayingComputer,
};
use local_table::LocalTable;

mod cli_player;
mod local_table;

fn usage() -> ! {
    eprintln!("Usage: letters_ui_cli [COMPUTER_PLAYERS] [SEED]");
    eprintln!("  COMPUTER_PLAYERS  opponents played by the computer, 1 to 5 (default 3)");
    eprintln!("  SEED              seed for shuffling and the computer players");
    process::exit(2)
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() > 2 {
        usage();
    }
    let computers = match args.first().map(|a| a.parse::<usize>()) {
        None => 3,
        Some(Ok(n)) if (1..=5).contains(&n) => n,
        Some(_) => usage(),
    };
    let seed = match args.get(1).map(|a| a.parse::<u64>()) {
        None => None,
        Some(Ok(seed)) => Some(seed),
        Some(Err(_)) => usage(),
    };

    let human = tokio::task::spawn_blocking(CliPlayer::ask_name)
        .await
        .unwrap_or_else(|_| "You".to_string());
    let mut participants = vec![Participant::new(0, &human)];
    participants.extend((1..=computers).map(|id| Participant::new(id, &format!("Computer {id}"))));
    let names = participants.iter().map(|p| p.name.clone()).collect();

    let computer = match seed {
        Some(seed) => RandomPlayingComputer::seeded(seed),
        None => RandomPlayingComputer::new(),
    };
    let table = LocalTable::new(CliPlayer::new(0, names), computer);
    let config = GameConfig {
        seed,
        ..GameConfig::default()
    };

    let mut game = match Game::with_config(participants, Arc::new(table), config) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1)
        }
    };
    if let Err(e) = game.run().await {
        log::error!("game {} failed: {}", game.id(), e);
        process::exit(1);
    }
}
