//! An offline Texas Hold'em table runner.
//!
//! Seats a handful of local players at a single table and reads every
//! action from stdin, acting as the one caller that supplies all player
//! actions to the engine. Useful for kitchen-table games and for poking
//! at the engine by hand.

use anyhow::{Context, Result, bail};
use log::debug;
use pico_args::Arguments;
use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::sync::Arc;

use card_room::{
    Commentator, Observer, PlayerAction, PlayerId, StateUpdate, StaticCommentator, TableActor,
    TableConfig, TableHandle,
};

const HELP: &str = "\
Run an offline poker table

USAGE:
  cr_table [OPTIONS]

OPTIONS:
  --players NAMES       Comma-separated player names  [default: alice,bob]
  --buy-in CHIPS        Starting stack per player     [default: 1000]
  --small-blind CHIPS   Small blind                   [default: 10]
  --big-blind CHIPS     Big blind                     [default: 20]
  --seed N              Seed the deck for reproducible hands
  --json                Emit state updates as JSON lines

FLAGS:
  -h, --help            Print help information

COMMANDS (stdin, one per line):
  start                 Start the next hand
  fold | check | call   Act for the player whose turn it is
  raise AMOUNT          Raise by AMOUNT over the current bet
  advice                Ask the commentator what the actor should do
  view                  Reprint the table
  quit                  Close the table and exit
";

struct Args {
    players: Vec<String>,
    buy_in: u32,
    small_blind: u32,
    big_blind: u32,
    seed: Option<u64>,
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        players: pargs
            .value_from_str("--players")
            .unwrap_or_else(|_| "alice,bob".to_string())
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(ToString::to_string)
            .collect(),
        buy_in: pargs.value_from_str("--buy-in").unwrap_or(1000),
        small_blind: pargs.value_from_str("--small-blind").unwrap_or(10),
        big_blind: pargs.value_from_str("--big-blind").unwrap_or(20),
        seed: pargs.opt_value_from_str("--seed")?,
        json: pargs.contains("--json"),
    };

    if args.players.len() < 2 || args.players.len() > card_room::MAX_SEATS {
        bail!(
            "need between 2 and {} players, got {}",
            card_room::MAX_SEATS,
            args.players.len()
        );
    }

    run(args).await
}

async fn run(args: Args) -> Result<()> {
    let config = TableConfig {
        name: "Offline Table".to_string(),
        small_blind: args.small_blind,
        big_blind: args.big_blind,
        ..TableConfig::default()
    };
    config.validate().map_err(anyhow::Error::msg)?;

    let commentator: Option<Arc<dyn Commentator>> = Some(Arc::new(StaticCommentator));
    let (actor, handle) = match args.seed {
        Some(seed) => TableActor::with_seed(config, seed, commentator),
        None => TableActor::new(config, commentator),
    };
    tokio::spawn(actor.run());

    // Seat everyone and remember which identity owns which seat.
    let mut seat_owners: HashMap<usize, PlayerId> = HashMap::new();
    for (seat, name) in args.players.iter().enumerate() {
        let id = handle
            .sit(seat, args.buy_in, name)
            .await
            .with_context(|| format!("seating {name}"))?;
        debug!("{name} owns seat {seat} as {id}");
        seat_owners.insert(seat, id);
    }

    // Everything the table does is printed from its broadcasts.
    let (_, mut updates) = handle.subscribe(Observer::Omniscient, 64).await?;
    let json = args.json;
    tokio::spawn(async move {
        while let Some(update) = updates.recv().await {
            print_update(&update, json);
        }
    });

    println!("Table open. Type `start` to deal a hand, `quit` to leave.");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            continue;
        };

        let result = match command {
            "start" => handle.start_hand().await.map_err(anyhow::Error::from),
            "fold" => act(&handle, &seat_owners, PlayerAction::Fold).await,
            "check" => act(&handle, &seat_owners, PlayerAction::Check).await,
            "call" => act(&handle, &seat_owners, PlayerAction::Call).await,
            "raise" => match words.next().and_then(|w| w.parse().ok()) {
                Some(amount) => act(&handle, &seat_owners, PlayerAction::Raise(amount)).await,
                None => Err(anyhow::anyhow!("usage: raise AMOUNT")),
            },
            "advice" => advice(&handle, &seat_owners).await,
            "view" => {
                let view = handle.view(Observer::Omniscient).await?;
                print_update(
                    &StateUpdate {
                        view,
                        events: Vec::new(),
                        commentary: None,
                    },
                    json,
                );
                Ok(())
            }
            "quit" => break,
            other => Err(anyhow::anyhow!("unknown command `{other}`")),
        };
        if let Err(err) = result {
            eprintln!("error: {err}");
        }
        io::stdout().flush()?;
    }

    handle.close().await?;
    println!("Table closed.");
    Ok(())
}

/// Act on behalf of whichever seat the turn pointer designates.
async fn act(
    handle: &TableHandle,
    seat_owners: &HashMap<usize, PlayerId>,
    action: PlayerAction,
) -> Result<()> {
    let view = handle.view(Observer::Omniscient).await?;
    let seat = view.to_act.context("nobody is up to act")?;
    let player = *seat_owners
        .get(&seat)
        .context("acting seat has no local owner")?;
    handle.act(player, action).await?;
    Ok(())
}

async fn advice(handle: &TableHandle, seat_owners: &HashMap<usize, PlayerId>) -> Result<()> {
    let view = handle.view(Observer::Omniscient).await?;
    let seat = view.to_act.context("nobody is up to act")?;
    let player = *seat_owners
        .get(&seat)
        .context("acting seat has no local owner")?;
    let line = handle.advice(player).await?;
    println!("  ({line})");
    Ok(())
}

fn print_update(update: &StateUpdate, json: bool) {
    if json {
        match serde_json::to_string(update) {
            Ok(line) => println!("{line}"),
            Err(err) => eprintln!("error: serializing update: {err}"),
        }
        return;
    }

    for event in &update.events {
        println!("* {event}");
    }

    let view = &update.view;
    let board = if view.board.is_empty() {
        "--".to_string()
    } else {
        view.board
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    };
    println!("[{}] pot ${}  board: {board}", view.phase, view.total_pot);

    for seat in &view.seats {
        let Some(name) = &seat.name else { continue };
        let cards = match &seat.hole {
            Some(cards) => cards
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            None => String::new(),
        };
        let mut markers = String::new();
        if seat.is_dealer {
            markers.push_str(" D");
        }
        if seat.is_small_blind {
            markers.push_str(" SB");
        }
        if seat.is_big_blind {
            markers.push_str(" BB");
        }
        let turn = if view.to_act == Some(seat.seat) { ">" } else { " " };
        println!(
            "{turn} seat {}: {name:<16} ${:<6} bet ${:<5} {:<11}{markers} {cards}",
            seat.seat, seat.stack, seat.round_bet, seat.status.to_string(),
        );
    }
    if let Some(commentary) = &update.commentary {
        println!("  ({commentary})");
    }
}
