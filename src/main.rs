//! Demo driver: replays a synthetic command stream through the engine with
//! the stock observers attached, then prints a closing summary.
//!
//! Knobs (environment variables): `SEED`, `NUM_COMMANDS`, `TRACKED_OWNER`,
//! `TOB_CSV` (output path), `EVENTS_JSON=1` to stream every event as JSON
//! lines on stdout. `RUST_LOG` controls log verbosity.

use std::sync::Arc;
use tickbook::market_data_gen::{replay_into_engine, Command, Generator, GeneratorConfig};
use tickbook::{JsonLineSink, MatchingEngine, OwnerId, PortfolioTracker, TopOfBookTracker};

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let seed = env_u64("SEED", 42);
    let num_commands = env_u64("NUM_COMMANDS", 500) as usize;
    let tracked_owner = OwnerId(env_u64("TRACKED_OWNER", 1));
    let csv_path = std::env::var("TOB_CSV").unwrap_or_else(|_| "top_of_book.csv".to_string());

    let mut engine = MatchingEngine::new();

    let tracker =
        Arc::new(TopOfBookTracker::create(1, &csv_path).expect("create top-of-book CSV"));
    engine.register_observer(tracker.clone());

    let portfolio = Arc::new(PortfolioTracker::new(2, tracked_owner));
    engine.register_observer(portfolio.clone());

    if std::env::var("EVENTS_JSON").is_ok() {
        engine.register_observer(Arc::new(JsonLineSink::stdout(3)));
    }

    let mut generator = Generator::new(GeneratorConfig {
        seed,
        num_commands,
        ..Default::default()
    });
    let commands = generator.all_commands();

    // register our own orders with the accountant before they can trade
    for command in &commands {
        if let Command::Add {
            id, owner, side, ..
        } = command
        {
            if *owner == tracked_owner {
                portfolio.track_order(*id, *side);
            }
        }
    }

    let (accepted, rejected) = replay_into_engine(&mut engine, commands);

    let top = engine.top_of_book();
    println!("=== tickbook demo ===");
    println!("commands: {} accepted, {} rejected", accepted, rejected);
    println!(
        "best bid: {} ({} resting)   best ask: {} ({} resting)",
        top.best_bid, top.bid_qty, top.best_ask, top.ask_qty
    );
    println!(
        "totals: {} bid / {} ask   mid: {}   spread: {}",
        engine.total_bid_qty(),
        engine.total_ask_qty(),
        engine.mid(),
        engine.spread()
    );

    let snap = portfolio.snapshot();
    println!("--- portfolio (owner {}) ---", portfolio.owner().0);
    println!("position: {}   fills: {}", snap.position, snap.fills);
    println!(
        "avg cost: {}   mark: {}   realized: {}   unrealized: {}   total: {}",
        snap.average_cost, snap.mark_price, snap.realized_pnl, snap.unrealized_pnl, snap.total_pnl
    );

    tracker.flush().expect("flush top-of-book CSV");
    println!("top-of-book history written to {}", csv_path);
}
