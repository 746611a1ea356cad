//! Deterministic synthetic command stream.
//!
//! Configurable mix of add/cancel/modify commands for replay tests, demos,
//! and load tests. Same seed, same stream.

use crate::engine::MatchingEngine;
use crate::types::{OrderId, OwnerId, Price, Quantity, Side};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// One engine command, ready to submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Add {
        id: OrderId,
        owner: OwnerId,
        side: Side,
        quantity: Quantity,
        price: Price,
    },
    Cancel {
        id: OrderId,
    },
    Modify {
        id: OrderId,
        new_quantity: Quantity,
        new_price: Price,
    },
}

/// Configuration for the synthetic command generator.
/// All ranges are inclusive. Same config + seed produces the same stream.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed, same command stream.
    pub seed: u64,
    /// Number of commands to generate (used by [`Generator::all_commands`]).
    pub num_commands: usize,
    /// Probability of Buy (0.0..=1.0) for adds. Sell otherwise.
    pub buy_ratio: f64,
    /// Probability that a command cancels a previously issued id.
    pub cancel_ratio: f64,
    /// Probability that a command modifies a previously issued id.
    pub modify_ratio: f64,
    /// Price range (inclusive) in ticks.
    pub price_min: Price,
    pub price_max: Price,
    /// Quantity range (inclusive), whole units.
    pub quantity_min: Quantity,
    pub quantity_max: Quantity,
    /// Number of distinct owner ids (1..=num_owners).
    pub num_owners: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            num_commands: 1000,
            buy_ratio: 0.5,
            cancel_ratio: 0.1,
            modify_ratio: 0.1,
            price_min: 9500,
            price_max: 10500,
            quantity_min: 1,
            quantity_max: 100,
            num_owners: 5,
        }
    }
}

/// Deterministic command stream. Create with [`Generator::new`]; pull
/// commands one at a time or all at once.
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_order_id: u64,
    issued: Vec<OrderId>,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_order_id: 1,
            issued: Vec::new(),
        }
    }

    /// Generates the next command. Cancel and modify targets are drawn from
    /// previously issued ids; they may have been filled or cancelled already,
    /// so replaying the stream legitimately produces `NotFound` rejections.
    pub fn next_command(&mut self) -> Command {
        let roll = self.rng.gen::<f64>();
        if !self.issued.is_empty() && roll < self.config.cancel_ratio {
            let target = self.issued[self.rng.gen_range(0..self.issued.len())];
            return Command::Cancel { id: target };
        }
        if !self.issued.is_empty() && roll < self.config.cancel_ratio + self.config.modify_ratio {
            let target = self.issued[self.rng.gen_range(0..self.issued.len())];
            return Command::Modify {
                id: target,
                new_quantity: self.random_quantity(),
                new_price: self.random_price(),
            };
        }

        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;
        self.issued.push(id);
        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        Command::Add {
            id,
            owner: OwnerId(self.rng.gen_range(1..=self.config.num_owners.max(1))),
            side,
            quantity: self.random_quantity(),
            price: self.random_price(),
        }
    }

    /// Returns exactly `n` commands, advancing the generator state.
    pub fn take_commands(&mut self, n: usize) -> Vec<Command> {
        (0..n).map(|_| self.next_command()).collect()
    }

    /// Returns the full stream as defined by `config.num_commands`.
    pub fn all_commands(&mut self) -> Vec<Command> {
        self.take_commands(self.config.num_commands)
    }

    fn random_price(&mut self) -> Price {
        self.rng
            .gen_range(self.config.price_min..=self.config.price_max)
    }

    fn random_quantity(&mut self) -> Quantity {
        self.rng
            .gen_range(self.config.quantity_min..=self.config.quantity_max)
    }
}

/// Replays commands into the engine. Rejections are expected in a synthetic
/// stream (cancels of filled orders, for instance) and are counted, not
/// propagated. Returns `(accepted, rejected)`.
pub fn replay_into_engine(
    engine: &mut MatchingEngine,
    commands: impl IntoIterator<Item = Command>,
) -> (usize, usize) {
    let mut accepted = 0;
    let mut rejected = 0;
    for command in commands {
        let outcome = match command {
            Command::Add {
                id,
                owner,
                side,
                quantity,
                price,
            } => engine.add_order(id, owner, side, quantity, price),
            Command::Cancel { id } => engine.cancel_order(id),
            Command::Modify {
                id,
                new_quantity,
                new_price,
            } => engine.modify_order(id, new_quantity, new_price),
        };
        match outcome {
            Ok(()) => accepted += 1,
            Err(_) => rejected += 1,
        }
    }
    (accepted, rejected)
}
