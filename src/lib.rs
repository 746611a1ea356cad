//! # tickbook
//!
//! Single-symbol, in-memory limit order book with a continuous price-time
//! matching engine.
//!
//! Orders are identified by caller-chosen 64-bit ids; prices and quantities
//! are integer ticks. An incoming limit order matches against resting
//! liquidity on the opposite side (producing trades at the resting price) and
//! any residual rests in the book at price-time priority. Resting orders can
//! be cancelled or modified; a pure size reduction keeps queue position,
//! anything else is cancel-and-replace through the matching path.
//!
//! ## Entry point
//!
//! Use [`MatchingEngine`]: create with [`MatchingEngine::new`], then
//! [`MatchingEngine::add_order`], [`MatchingEngine::cancel_order`], and
//! [`MatchingEngine::modify_order`]. Register [`Observer`]s to receive the
//! event stream (trades, acknowledgements, cancels, modifies, rejections,
//! top-of-book updates).
//!
//! ## Example
//!
//! ```rust
//! use tickbook::{MatchingEngine, OrderId, OwnerId, Side};
//!
//! let mut engine = MatchingEngine::new();
//! engine.add_order(OrderId(1), OwnerId(7), Side::Sell, 100, 10050).unwrap();
//! engine.add_order(OrderId(2), OwnerId(8), Side::Buy, 60, 10050).unwrap();
//! assert_eq!(engine.best_ask(), 10050);
//! assert_eq!(engine.total_ask_qty(), 40);
//! assert_eq!(engine.best_bid(), 0);
//! ```
//!
//! The engine is single-threaded and cooperative: every command runs to
//! completion on the calling thread, and all events it produces are delivered
//! to observers before it returns. Feed it from one producer, or serialize
//! upstream.

pub mod book;
pub mod engine;
pub mod events;
pub mod feed;
pub mod market_data_gen;
mod matching;
pub mod observer;
pub mod portfolio;
pub mod price_level;
pub mod tob_tracker;
pub mod types;

pub use book::{Book, OrderLocation};
pub use engine::MatchingEngine;
pub use events::{EngineEvent, TopOfBook, Trade};
pub use observer::{JsonLineSink, Observer, ObserverError, ObserverResult, RecordingObserver};
pub use portfolio::{PortfolioSnapshot, PortfolioTracker};
pub use price_level::PriceLevel;
pub use tob_tracker::TopOfBookTracker;
pub use types::{
    EngineResult, ExecutionId, Order, OrderId, OwnerId, Price, Quantity, RejectReason, Side,
};
