//! Market-by-order feed adapter: translates feed messages into engine
//! commands.
//!
//! Feeds deliver nano-precision integer prices; the adapter scales them to
//! engine ticks before the core ever sees them. `DuplicateId` and `NotFound`
//! rejections are treated as skippable: a feed replays liquidity for the
//! whole market, and the book may have dropped an order (or seen it already)
//! without that being an error in the stream.

use crate::engine::MatchingEngine;
use crate::types::{EngineResult, OrderId, OwnerId, Price, Quantity, RejectReason, Side};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeedAction {
    Add,
    Cancel,
    Modify,
}

/// One market-by-order message, pre-parsed from the wire.
///
/// `price_nano` is the feed's fixed-point representation (nano units).
/// For `Cancel`, only `order_id` is meaningful.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    pub action: FeedAction,
    pub order_id: u64,
    pub side: Side,
    pub size: Quantity,
    pub price_nano: u64,
    pub ts_received: u64,
    pub ts_executed: u64,
}

/// Applies feed messages to an engine.
pub struct FeedAdapter {
    /// Nano units per engine tick, e.g. 10_000_000 for hundredth-of-a-point
    /// ticks on a nano-priced feed.
    price_divisor: u64,
    /// Synthetic owner stamped on all feed-sourced orders.
    feed_owner: OwnerId,
}

impl FeedAdapter {
    pub fn new(price_divisor: u64, feed_owner: OwnerId) -> Self {
        assert!(price_divisor > 0, "price divisor must be positive");
        Self {
            price_divisor,
            feed_owner,
        }
    }

    /// Feed price to engine ticks.
    pub fn scale_price(&self, price_nano: u64) -> Price {
        price_nano / self.price_divisor
    }

    /// Applies one message. Returns `Ok(true)` when the command was accepted,
    /// `Ok(false)` when it was skipped (`DuplicateId`/`NotFound`), and the
    /// rejection otherwise (malformed feed data).
    pub fn apply(&self, engine: &mut MatchingEngine, msg: &FeedMessage) -> EngineResult<bool> {
        let id = OrderId(msg.order_id);
        let outcome = match msg.action {
            FeedAction::Add => engine.add_order_with_timestamps(
                id,
                self.feed_owner,
                msg.side,
                msg.size,
                self.scale_price(msg.price_nano),
                msg.ts_received,
                msg.ts_executed,
            ),
            FeedAction::Cancel => engine.cancel_order(id),
            FeedAction::Modify => {
                engine.modify_order(id, msg.size, self.scale_price(msg.price_nano))
            }
        };
        match outcome {
            Ok(()) => Ok(true),
            Err(reason @ (RejectReason::DuplicateId | RejectReason::NotFound)) => {
                debug!(order_id = msg.order_id, reason = %reason, "skipping feed message");
                Ok(false)
            }
            Err(reason) => Err(reason),
        }
    }

    /// Applies a batch of messages. Returns `(applied, skipped)` counts, or
    /// the first hard rejection.
    pub fn replay<'a>(
        &self,
        engine: &mut MatchingEngine,
        messages: impl IntoIterator<Item = &'a FeedMessage>,
    ) -> EngineResult<(usize, usize)> {
        let mut applied = 0;
        let mut skipped = 0;
        for msg in messages {
            if self.apply(engine, msg)? {
                applied += 1;
            } else {
                skipped += 1;
            }
        }
        Ok((applied, skipped))
    }
}
