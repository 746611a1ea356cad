//! Events published to observers.

use crate::types::{ExecutionId, OrderId, OwnerId, Price, Quantity, RejectReason};
use serde::{Deserialize, Serialize};

/// One execution between an incoming (aggressor) order and a resting order.
///
/// Trades price at the resting order's level, not at the incoming limit.
/// Timestamps are copied from the aggressor order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub execution_id: ExecutionId,
    pub aggressor_order_id: OrderId,
    pub resting_order_id: OrderId,
    pub aggressor_owner_id: OwnerId,
    pub resting_owner_id: OwnerId,
    pub price: Price,
    pub quantity: Quantity,
    pub ts_received: u64,
    pub ts_executed: u64,
}

/// The top of the book: best price and resting quantity on each side.
/// A price of 0 means the side is empty.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopOfBook {
    pub best_bid: Price,
    pub best_ask: Price,
    pub bid_qty: Quantity,
    pub ask_qty: Quantity,
}

impl TopOfBook {
    /// Midpoint of best bid and ask, or 0 when either side is empty.
    pub fn mid(&self) -> Price {
        if self.best_bid > 0 && self.best_ask > 0 {
            ((self.best_bid as u128 + self.best_ask as u128) / 2) as Price
        } else {
            0
        }
    }

    /// Best ask minus best bid, or 0 when either side is empty.
    pub fn spread(&self) -> Price {
        if self.best_bid > 0 && self.best_ask > 0 {
            self.best_ask - self.best_bid
        } else {
            0
        }
    }
}

/// Everything the engine can tell an observer, in one serializable enum.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    TradeExecuted {
        trade: Trade,
    },
    OrderAcknowledged {
        order_id: OrderId,
    },
    OrderCancelled {
        order_id: OrderId,
    },
    OrderModified {
        order_id: OrderId,
        new_quantity: Quantity,
        new_price: Price,
    },
    OrderRejected {
        order_id: OrderId,
        reason: RejectReason,
    },
    TopOfBookUpdate {
        top: TopOfBook,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mid_and_spread_need_both_sides() {
        let one_sided = TopOfBook {
            best_bid: 10000,
            best_ask: 0,
            bid_qty: 50,
            ask_qty: 0,
        };
        assert_eq!(one_sided.mid(), 0);
        assert_eq!(one_sided.spread(), 0);

        let two_sided = TopOfBook {
            best_bid: 10000,
            best_ask: 10050,
            bid_qty: 50,
            ask_qty: 75,
        };
        assert_eq!(two_sided.mid(), 10025);
        assert_eq!(two_sided.spread(), 50);
    }

    #[test]
    fn mid_does_not_overflow_at_extreme_prices() {
        let top = TopOfBook {
            best_bid: u64::MAX - 1,
            best_ask: u64::MAX,
            bid_qty: 1,
            ask_qty: 1,
        };
        assert_eq!(top.mid(), u64::MAX - 1);
    }
}
