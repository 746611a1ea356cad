//! Position and P&L accounting for one owner, fed by the event stream.
//!
//! Trade events do not carry a direction, so the driver registers its own
//! orders with [`PortfolioTracker::track_order`] at submission time; fills on
//! tracked orders are then attributed a side. Accounting is average-cost:
//! growing the position accumulates cost basis, reducing it realizes P&L
//! against the average cost and scales the basis down proportionally. The
//! book is marked to the last trade price, refined to the midpoint on every
//! top-of-book update.

use crate::events::{TopOfBook, Trade};
use crate::observer::{Observer, ObserverResult};
use crate::types::{OrderId, OwnerId, Side};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Mutex;

/// Point-in-time portfolio state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortfolioSnapshot {
    pub position: i64,
    pub average_cost: Decimal,
    pub mark_price: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub total_pnl: Decimal,
    pub fills: u64,
}

pub struct PortfolioTracker {
    observer_id: u64,
    owner: OwnerId,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    tracked: HashMap<OrderId, Side>,
    position: i64,
    cost_basis: Decimal,
    realized_pnl: Decimal,
    mark_price: Decimal,
    fills: u64,
}

impl State {
    fn average_cost(&self) -> Decimal {
        if self.position == 0 {
            Decimal::ZERO
        } else {
            self.cost_basis / Decimal::from(self.position.abs())
        }
    }

    fn unrealized_pnl(&self) -> Decimal {
        if self.position == 0 || self.mark_price.is_zero() {
            Decimal::ZERO
        } else {
            (self.mark_price - self.average_cost()) * Decimal::from(self.position)
        }
    }

    fn apply_fill(&mut self, side: Side, quantity: u64, price: u64) {
        let price = Decimal::from(price);
        let qty = quantity as i64;
        let signed = match side {
            Side::Buy => qty,
            Side::Sell => -qty,
        };
        let old = self.position;

        if old != 0 && signed.signum() != old.signum() {
            let closed = qty.min(old.abs());
            let per_unit = if old > 0 {
                price - self.average_cost()
            } else {
                self.average_cost() - price
            };
            self.realized_pnl += per_unit * Decimal::from(closed);

            let kept = old.abs() - closed;
            self.cost_basis = if kept == 0 {
                Decimal::ZERO
            } else {
                self.cost_basis * Decimal::from(kept) / Decimal::from(old.abs())
            };
            let opened = qty - closed;
            if opened > 0 {
                self.cost_basis = price * Decimal::from(opened);
            }
        } else {
            self.cost_basis += price * Decimal::from(qty);
        }

        self.position = old + signed;
        self.mark_price = price;
        self.fills += 1;
    }
}

impl PortfolioTracker {
    pub fn new(observer_id: u64, owner: OwnerId) -> Self {
        Self {
            observer_id,
            owner,
            state: Mutex::new(State::default()),
        }
    }

    pub fn owner(&self) -> OwnerId {
        self.owner
    }

    /// Registers one of the owner's orders so its fills count toward the
    /// position. Call at submission time, before the order can trade.
    pub fn track_order(&self, id: OrderId, side: Side) {
        self.state.lock().expect("lock").tracked.insert(id, side);
    }

    pub fn is_tracked(&self, id: OrderId) -> bool {
        self.state.lock().expect("lock").tracked.contains_key(&id)
    }

    pub fn position(&self) -> i64 {
        self.state.lock().expect("lock").position
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.state.lock().expect("lock").realized_pnl
    }

    pub fn unrealized_pnl(&self) -> Decimal {
        self.state.lock().expect("lock").unrealized_pnl()
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        let state = self.state.lock().expect("lock");
        let unrealized = state.unrealized_pnl();
        PortfolioSnapshot {
            position: state.position,
            average_cost: state.average_cost(),
            mark_price: state.mark_price,
            realized_pnl: state.realized_pnl,
            unrealized_pnl: unrealized,
            total_pnl: state.realized_pnl + unrealized,
            fills: state.fills,
        }
    }
}

impl Observer for PortfolioTracker {
    fn observer_id(&self) -> u64 {
        self.observer_id
    }

    fn name(&self) -> &str {
        "portfolio"
    }

    fn on_trade_executed(&self, trade: &Trade) -> ObserverResult {
        let mut state = self.state.lock().expect("lock");
        let aggressor_side = state.tracked.get(&trade.aggressor_order_id).copied();
        let resting_side = state.tracked.get(&trade.resting_order_id).copied();

        if aggressor_side.is_none() && resting_side.is_none() {
            // someone else's trade still moves the mark
            state.mark_price = Decimal::from(trade.price);
            return Ok(());
        }
        if let Some(side) = aggressor_side {
            state.apply_fill(side, trade.quantity, trade.price);
        }
        if let Some(side) = resting_side {
            state.apply_fill(side, trade.quantity, trade.price);
        }
        Ok(())
    }

    fn on_order_cancelled(&self, order_id: OrderId) -> ObserverResult {
        self.state
            .lock()
            .expect("lock")
            .tracked
            .remove(&order_id);
        Ok(())
    }

    fn on_top_of_book(&self, top: &TopOfBook) -> ObserverResult {
        let mid = top.mid();
        if mid > 0 {
            self.state.lock().expect("lock").mark_price = Decimal::from(mid);
        }
        Ok(())
    }
}
