//! Single-entry matching engine façade.
//!
//! [`MatchingEngine`] owns the book, the execution-id counter, and the
//! observer registry. Commands run to completion on the calling thread; all
//! events a command produces are delivered before it returns, in a fixed
//! order: trades (in match order), then acknowledgement or modification,
//! then at most one top-of-book update when the top changed.
//!
//! Commands are not re-entrant: an observer callback must not call back into
//! the engine on the same stack. Callers that feed the engine from multiple
//! producers serialize upstream.

use crate::book::Book;
use crate::events::TopOfBook;
use crate::matching::cross;
use crate::observer::{Observer, ObserverResult};
use crate::types::{
    now_millis, EngineResult, Order, OrderId, OwnerId, Price, Quantity, RejectReason, Side,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct MatchingEngine {
    book: Book,
    observers: BTreeMap<u64, Arc<dyn Observer>>,
    next_execution_id: u64,
}

impl MatchingEngine {
    pub fn new() -> Self {
        Self {
            book: Book::new(),
            observers: BTreeMap::new(),
            next_execution_id: 1,
        }
    }

    /// Submits a limit order, stamping both timestamps with the current
    /// wall-clock time. See [`MatchingEngine::add_order_with_timestamps`].
    pub fn add_order(
        &mut self,
        id: OrderId,
        owner: OwnerId,
        side: Side,
        quantity: Quantity,
        price: Price,
    ) -> EngineResult<()> {
        let now = now_millis();
        self.add_order_with_timestamps(id, owner, side, quantity, price, now, now)
    }

    /// Submits a limit order with caller-supplied timestamps (feed replay).
    ///
    /// The order is matched against the opposite ladder at price-time
    /// priority; any residual quantity rests in the book and is acknowledged.
    /// Rejects with [`RejectReason::InvalidQuantity`] or
    /// [`RejectReason::DuplicateId`]; a rejected add changes nothing.
    pub fn add_order_with_timestamps(
        &mut self,
        id: OrderId,
        owner: OwnerId,
        side: Side,
        quantity: Quantity,
        price: Price,
        ts_received: u64,
        ts_executed: u64,
    ) -> EngineResult<()> {
        if quantity == 0 {
            return Err(self.reject(id, RejectReason::InvalidQuantity));
        }
        if self.book.contains(id) {
            return Err(self.reject(id, RejectReason::DuplicateId));
        }

        debug!(order_id = id.0, side = %side, quantity, price, "add order");
        let top_before = self.book.top_of_book();
        let mut order = Order {
            id,
            owner,
            side,
            quantity,
            price,
            ts_received,
            ts_executed,
        };

        let trades = cross(&mut self.book, &mut order, self.next_execution_id);
        self.next_execution_id += trades.len() as u64;
        for trade in &trades {
            self.notify(|o| o.on_trade_executed(trade));
        }

        if order.quantity > 0 {
            self.book.insert_resting(order);
            self.notify(|o| o.on_order_acknowledged(id));
        }

        self.emit_top_if_changed(top_before);
        Ok(())
    }

    /// Cancels a resting order. Rejects with [`RejectReason::NotFound`] when
    /// the id is unknown (including orders already fully consumed).
    pub fn cancel_order(&mut self, id: OrderId) -> EngineResult<()> {
        let top_before = self.book.top_of_book();
        let Some(removed) = self.book.remove_resting(id) else {
            return Err(self.reject(id, RejectReason::NotFound));
        };
        debug!(order_id = id.0, remaining = removed.quantity, "cancel order");
        self.notify(|o| o.on_order_cancelled(id));
        self.emit_top_if_changed(top_before);
        Ok(())
    }

    /// Modifies a resting order: cancel-and-replace, with one carve-out.
    ///
    /// A pure size reduction (same price, quantity not above the current
    /// remaining) mutates in place: the order keeps its queue position and
    /// its timestamps, and cannot trade. Any price change or size increase
    /// removes the order and submits the replacement through the add path,
    /// losing time priority and possibly crossing; `ts_received` is preserved
    /// for audit, `ts_executed` is refreshed. When the replacement fully
    /// matches, no modification event is emitted; the trades tell the story.
    pub fn modify_order(
        &mut self,
        id: OrderId,
        new_quantity: Quantity,
        new_price: Price,
    ) -> EngineResult<()> {
        if new_quantity == 0 {
            return Err(self.reject(id, RejectReason::InvalidQuantity));
        }
        let (old_quantity, old_price) = match self.book.order(id) {
            Some(current) => (current.quantity, current.price),
            None => return Err(self.reject(id, RejectReason::NotFound)),
        };
        let top_before = self.book.top_of_book();

        if new_price == old_price && new_quantity <= old_quantity {
            debug!(order_id = id.0, old_quantity, new_quantity, "reduce order");
            self.book
                .reduce_resting(id, new_quantity)
                .expect("resting order accepts a pure size reduction");
            self.notify(|o| o.on_order_modified(id, new_quantity, new_price));
            self.emit_top_if_changed(top_before);
            return Ok(());
        }

        debug!(
            order_id = id.0,
            new_quantity, new_price, "modify order (cancel and replace)"
        );
        let existing = self
            .book
            .remove_resting(id)
            .expect("order was just looked up");
        let mut replacement = Order {
            id,
            owner: existing.owner,
            side: existing.side,
            quantity: new_quantity,
            price: new_price,
            ts_received: existing.ts_received,
            ts_executed: now_millis(),
        };

        let trades = cross(&mut self.book, &mut replacement, self.next_execution_id);
        self.next_execution_id += trades.len() as u64;
        for trade in &trades {
            self.notify(|o| o.on_trade_executed(trade));
        }

        if replacement.quantity > 0 {
            self.book.insert_resting(replacement);
            self.notify(|o| o.on_order_modified(id, new_quantity, new_price));
        }

        self.emit_top_if_changed(top_before);
        Ok(())
    }

    /// Registers an observer under its own id, replacing any previous
    /// observer with that id.
    pub fn register_observer(&mut self, observer: Arc<dyn Observer>) {
        let id = observer.observer_id();
        if let Err(e) = observer.on_attach() {
            warn!(observer_id = id, observer = observer.name(), error = %e, "observer attach failed");
        }
        self.observers.insert(id, observer);
    }

    /// Unregisters an observer, notifying it of detachment. Returns whether
    /// an observer with that id was registered.
    pub fn unregister_observer(&mut self, observer_id: u64) -> bool {
        match self.observers.remove(&observer_id) {
            Some(observer) => {
                if let Err(e) = observer.on_detach() {
                    warn!(observer_id, observer = observer.name(), error = %e, "observer detach failed");
                }
                true
            }
            None => false,
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Highest bid price, or 0 when the bid side is empty.
    pub fn best_bid(&self) -> Price {
        self.book.best_bid()
    }

    /// Lowest ask price, or 0 when the ask side is empty.
    pub fn best_ask(&self) -> Price {
        self.book.best_ask()
    }

    pub fn total_bid_qty(&self) -> Quantity {
        self.book.total_bid_qty()
    }

    pub fn total_ask_qty(&self) -> Quantity {
        self.book.total_ask_qty()
    }

    /// Midpoint of best bid and ask, or 0 when either side is empty.
    pub fn mid(&self) -> Price {
        self.book.mid()
    }

    /// Best ask minus best bid, or 0 when either side is empty.
    pub fn spread(&self) -> Price {
        self.book.spread()
    }

    pub fn top_of_book(&self) -> TopOfBook {
        self.book.top_of_book()
    }

    /// Read access to the book, for inspection and invariant checks.
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Reports the rejection to observers, then hands the reason back for the
    /// caller. No state was touched.
    fn reject(&mut self, id: OrderId, reason: RejectReason) -> RejectReason {
        warn!(order_id = id.0, reason = %reason, "command rejected");
        self.notify(|o| o.on_order_rejected(id, reason));
        reason
    }

    fn emit_top_if_changed(&self, before: TopOfBook) {
        let after = self.book.top_of_book();
        if after != before {
            self.notify(|o| o.on_top_of_book(&after));
        }
    }

    fn notify<F>(&self, f: F)
    where
        F: Fn(&dyn Observer) -> ObserverResult,
    {
        for (id, observer) in &self.observers {
            if let Err(e) = f(observer.as_ref()) {
                warn!(observer_id = id, observer = observer.name(), error = %e, "observer callback failed");
            }
        }
    }
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for MatchingEngine {
    fn drop(&mut self) {
        for (id, observer) in &self.observers {
            if let Err(e) = observer.on_detach() {
                warn!(observer_id = id, observer = observer.name(), error = %e, "observer detach failed");
            }
        }
    }
}
