//! One price level: a FIFO queue of resting orders sharing a price.
//!
//! Ties at a price are broken strictly by insertion order; a partially filled
//! order keeps its queue position. `total_qty` is maintained in lockstep with
//! every enqueue, removal, and fill.

use crate::events::Trade;
use crate::types::{ExecutionId, Order, OrderId, Price, Quantity};
use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct PriceLevel {
    price: Price,
    queue: VecDeque<Order>,
    total_qty: Quantity,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            queue: VecDeque::new(),
            total_qty: 0,
        }
    }

    pub fn price(&self) -> Price {
        self.price
    }

    /// Sum of remaining quantity over the queue.
    pub fn total_qty(&self) -> Quantity {
        self.total_qty
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// The order at the head of the queue (highest time priority).
    pub fn front(&self) -> Option<&Order> {
        self.queue.front()
    }

    /// Orders in queue (time-priority) order.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.queue.iter()
    }

    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.queue.iter().find(|o| o.id == id)
    }

    /// Appends the order at the tail.
    pub fn enqueue(&mut self, order: Order) {
        debug_assert_eq!(order.price, self.price);
        self.total_qty += order.quantity;
        self.queue.push_back(order);
    }

    /// Unlinks the order with `id` from its queue position. Returns the
    /// removed order, or `None` if no such order is queued here.
    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let pos = self.queue.iter().position(|o| o.id == id)?;
        let order = self.queue.remove(pos).expect("position is in range");
        self.total_qty -= order.quantity;
        Some(order)
    }

    /// In-place size reduction. Keeps the order's queue position and
    /// timestamps. Returns the previous remaining quantity, or `None` if the
    /// order is not queued here or `new_qty` is not a reduction to a positive
    /// quantity.
    pub fn reduce_quantity(&mut self, id: OrderId, new_qty: Quantity) -> Option<Quantity> {
        let order = self.queue.iter_mut().find(|o| o.id == id)?;
        if new_qty == 0 || new_qty > order.quantity {
            return None;
        }
        let old_qty = order.quantity;
        order.quantity = new_qty;
        self.total_qty -= old_qty - new_qty;
        Some(old_qty)
    }

    /// Consumes up to `max_qty` from the head of the queue, producing one
    /// trade per resting order touched. Execution ids are assigned starting
    /// at `next_execution_id`.
    ///
    /// Fully consumed orders are popped from the queue; their ids come back
    /// in the second element so the book can drop them from its index.
    pub fn fill_up_to(
        &mut self,
        incoming: &Order,
        max_qty: Quantity,
        next_execution_id: u64,
    ) -> (Vec<Trade>, Vec<OrderId>) {
        let mut trades = Vec::new();
        let mut consumed = Vec::new();
        let mut remaining = max_qty;
        let mut exec_id = next_execution_id;

        while remaining > 0 {
            let Some(top) = self.queue.front_mut() else {
                break;
            };
            let fill_qty = remaining.min(top.quantity);
            trades.push(Trade {
                execution_id: ExecutionId(exec_id),
                aggressor_order_id: incoming.id,
                resting_order_id: top.id,
                aggressor_owner_id: incoming.owner,
                resting_owner_id: top.owner,
                price: self.price,
                quantity: fill_qty,
                ts_received: incoming.ts_received,
                ts_executed: incoming.ts_executed,
            });
            exec_id += 1;

            top.quantity -= fill_qty;
            self.total_qty -= fill_qty;
            remaining -= fill_qty;

            if top.quantity == 0 {
                consumed.push(top.id);
                self.queue.pop_front();
            }
        }

        (trades, consumed)
    }
}
