//! Continuous price-time matching: the cross loop.
//!
//! An incoming order walks the opposite ladder from the best price inward,
//! filling FIFO within each level, until its quantity is exhausted or the
//! best opposite price no longer crosses its limit. Trades price at the
//! resting level. The book is only ever crossed transiently inside this loop.

use crate::book::Book;
use crate::events::Trade;
use crate::types::{Order, Quantity, Side};
use tracing::trace;

/// Runs the incoming order against the opposite ladder, mutating its
/// remaining quantity. Execution ids are assigned starting at
/// `next_execution_id`; the caller advances its counter by `trades.len()`.
pub(crate) fn cross(book: &mut Book, incoming: &mut Order, next_execution_id: u64) -> Vec<Trade> {
    let mut trades = Vec::new();
    let mut exec_id = next_execution_id;

    while incoming.quantity > 0 {
        let Some(best) = book.best_opposite(incoming.side) else {
            break;
        };
        let crosses = match incoming.side {
            Side::Buy => incoming.price >= best,
            Side::Sell => incoming.price <= best,
        };
        if !crosses {
            break;
        }

        let level_trades = book.fill_at(
            incoming.side.opposite(),
            best,
            incoming,
            incoming.quantity,
            exec_id,
        );
        let filled: Quantity = level_trades.iter().map(|t| t.quantity).sum();
        assert!(filled > 0, "empty price level survived in the ladder");
        trace!(price = best, filled, fills = level_trades.len(), "crossed level");

        incoming.quantity -= filled;
        exec_id += level_trades.len() as u64;
        trades.extend(level_trades);
    }

    trades
}
