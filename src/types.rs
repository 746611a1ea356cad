//! Core identifiers, the order record, and the rejection taxonomy.
//!
//! All identifiers are newtype wrappers over `u64`. Prices and quantities are
//! integer ticks; the engine performs no scaling and never sees floats.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique order identifier, chosen by the caller (in practice taken from the
/// upstream feed).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Owner (account) identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OwnerId(pub u64);

/// Execution identifier, assigned by the engine. Strictly increasing across
/// the life of one engine instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExecutionId(pub u64);

/// Price in ticks.
pub type Price = u64;

/// Quantity in whole units.
pub type Quantity = u64;

/// Order side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// The side an incoming order matches against.
    pub fn opposite(self) -> Side {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// A limit order.
///
/// While resting in the book, `quantity` is the remaining (unfilled)
/// quantity. Timestamps are caller-supplied when replaying a historical feed,
/// otherwise wall-clock milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub owner: OwnerId,
    pub side: Side,
    pub quantity: Quantity,
    pub price: Price,
    /// When the order was received upstream.
    pub ts_received: u64,
    /// When the order hit the engine.
    pub ts_executed: u64,
}

/// Why a command was rejected.
///
/// A rejected command leaves no state change: the engine reports the
/// rejection to observers as `OrderRejected`, then returns it to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// Quantity is zero (add or modify).
    InvalidQuantity,
    /// Add with an order id already resting in the book.
    DuplicateId,
    /// Cancel or modify for an id not resting in the book. An order that was
    /// fully consumed leaves the book, so this also covers modify-after-fill.
    NotFound,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::InvalidQuantity => write!(f, "quantity must be greater than zero"),
            RejectReason::DuplicateId => write!(f, "order id already exists"),
            RejectReason::NotFound => write!(f, "order id not found"),
        }
    }
}

impl std::error::Error for RejectReason {}

/// Result type for engine commands.
pub type EngineResult<T> = Result<T, RejectReason>;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_side_flips() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn reject_reason_display() {
        assert_eq!(
            RejectReason::DuplicateId.to_string(),
            "order id already exists"
        );
        assert_eq!(RejectReason::NotFound.to_string(), "order id not found");
    }

    #[test]
    fn reject_reason_round_trips_through_json() {
        let reason = RejectReason::InvalidQuantity;
        let json = serde_json::to_string(&reason).unwrap();
        let back: RejectReason = serde_json::from_str(&json).unwrap();
        assert_eq!(reason, back);
    }
}
