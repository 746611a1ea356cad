//! Observer protocol: listeners over the engine's event stream.
//!
//! Observers receive events synchronously inside the command that produced
//! them and must not call back into the engine on the same stack. A failing
//! callback does not abort the command; the engine logs the error and moves
//! on to the next observer.

use crate::events::{EngineEvent, TopOfBook, Trade};
use crate::types::{OrderId, Price, Quantity, RejectReason};
use std::io::Write;
use std::sync::Mutex;

/// Error an observer may surface from a callback.
pub type ObserverError = Box<dyn std::error::Error + Send + Sync>;

/// Result of one observer callback.
pub type ObserverResult = Result<(), ObserverError>;

/// A listener over the engine's event stream.
///
/// All event callbacks default to no-ops, so an implementation only writes
/// the handlers it cares about. Callbacks take `&self`; implementations that
/// keep state use interior mutability.
pub trait Observer: Send + Sync {
    /// Identifier used to unregister this observer.
    fn observer_id(&self) -> u64;

    /// Short name used in engine logs.
    fn name(&self) -> &str {
        "observer"
    }

    /// Called when the observer is registered with an engine.
    fn on_attach(&self) -> ObserverResult {
        Ok(())
    }

    /// Called when the observer is unregistered or the engine shuts down.
    fn on_detach(&self) -> ObserverResult {
        Ok(())
    }

    fn on_trade_executed(&self, _trade: &Trade) -> ObserverResult {
        Ok(())
    }

    fn on_order_acknowledged(&self, _order_id: OrderId) -> ObserverResult {
        Ok(())
    }

    fn on_order_cancelled(&self, _order_id: OrderId) -> ObserverResult {
        Ok(())
    }

    fn on_order_modified(
        &self,
        _order_id: OrderId,
        _new_quantity: Quantity,
        _new_price: Price,
    ) -> ObserverResult {
        Ok(())
    }

    fn on_order_rejected(&self, _order_id: OrderId, _reason: RejectReason) -> ObserverResult {
        Ok(())
    }

    fn on_top_of_book(&self, _top: &TopOfBook) -> ObserverResult {
        Ok(())
    }
}

/// In-memory observer that records every event, in order. Used by tests and
/// anything else that wants to inspect the stream after the fact.
pub struct RecordingObserver {
    observer_id: u64,
    events: Mutex<Vec<EngineEvent>>,
}

impl RecordingObserver {
    pub fn new(observer_id: u64) -> Self {
        Self {
            observer_id,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the recorded events.
    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().expect("lock").clone()
    }

    /// Drains and returns the recorded events.
    pub fn take_events(&self) -> Vec<EngineEvent> {
        std::mem::take(&mut *self.events.lock().expect("lock"))
    }

    pub fn clear(&self) {
        self.events.lock().expect("lock").clear();
    }

    fn push(&self, event: EngineEvent) -> ObserverResult {
        self.events.lock().expect("lock").push(event);
        Ok(())
    }
}

impl Observer for RecordingObserver {
    fn observer_id(&self) -> u64 {
        self.observer_id
    }

    fn name(&self) -> &str {
        "recording"
    }

    fn on_trade_executed(&self, trade: &Trade) -> ObserverResult {
        self.push(EngineEvent::TradeExecuted { trade: *trade })
    }

    fn on_order_acknowledged(&self, order_id: OrderId) -> ObserverResult {
        self.push(EngineEvent::OrderAcknowledged { order_id })
    }

    fn on_order_cancelled(&self, order_id: OrderId) -> ObserverResult {
        self.push(EngineEvent::OrderCancelled { order_id })
    }

    fn on_order_modified(
        &self,
        order_id: OrderId,
        new_quantity: Quantity,
        new_price: Price,
    ) -> ObserverResult {
        self.push(EngineEvent::OrderModified {
            order_id,
            new_quantity,
            new_price,
        })
    }

    fn on_order_rejected(&self, order_id: OrderId, reason: RejectReason) -> ObserverResult {
        self.push(EngineEvent::OrderRejected { order_id, reason })
    }

    fn on_top_of_book(&self, top: &TopOfBook) -> ObserverResult {
        self.push(EngineEvent::TopOfBookUpdate { top: *top })
    }
}

/// Writes one JSON line per event to the wrapped writer. The audit-trail
/// idiom: pipe to a file or a log collector and replay later.
pub struct JsonLineSink<W: Write + Send> {
    observer_id: u64,
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(observer_id: u64, writer: W) -> Self {
        Self {
            observer_id,
            writer: Mutex::new(writer),
        }
    }

    fn write_event(&self, event: &EngineEvent) -> ObserverResult {
        let line = serde_json::to_string(event)?;
        let mut writer = self.writer.lock().expect("lock");
        writeln!(writer, "{}", line)?;
        Ok(())
    }
}

impl JsonLineSink<std::io::Stdout> {
    pub fn stdout(observer_id: u64) -> Self {
        Self::new(observer_id, std::io::stdout())
    }
}

impl<W: Write + Send> Observer for JsonLineSink<W> {
    fn observer_id(&self) -> u64 {
        self.observer_id
    }

    fn name(&self) -> &str {
        "json-line"
    }

    fn on_detach(&self) -> ObserverResult {
        self.writer.lock().expect("lock").flush()?;
        Ok(())
    }

    fn on_trade_executed(&self, trade: &Trade) -> ObserverResult {
        self.write_event(&EngineEvent::TradeExecuted { trade: *trade })
    }

    fn on_order_acknowledged(&self, order_id: OrderId) -> ObserverResult {
        self.write_event(&EngineEvent::OrderAcknowledged { order_id })
    }

    fn on_order_cancelled(&self, order_id: OrderId) -> ObserverResult {
        self.write_event(&EngineEvent::OrderCancelled { order_id })
    }

    fn on_order_modified(
        &self,
        order_id: OrderId,
        new_quantity: Quantity,
        new_price: Price,
    ) -> ObserverResult {
        self.write_event(&EngineEvent::OrderModified {
            order_id,
            new_quantity,
            new_price,
        })
    }

    fn on_order_rejected(&self, order_id: OrderId, reason: RejectReason) -> ObserverResult {
        self.write_event(&EngineEvent::OrderRejected { order_id, reason })
    }

    fn on_top_of_book(&self, top: &TopOfBook) -> ObserverResult {
        self.write_event(&EngineEvent::TopOfBookUpdate { top: *top })
    }
}
