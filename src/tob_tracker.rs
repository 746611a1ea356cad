//! Top-of-book CSV sink: one row per top-of-book update.
//!
//! Column layout: `ts_millis,best_bid,best_ask,bid_qty,ask_qty,mid,spread`.
//! Prices are raw ticks; downstream analysis applies its own scaling.

use crate::events::TopOfBook;
use crate::observer::{Observer, ObserverResult};
use crate::types::now_millis;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

pub struct TopOfBookTracker<W: Write + Send> {
    observer_id: u64,
    writer: Mutex<W>,
}

impl TopOfBookTracker<BufWriter<File>> {
    /// Creates (truncating) the CSV file at `path` and writes the header row.
    pub fn create(observer_id: u64, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(writer, "ts_millis,best_bid,best_ask,bid_qty,ask_qty,mid,spread")?;
        Ok(Self {
            observer_id,
            writer: Mutex::new(writer),
        })
    }
}

impl<W: Write + Send> TopOfBookTracker<W> {
    /// Wraps an arbitrary writer. The caller writes its own header if it
    /// wants one.
    pub fn with_writer(observer_id: u64, writer: W) -> Self {
        Self {
            observer_id,
            writer: Mutex::new(writer),
        }
    }

    pub fn flush(&self) -> std::io::Result<()> {
        self.writer.lock().expect("lock").flush()
    }
}

impl<W: Write + Send> Observer for TopOfBookTracker<W> {
    fn observer_id(&self) -> u64 {
        self.observer_id
    }

    fn name(&self) -> &str {
        "tob-csv"
    }

    fn on_detach(&self) -> ObserverResult {
        self.flush()?;
        Ok(())
    }

    fn on_top_of_book(&self, top: &TopOfBook) -> ObserverResult {
        let mut writer = self.writer.lock().expect("lock");
        writeln!(
            writer,
            "{},{},{},{},{},{},{}",
            now_millis(),
            top.best_bid,
            top.best_ask,
            top.bid_qty,
            top.ask_qty,
            top.mid(),
            top.spread()
        )?;
        Ok(())
    }
}
