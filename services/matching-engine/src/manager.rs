//! Order book manager
//!
//! Owns the per-symbol books and their concurrency primitive. Each symbol
//! maps to one `RwLock<OrderBook>`: the engine takes the writer lock for
//! execution and cancellation, readers for snapshots. Different symbols
//! share nothing and proceed in parallel; no global lock exists.

use dashmap::DashMap;
use std::sync::{Arc, RwLock};
use types::ids::Symbol;

use crate::book::{BookSnapshot, OrderBook};

/// Registry of order books keyed by symbol.
///
/// Creation is lazy, idempotent, and race-free: concurrent callers for the
/// same symbol observe the same book-and-lock handle, which stays stable
/// for the process lifetime. Not a singleton — independent managers (and
/// hence independent engines) coexist freely.
#[derive(Debug, Default)]
pub struct OrderBookManager {
    books: DashMap<Symbol, Arc<RwLock<OrderBook>>>,
}

impl OrderBookManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// The book handle for a symbol, created empty on first sight.
    pub fn book(&self, symbol: &Symbol) -> Arc<RwLock<OrderBook>> {
        self.books
            .entry(symbol.clone())
            .or_insert_with(|| Arc::new(RwLock::new(OrderBook::new(symbol.clone()))))
            .clone()
    }

    /// Read-locked snapshot; unknown symbols yield an empty snapshot.
    pub fn snapshot(&self, symbol: &Symbol) -> BookSnapshot {
        match self.books.get(symbol) {
            Some(handle) => handle
                .read()
                .expect("symbol lock poisoned")
                .snapshot(),
            None => BookSnapshot::empty(symbol.clone()),
        }
    }

    /// Number of symbols seen so far.
    pub fn symbol_count(&self) -> usize {
        self.books.len()
    }
}
