//! Matching core for a multi-symbol spot market
//!
//! Continuous-auction order matching under strict price-time priority:
//! per-symbol order books, a matching engine that pairs incoming orders
//! against resting liquidity and settles cash atomically with trade
//! creation, and a manager that serializes writes within a symbol while
//! letting symbols proceed in parallel.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced (best price first, FIFO within
//!   a price level)
//! - Trades execute at the resting (maker) price
//! - Conservation of quantity and cash per trade
//! - Per-symbol linearizability under one writer lock per symbol

pub mod book;
pub mod engine;
pub mod exchange;
pub mod manager;
pub mod matching;
pub mod memory;
pub mod ports;

pub use engine::MatchingEngine;
pub use exchange::{Exchange, NewOrder, PlacedOrder};
pub use manager::OrderBookManager;
