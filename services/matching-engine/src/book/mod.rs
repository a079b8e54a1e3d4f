//! Order book infrastructure
//!
//! Contains the per-symbol priced FIFO structure and its price levels.
//! The book knows nothing about matching policy, users, or persistence.

pub mod order_book;
pub mod price_level;

pub use order_book::{BookError, BookSnapshot, LevelSnapshot, OrderBook};
pub use price_level::PriceLevel;
