//! Per-symbol order book
//!
//! Two price-indexed ladders of FIFO levels: bids iterated by descending
//! price, asks by ascending price. `BTreeMap` keeps level iteration
//! deterministic; empty levels are removed on the spot.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use types::ids::Symbol;
use types::numeric::Price;
use types::order::{Order, Side};

use super::price_level::PriceLevel;

/// Rejected book mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookError {
    #[error("expected a {expected:?} order, got {actual:?}")]
    WrongSide { expected: Side, actual: Side },

    #[error("order without a price cannot rest on the book")]
    Unpriced,
}

/// One aggregated price level of a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Price,
    /// Total remaining quantity across the level.
    pub quantity: Decimal,
    pub order_count: usize,
}

/// Aggregated view of a book at an instant: bids descending, asks ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    pub bids: Vec<LevelSnapshot>,
    pub asks: Vec<LevelSnapshot>,
}

impl BookSnapshot {
    /// Snapshot of a symbol no book exists for yet.
    pub fn empty(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: Vec::new(),
            asks: Vec::new(),
        }
    }
}

/// In-memory priced FIFO structure for one symbol.
///
/// Every resting order has `remaining > 0` and an open status; an order
/// appears in at most one ladder. The book enforces neither — the engine
/// does — but every operation here preserves them.
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BTreeMap<Price, PriceLevel>,
    asks: BTreeMap<Price, PriceLevel>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Append a BUY order to the FIFO at its price.
    pub fn add_bid(&mut self, order: Order) -> Result<(), BookError> {
        Self::add(&mut self.bids, Side::Buy, &self.symbol, order)
    }

    /// Append a SELL order to the FIFO at its price.
    pub fn add_ask(&mut self, order: Order) -> Result<(), BookError> {
        Self::add(&mut self.asks, Side::Sell, &self.symbol, order)
    }

    fn add(
        ladder: &mut BTreeMap<Price, PriceLevel>,
        expected: Side,
        symbol: &Symbol,
        order: Order,
    ) -> Result<(), BookError> {
        if order.side != expected {
            return Err(BookError::WrongSide {
                expected,
                actual: order.side,
            });
        }
        let price = order.price.ok_or(BookError::Unpriced)?;

        debug!(order_id = %order.id, %symbol, %price, side = ?expected, "resting order added");
        ladder.entry(price).or_default().push(order);
        Ok(())
    }

    /// Head of the highest-priced bid queue. Pure peek.
    pub fn best_bid(&self) -> Option<&Order> {
        self.bids.values().next_back().and_then(PriceLevel::front)
    }

    /// Head of the lowest-priced ask queue. Pure peek.
    pub fn best_ask(&self) -> Option<&Order> {
        self.asks.values().next().and_then(PriceLevel::front)
    }

    pub(crate) fn best_bid_mut(&mut self) -> Option<&mut Order> {
        self.bids
            .values_mut()
            .next_back()
            .and_then(PriceLevel::front_mut)
    }

    pub(crate) fn best_ask_mut(&mut self) -> Option<&mut Order> {
        self.asks.values_mut().next().and_then(PriceLevel::front_mut)
    }

    /// Remove an order by identity from its price level.
    ///
    /// Returns false if the order is not resting. A level left empty is
    /// removed from its ladder.
    pub fn remove(&mut self, order: &Order) -> bool {
        let Some(price) = order.price else {
            return false;
        };
        let ladder = match order.side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        };

        let Some(level) = ladder.get_mut(&price) else {
            return false;
        };
        if level.remove(order.id).is_none() {
            return false;
        }
        if level.is_empty() {
            ladder.remove(&price);
        }
        debug!(order_id = %order.id, symbol = %self.symbol, %price, side = ?order.side, "resting order removed");
        true
    }

    /// Iterate bids in price-time priority (price descending, FIFO within).
    pub fn iter_bids(&self) -> impl Iterator<Item = &Order> {
        self.bids.values().rev().flat_map(PriceLevel::iter)
    }

    /// Iterate asks in price-time priority (price ascending, FIFO within).
    pub fn iter_asks(&self) -> impl Iterator<Item = &Order> {
        self.asks.values().flat_map(PriceLevel::iter)
    }

    /// Aggregated levels from remaining quantities: bids desc, asks asc.
    pub fn snapshot(&self) -> BookSnapshot {
        let level_view = |(price, level): (&Price, &PriceLevel)| LevelSnapshot {
            price: *price,
            quantity: level.total_remaining(),
            order_count: level.order_count(),
        };

        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: self.bids.iter().rev().map(level_view).collect(),
            asks: self.asks.iter().map(level_view).collect(),
        }
    }

    /// Both ladders empty.
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Total resting orders across both ladders.
    pub fn order_count(&self) -> usize {
        self.bids
            .values()
            .chain(self.asks.values())
            .map(PriceLevel::order_count)
            .sum()
    }
}
