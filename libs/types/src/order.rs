//! Order lifecycle types
//!
//! An order is a trading intent. The engine advances `filled_quantity` and
//! `status` along `PENDING → PARTIALLY_FILLED → FILLED`, with `CANCELLED`
//! reachable from the two open states only. Terminal orders never change.

use crate::ids::{OrderId, Symbol, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Get the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order kind.
///
/// LIMIT orders carry a price and may rest on the book; MARKET orders have
/// no price, match against whatever liquidity exists, and never rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderKind {
    Limit,
    Market,
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, no fills yet.
    Pending,
    /// Some quantity filled, remainder still active.
    PartiallyFilled,
    /// Completely filled (terminal).
    Filled,
    /// Cancelled by the owner (terminal).
    Cancelled,
}

impl OrderStatus {
    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

/// A trading intent owned by a user.
///
/// `price` is `Some` for LIMIT orders and `None` for MARKET orders.
/// Timestamps are unix nanos; `created_at` resolves time priority.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub symbol: Symbol,
    pub side: Side,
    pub kind: OrderKind,
    pub price: Option<Price>,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Order {
    /// Create a new pending order.
    pub fn new(
        user_id: UserId,
        symbol: Symbol,
        side: Side,
        kind: OrderKind,
        price: Option<Price>,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            id: OrderId::new(),
            user_id,
            symbol,
            side,
            kind,
            price,
            quantity,
            filled_quantity: Quantity::zero(),
            status: OrderStatus::Pending,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Unfilled quantity: `quantity − filled_quantity`.
    pub fn remaining(&self) -> Quantity {
        Quantity::try_new(self.quantity.as_decimal() - self.filled_quantity.as_decimal())
            .unwrap_or(Quantity::zero())
    }

    pub fn is_fully_filled(&self) -> bool {
        self.filled_quantity >= self.quantity
    }

    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Whether the order can still trade or be cancelled.
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            OrderStatus::Pending | OrderStatus::PartiallyFilled
        )
    }

    /// Record a fill and advance the status machine.
    ///
    /// # Panics
    /// Panics if the fill would exceed the order quantity or the order is
    /// not open. Both indicate a matching-loop bug.
    pub fn fill(&mut self, quantity: Quantity, timestamp: i64) {
        assert!(self.is_open(), "cannot fill a terminal order");

        let new_filled = self.filled_quantity + quantity;
        assert!(
            new_filled <= self.quantity,
            "fill would exceed order quantity"
        );

        self.filled_quantity = new_filled;
        self.status = if self.is_fully_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;
    }

    /// Cancel the order.
    ///
    /// # Panics
    /// Panics if the order is already terminal; callers gate on `is_open`.
    pub fn cancel(&mut self, timestamp: i64) {
        assert!(self.is_open(), "cannot cancel a terminal order");

        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
    }
}
