//! Price level with FIFO queue
//!
//! A price level holds every resting order at one price on one side, in
//! arrival order. Time priority within the level is the queue order;
//! implementations must never reorder equal-priced orders.

use rust_decimal::Decimal;
use std::collections::VecDeque;
use types::ids::OrderId;
use types::order::Order;

/// Resting orders at a single price, FIFO by arrival.
///
/// The level owns its orders; aggregates are computed from the live
/// remaining quantities rather than cached, so in-place fills on the head
/// order can never leave a stale total behind.
#[derive(Debug, Clone, Default)]
pub struct PriceLevel {
    orders: VecDeque<Order>,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
        }
    }

    /// Append an order at the back of the queue (time priority).
    pub fn push(&mut self, order: Order) {
        self.orders.push_back(order);
    }

    /// Remove an order by identity, preserving the order of the rest.
    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let position = self.orders.iter().position(|order| order.id == id)?;
        self.orders.remove(position)
    }

    /// Peek at the front order without removing it.
    pub fn front(&self) -> Option<&Order> {
        self.orders.front()
    }

    pub fn front_mut(&mut self) -> Option<&mut Order> {
        self.orders.front_mut()
    }

    pub fn pop_front(&mut self) -> Option<Order> {
        self.orders.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Number of orders resting at this level.
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Sum of remaining quantities across the level.
    pub fn total_remaining(&self) -> Decimal {
        self.orders
            .iter()
            .map(|order| order.remaining().as_decimal())
            .sum()
    }

    /// Iterate the level in time priority.
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }
}
