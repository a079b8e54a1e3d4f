//! Trade records
//!
//! A trade is a point-in-time match between one buy and one sell order,
//! executed at the resting (maker) price.

use crate::ids::{OrderId, TradeId};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub buy_order_id: OrderId,
    pub sell_order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
    /// Capture time, unix nanos.
    pub timestamp: i64,
}

impl Trade {
    pub fn new(
        buy_order_id: OrderId,
        sell_order_id: OrderId,
        price: Price,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            id: TradeId::new(),
            buy_order_id,
            sell_order_id,
            price,
            quantity,
            timestamp,
        }
    }

    /// Cash moved by this trade: `price × quantity`.
    pub fn notional(&self) -> Decimal {
        self.quantity * self.price
    }
}
