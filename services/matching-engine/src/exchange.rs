//! Admission flow
//!
//! The `Exchange` fronts the matching engine for the surrounding system:
//! it validates incoming order requests, pre-checks buyer cash, persists
//! the order as `PENDING`, and only then hands it to the engine. Cancels
//! are ownership-checked here before reaching the engine.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::debug;
use types::errors::{ExchangeError, ValidationError};
use types::ids::{OrderId, Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderKind, Side};
use types::trade::Trade;

use crate::book::BookSnapshot;
use crate::engine::MatchingEngine;
use crate::manager::OrderBookManager;
use crate::memory::{MemoryBalanceStore, MemoryOrderStore, MemoryTradeStore, SystemClock};
use crate::ports::{BalanceStore, Clock, OrderStore, TradeStore};

/// An order request as submitted by a user, before validation.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub symbol: String,
    pub side: Side,
    pub kind: OrderKind,
    pub price: Option<Decimal>,
    pub quantity: Decimal,
}

/// Outcome of a successful placement: the order's post-execution state and
/// the trades it produced, in execution order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub trades: Vec<Trade>,
}

/// Order placement and cancellation surface around the engine.
#[derive(Clone)]
pub struct Exchange {
    engine: MatchingEngine,
    orders: Arc<dyn OrderStore>,
    trades: Arc<dyn TradeStore>,
    balances: Arc<dyn BalanceStore>,
    clock: Arc<dyn Clock>,
}

impl Exchange {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        trades: Arc<dyn TradeStore>,
        balances: Arc<dyn BalanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let engine = MatchingEngine::new(
            Arc::new(OrderBookManager::new()),
            orders.clone(),
            trades.clone(),
            balances.clone(),
            clock.clone(),
        );
        Self {
            engine,
            orders,
            trades,
            balances,
            clock,
        }
    }

    /// Fully in-memory exchange: the default wiring, and the test substrate.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryOrderStore::new()),
            Arc::new(MemoryTradeStore::new()),
            Arc::new(MemoryBalanceStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Credit cash to a user, creating the account on first use.
    pub fn deposit(&self, user: UserId, amount: Decimal) -> Result<(), ExchangeError> {
        self.balances.deposit(user, amount)?;
        Ok(())
    }

    /// Validate, pre-check funds, persist, and execute an order.
    pub fn place_order(&self, request: NewOrder) -> Result<PlacedOrder, ExchangeError> {
        let order = validate(request, self.clock.now())?;

        let available = self
            .balances
            .balance_of(order.user_id)?
            .ok_or(ExchangeError::UserNotFound {
                user_id: order.user_id,
            })?;

        // BUY orders must be covered up front. LIMIT reserves the full
        // notional; MARKET has no price, so quantity stands in as a rough
        // notional estimate.
        if order.side == Side::Buy {
            let required = match order.kind {
                OrderKind::Limit => {
                    order.quantity * order.price.expect("validated LIMIT carries a price")
                }
                OrderKind::Market => order.quantity.as_decimal(),
            };
            if available < required {
                return Err(ExchangeError::InsufficientFunds {
                    required,
                    available,
                });
            }
        }

        self.orders.save(&order)?;
        debug!(order_id = %order.id, user_id = %order.user_id, symbol = %order.symbol, "order admitted");

        let trades = self.engine.execute_order(order.clone())?;
        let order = self.orders.find_by_id(order.id)?.unwrap_or(order);

        Ok(PlacedOrder { order, trades })
    }

    /// Cancel an order on behalf of its owner.
    pub fn cancel_order(&self, order_id: OrderId, user_id: UserId) -> Result<Order, ExchangeError> {
        let order = self
            .orders
            .find_by_id(order_id)?
            .ok_or(ExchangeError::OrderNotFound { order_id })?;

        if order.user_id != user_id {
            return Err(ExchangeError::NotOwner { order_id, user_id });
        }

        self.engine.cancel_order(order_id)
    }

    /// Aggregated book for a symbol; unknown symbols yield an empty view.
    pub fn order_book(&self, symbol: &str) -> Result<BookSnapshot, ExchangeError> {
        let symbol = Symbol::try_new(symbol).ok_or(ValidationError::EmptySymbol)?;
        Ok(self.engine.snapshot(&symbol))
    }

    pub fn order(&self, order_id: OrderId) -> Result<Order, ExchangeError> {
        self.orders
            .find_by_id(order_id)?
            .ok_or(ExchangeError::OrderNotFound { order_id })
    }

    /// All orders ever placed by a user, oldest first.
    pub fn user_orders(&self, user_id: UserId) -> Result<Vec<Order>, ExchangeError> {
        Ok(self.orders.find_by_user(user_id)?)
    }

    pub fn balance_of(&self, user_id: UserId) -> Result<Decimal, ExchangeError> {
        self.balances
            .balance_of(user_id)?
            .ok_or(ExchangeError::UserNotFound { user_id })
    }

    /// Trades an order participated in, on either side.
    pub fn trades_for(&self, order_id: OrderId) -> Result<Vec<Trade>, ExchangeError> {
        Ok(self
            .trades
            .all()?
            .into_iter()
            .filter(|trade| trade.buy_order_id == order_id || trade.sell_order_id == order_id)
            .collect())
    }

    pub fn engine(&self) -> &MatchingEngine {
        &self.engine
    }
}

/// Turn a raw request into a `PENDING` order, or reject it. Runs before
/// any state change.
fn validate(request: NewOrder, timestamp: i64) -> Result<Order, ValidationError> {
    let symbol = Symbol::try_new(&request.symbol).ok_or(ValidationError::EmptySymbol)?;

    let quantity = Quantity::try_new(request.quantity)
        .ok_or_else(|| ValidationError::InvalidQuantity(request.quantity.to_string()))?;

    let price = match (request.kind, request.price) {
        (OrderKind::Limit, Some(price)) => Some(
            Price::try_new(price).ok_or_else(|| ValidationError::InvalidPrice(price.to_string()))?,
        ),
        (OrderKind::Limit, None) => return Err(ValidationError::MissingPrice),
        (OrderKind::Market, None) => None,
        (OrderKind::Market, Some(_)) => return Err(ValidationError::UnexpectedPrice),
    };

    Ok(Order::new(
        request.user_id,
        symbol,
        request.side,
        request.kind,
        price,
        quantity,
        timestamp,
    ))
}
