//! Matching engine
//!
//! Drives continuous matching for one incoming order under its symbol's
//! writer lock: plan fills against the opposite ladder, commit them through
//! the ports (cash, order state, trade log), then mutate the book and rest
//! any LIMIT residual. MARKET remainders are dropped — a MARKET order never
//! rests.

use std::sync::Arc;

use tracing::{error, info};
use types::errors::{ExchangeError, ValidationError};
use types::ids::{OrderId, Symbol};
use types::order::{Order, OrderKind, Side};
use types::trade::Trade;

use crate::book::BookSnapshot;
use crate::manager::OrderBookManager;
use crate::matching::{plan, settlement};
use crate::ports::{BalanceStore, Clock, OrderStore, TradeStore};

/// Price-time priority matching engine over a set of per-symbol books.
///
/// Cheap to clone; clones share the same books and ports, so one engine
/// can serve many threads.
#[derive(Clone)]
pub struct MatchingEngine {
    books: Arc<OrderBookManager>,
    orders: Arc<dyn OrderStore>,
    trades: Arc<dyn TradeStore>,
    balances: Arc<dyn BalanceStore>,
    clock: Arc<dyn Clock>,
}

impl MatchingEngine {
    pub fn new(
        books: Arc<OrderBookManager>,
        orders: Arc<dyn OrderStore>,
        trades: Arc<dyn TradeStore>,
        balances: Arc<dyn BalanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            books,
            orders,
            trades,
            balances,
            clock,
        }
    }

    /// Match an incoming order against its book and return the trades in
    /// execution order.
    ///
    /// The order must already be persisted as `PENDING` with no fills. Any
    /// port failure aborts the whole call; compensation in the settlement
    /// layer guarantees no net external effect, and the book is only
    /// touched after every port call has succeeded.
    pub fn execute_order(&self, order: Order) -> Result<Vec<Trade>, ExchangeError> {
        validate_for_matching(&order)?;

        let handle = self.books.book(&order.symbol);
        let mut book = handle.write().expect("symbol lock poisoned");
        let now = self.clock.now();

        info!(
            order_id = %order.id,
            symbol = %order.symbol,
            side = ?order.side,
            kind = ?order.kind,
            quantity = %order.quantity,
            "executing order"
        );

        let fills = plan::plan_fills(&book, &order, now);

        let mut taker = order.clone();
        for fill in &fills {
            taker.fill(fill.quantity, now);
        }

        let trades = settlement::commit(
            &*self.orders,
            &*self.trades,
            &*self.balances,
            &order,
            &taker,
            &fills,
            now,
        )
        .map_err(|err| {
            error!(order_id = %order.id, %err, "order execution aborted");
            ExchangeError::from(err)
        })?;

        // All ports have committed; mirror the fills into the book.
        for fill in &fills {
            if fill.maker_after.is_fully_filled() {
                book.remove(&fill.maker_after);
            } else {
                let head = match taker.side {
                    Side::Buy => book.best_ask_mut(),
                    Side::Sell => book.best_bid_mut(),
                };
                let maker = head.expect("partially filled maker must still rest");
                debug_assert_eq!(maker.id, fill.maker_after.id);
                *maker = fill.maker_after.clone();
            }
        }

        // LIMIT residual rests at its limit price; MARKET residual is dropped.
        if !taker.is_fully_filled() && taker.kind == OrderKind::Limit {
            let resting = taker.clone();
            match taker.side {
                Side::Buy => book.add_bid(resting),
                Side::Sell => book.add_ask(resting),
            }
            .expect("validated aggressor must be bookable");
        }

        info!(
            order_id = %taker.id,
            filled = %taker.filled_quantity,
            total = %taker.quantity,
            trades = trades.len(),
            "order execution complete"
        );

        Ok(trades)
    }

    /// Cancel an order: remove it from its book if still open, mark it
    /// `CANCELLED`, persist. Terminal orders are a no-op returning their
    /// current state, so cancellation is idempotent.
    pub fn cancel_order(&self, order_id: OrderId) -> Result<Order, ExchangeError> {
        let found = self
            .orders
            .find_by_id(order_id)?
            .ok_or(ExchangeError::OrderNotFound { order_id })?;

        let handle = self.books.book(&found.symbol);
        let mut book = handle.write().expect("symbol lock poisoned");

        // Re-read under the writer lock: a match racing this cancel may
        // have completed the order between the lookup and the lock.
        let mut order = self
            .orders
            .find_by_id(order_id)?
            .ok_or(ExchangeError::OrderNotFound { order_id })?;

        if order.is_open() {
            book.remove(&order);
            order.cancel(self.clock.now());
            self.orders.save(&order)?;
            info!(order_id = %order.id, symbol = %order.symbol, "order cancelled");
        }

        Ok(order)
    }

    /// Read-locked aggregated view of a symbol's book.
    pub fn snapshot(&self, symbol: &Symbol) -> BookSnapshot {
        self.books.snapshot(symbol)
    }

    pub fn books(&self) -> &OrderBookManager {
        &self.books
    }
}

/// Fail fast on inputs the matching loop cannot handle; no book mutation
/// has happened yet at this point.
fn validate_for_matching(order: &Order) -> Result<(), ValidationError> {
    match order.kind {
        OrderKind::Limit if order.price.is_none() => Err(ValidationError::MissingPrice),
        OrderKind::Market if order.price.is_some() => Err(ValidationError::UnexpectedPrice),
        _ => Ok(()),
    }
}
