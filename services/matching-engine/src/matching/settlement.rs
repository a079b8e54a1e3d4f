//! Trade settlement
//!
//! Commits a planned match through the external ports: cash moves first,
//! order state second, the trade log last. Appending trades last means a
//! visible trade always has its cash movement and order updates behind it.
//! Any port failure triggers compensation — applied balance deltas are
//! reversed and order pre-images restored — so a failed execution leaves
//! no net external effect.

use rust_decimal::Decimal;
use tracing::error;
use types::errors::StorageError;
use types::ids::UserId;
use types::order::{Order, Side};
use types::trade::Trade;

use crate::matching::plan::FillPlan;
use crate::ports::{BalanceStore, OrderStore, TradeStore};

/// Buyer and seller of a fill, resolved from the aggressor's side.
fn parties(taker: &Order, fill: &FillPlan) -> (UserId, UserId) {
    match taker.side {
        Side::Buy => (taker.user_id, fill.maker_before.user_id),
        Side::Sell => (fill.maker_before.user_id, taker.user_id),
    }
}

/// Persist the fills of one order execution as an atomic unit.
///
/// On success returns the trades in execution order. On failure the
/// applied balance deltas are reversed, order pre-images re-saved, and the
/// error surfaced; the caller must not have mutated the book yet.
pub fn commit(
    orders: &dyn OrderStore,
    trade_log: &dyn TradeStore,
    balances: &dyn BalanceStore,
    taker_before: &Order,
    taker_after: &Order,
    fills: &[FillPlan],
    timestamp: i64,
) -> Result<Vec<Trade>, StorageError> {
    let mut applied: Vec<(UserId, Decimal)> = Vec::with_capacity(fills.len() * 2);
    let mut pre_images: Vec<&Order> = Vec::with_capacity(fills.len() + 1);

    // Cash settlement: debit buyer, credit seller by p·q for every fill.
    for fill in fills {
        let notional = fill.quantity * fill.price;
        let (buyer, seller) = parties(taker_after, fill);

        for (user, delta) in [(buyer, -notional), (seller, notional)] {
            if let Err(err) = balances.adjust(user, delta) {
                error!(order_id = %taker_after.id, %user, %err, "balance adjustment failed, rolling back");
                unwind_balances(balances, &applied);
                return Err(err);
            }
            applied.push((user, delta));
        }
    }

    // Order state: makers in execution order, then the aggressor.
    let updates = fills
        .iter()
        .map(|fill| (&fill.maker_before, &fill.maker_after))
        .chain(std::iter::once((taker_before, taker_after)));
    for (before, after) in updates {
        if let Err(err) = orders.save(after) {
            error!(order_id = %taker_after.id, failed_order = %after.id, %err, "order persistence failed, rolling back");
            unwind_balances(balances, &applied);
            unwind_orders(orders, &pre_images);
            return Err(err);
        }
        pre_images.push(before);
    }

    // Trade log, one append per fill.
    let mut trades = Vec::with_capacity(fills.len());
    for fill in fills {
        let (buy_order_id, sell_order_id) = match taker_after.side {
            Side::Buy => (taker_after.id, fill.maker_before.id),
            Side::Sell => (fill.maker_before.id, taker_after.id),
        };

        let trade = Trade::new(buy_order_id, sell_order_id, fill.price, fill.quantity, timestamp);
        if let Err(err) = trade_log.save(&trade) {
            error!(order_id = %taker_after.id, trade_id = %trade.id, %err, "trade append failed, rolling back");
            unwind_balances(balances, &applied);
            unwind_orders(orders, &pre_images);
            return Err(err);
        }
        trades.push(trade);
    }

    Ok(trades)
}

fn unwind_balances(balances: &dyn BalanceStore, applied: &[(UserId, Decimal)]) {
    for (user, delta) in applied.iter().rev() {
        if let Err(err) = balances.adjust(*user, -delta) {
            error!(%user, %delta, %err, "balance compensation failed, ledger needs manual repair");
        }
    }
}

fn unwind_orders(orders: &dyn OrderStore, pre_images: &[&Order]) {
    for order in pre_images.iter().rev() {
        if let Err(err) = orders.save(order) {
            error!(order_id = %order.id, %err, "order compensation failed");
        }
    }
}
