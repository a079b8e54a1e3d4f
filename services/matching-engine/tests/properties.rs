//! Randomized invariant checks
//!
//! Feeds arbitrary order streams through the exchange and asserts the
//! conservation and book-membership properties that must survive any
//! interleaving of limit and market flow.

use std::sync::Arc;

use matching_engine::memory::{
    ManualClock, MemoryBalanceStore, MemoryOrderStore, MemoryTradeStore,
};
use matching_engine::{Exchange, NewOrder};
use proptest::prelude::*;
use rust_decimal::Decimal;
use types::ids::UserId;
use types::order::{OrderKind, OrderStatus, Side};

#[derive(Debug, Clone)]
struct GenOrder {
    user: usize,
    is_buy: bool,
    is_market: bool,
    price: u64,
    quantity: u64,
}

fn gen_order() -> impl Strategy<Value = GenOrder> {
    (0..3usize, any::<bool>(), 0..5u8, 90..=110u64, 1..=5u64).prop_map(
        |(user, is_buy, market_die, price, quantity)| GenOrder {
            user,
            is_buy,
            is_market: market_die == 0,
            price,
            quantity,
        },
    )
}

const FUNDING: u64 = 1_000_000_000;

fn run_stream(orders: &[GenOrder]) -> (Exchange, Vec<UserId>) {
    let exchange = Exchange::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MemoryTradeStore::new()),
        Arc::new(MemoryBalanceStore::new()),
        Arc::new(ManualClock::new(1_700_000_000_000_000_000)),
    );
    let users: Vec<UserId> = (0..3)
        .map(|_| {
            let user = UserId::new();
            exchange.deposit(user, Decimal::from(FUNDING)).unwrap();
            user
        })
        .collect();

    for entry in orders {
        let request = NewOrder {
            user_id: users[entry.user],
            symbol: "BTCUSD".to_string(),
            side: if entry.is_buy { Side::Buy } else { Side::Sell },
            kind: if entry.is_market {
                OrderKind::Market
            } else {
                OrderKind::Limit
            },
            price: (!entry.is_market).then(|| Decimal::from(entry.price)),
            quantity: Decimal::from(entry.quantity),
        };
        exchange.place_order(request).unwrap();
    }

    (exchange, users)
}

proptest! {
    #[test]
    fn cash_is_conserved(orders in prop::collection::vec(gen_order(), 1..40)) {
        let (exchange, users) = run_stream(&orders);

        let total: Decimal = users
            .iter()
            .map(|user| exchange.balance_of(*user).unwrap())
            .sum();
        prop_assert_eq!(total, Decimal::from(FUNDING * 3));
    }

    #[test]
    fn fills_match_the_trade_log(orders in prop::collection::vec(gen_order(), 1..40)) {
        let (exchange, users) = run_stream(&orders);

        for user in &users {
            for order in exchange.user_orders(*user).unwrap() {
                let traded: Decimal = exchange
                    .trades_for(order.id)
                    .unwrap()
                    .iter()
                    .map(|trade| trade.quantity.as_decimal())
                    .sum();
                prop_assert_eq!(order.filled_quantity.as_decimal(), traded);

                if order.is_fully_filled() {
                    prop_assert_eq!(order.status, OrderStatus::Filled);
                }
            }
        }
    }

    #[test]
    fn book_holds_exactly_the_open_limit_orders(
        orders in prop::collection::vec(gen_order(), 1..40),
    ) {
        let (exchange, users) = run_stream(&orders);

        let mut open_limit_count = 0usize;
        let mut open_limit_quantity = Decimal::ZERO;
        for user in &users {
            for order in exchange.user_orders(*user).unwrap() {
                if order.kind == OrderKind::Limit && order.is_open() {
                    open_limit_count += 1;
                    open_limit_quantity += order.remaining().as_decimal();
                }
            }
        }

        let book = exchange.order_book("BTCUSD").unwrap();
        let on_book_count: usize = book
            .bids
            .iter()
            .chain(book.asks.iter())
            .map(|level| level.order_count)
            .sum();
        let on_book_quantity: Decimal = book
            .bids
            .iter()
            .chain(book.asks.iter())
            .map(|level| level.quantity)
            .sum();

        // MARKET orders never rest, terminal orders are removed, so the
        // book is exactly the open LIMIT orders.
        prop_assert_eq!(on_book_count, open_limit_count);
        prop_assert_eq!(on_book_quantity, open_limit_quantity);
    }

    #[test]
    fn book_never_crosses_after_quiescence(
        orders in prop::collection::vec(gen_order(), 1..40),
    ) {
        let (exchange, _) = run_stream(&orders);

        let book = exchange.order_book("BTCUSD").unwrap();
        if let (Some(best_bid), Some(best_ask)) = (book.bids.first(), book.asks.first()) {
            // Any crossing pair would have matched on arrival.
            prop_assert!(best_bid.price < best_ask.price);
        }
    }
}
