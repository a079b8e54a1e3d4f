//! Concurrency tests
//!
//! Symbols proceed in parallel; within a symbol every mutation is
//! serialized by the writer lock, so racing operations resolve to one of
//! the two sequential outcomes and cash is conserved under contention.

use std::sync::Arc;
use std::thread;

use matching_engine::memory::{
    ManualClock, MemoryBalanceStore, MemoryOrderStore, MemoryTradeStore,
};
use matching_engine::{Exchange, NewOrder};
use rust_decimal::Decimal;
use types::ids::UserId;
use types::order::{OrderKind, OrderStatus, Side};

fn exchange() -> Exchange {
    Exchange::new(
        Arc::new(MemoryOrderStore::new()),
        Arc::new(MemoryTradeStore::new()),
        Arc::new(MemoryBalanceStore::new()),
        Arc::new(ManualClock::new(1_700_000_000_000_000_000)),
    )
}

fn user_with(exchange: &Exchange, amount: u64) -> UserId {
    let user = UserId::new();
    exchange.deposit(user, Decimal::from(amount)).unwrap();
    user
}

fn limit(user: UserId, symbol: &str, side: Side, price: u64, qty: u64) -> NewOrder {
    NewOrder {
        user_id: user,
        symbol: symbol.to_string(),
        side,
        kind: OrderKind::Limit,
        price: Some(Decimal::from(price)),
        quantity: Decimal::from(qty),
    }
}

#[test]
fn cancel_racing_a_match_resolves_sequentially() {
    // Run the race many times; whichever side wins the writer lock, the
    // final state must be one of the two sequential outcomes.
    for _ in 0..50 {
        let ex = exchange();
        let owner = user_with(&ex, 10_000);
        let seller = user_with(&ex, 0);

        let resting = ex
            .place_order(limit(owner, "BTCUSD", Side::Buy, 50, 10))
            .unwrap();
        let resting_id = resting.order.id;

        let cancel_ex = ex.clone();
        let cancel = thread::spawn(move || cancel_ex.cancel_order(resting_id, owner));

        let match_ex = ex.clone();
        let incoming =
            thread::spawn(move || match_ex.place_order(limit(seller, "BTCUSD", Side::Sell, 50, 10)));

        let cancelled = cancel.join().unwrap().unwrap();
        let placed = incoming.join().unwrap().unwrap();

        let final_buy = ex.order(resting_id).unwrap();
        match final_buy.status {
            // Cancel won: no trade, the sell rests on the book.
            OrderStatus::Cancelled => {
                assert!(placed.trades.is_empty());
                assert_eq!(ex.order_book("BTCUSD").unwrap().asks.len(), 1);
                assert_eq!(ex.balance_of(owner).unwrap(), Decimal::from(10_000));
            }
            // Match won: one trade, cancel was a no-op on a terminal order.
            OrderStatus::Filled => {
                assert_eq!(placed.trades.len(), 1);
                assert_eq!(cancelled.status, OrderStatus::Filled);
                assert!(ex.order_book("BTCUSD").unwrap().asks.is_empty());
                assert_eq!(ex.balance_of(owner).unwrap(), Decimal::from(9_500));
                assert_eq!(ex.balance_of(seller).unwrap(), Decimal::from(500));
            }
            other => panic!("impossible outcome for the resting order: {other:?}"),
        }
    }
}

#[test]
fn symbols_match_in_parallel() {
    let ex = exchange();
    let symbols = ["AAAUSD", "BBBUSD", "CCCUSD", "DDDUSD"];
    let rounds = 200;

    let handles: Vec<_> = symbols
        .iter()
        .map(|symbol| {
            let ex = ex.clone();
            let symbol = symbol.to_string();
            thread::spawn(move || {
                let seller = user_with(&ex, 0);
                let buyer = user_with(&ex, 1_000_000);

                for _ in 0..rounds {
                    ex.place_order(limit(seller, &symbol, Side::Sell, 100, 1))
                        .unwrap();
                    let placed = ex
                        .place_order(limit(buyer, &symbol, Side::Buy, 100, 1))
                        .unwrap();
                    assert_eq!(placed.trades.len(), 1);
                }

                let book = ex.order_book(&symbol).unwrap();
                assert!(book.bids.is_empty());
                assert!(book.asks.is_empty());
                (buyer, seller)
            })
        })
        .collect();

    for handle in handles {
        let (buyer, seller) = handle.join().unwrap();
        // Every round moved 100 from buyer to seller.
        assert_eq!(
            ex.balance_of(buyer).unwrap(),
            Decimal::from(1_000_000 - rounds * 100)
        );
        assert_eq!(ex.balance_of(seller).unwrap(), Decimal::from(rounds * 100));
    }
}

#[test]
fn contended_symbol_conserves_cash_and_quantity() {
    let ex = exchange();
    let writers = 4;
    let orders_per_writer = 100;
    let initial = 1_000_000u64;

    let users: Vec<UserId> = (0..writers).map(|_| user_with(&ex, initial)).collect();

    let handles: Vec<_> = users
        .iter()
        .enumerate()
        .map(|(i, user)| {
            let ex = ex.clone();
            let user = *user;
            thread::spawn(move || {
                let side = if i % 2 == 0 { Side::Sell } else { Side::Buy };
                for _ in 0..orders_per_writer {
                    ex.place_order(limit(user, "BTCUSD", side, 100, 1)).unwrap();
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // Cash conservation: every trade is a zero-sum transfer, so the pool
    // total is unchanged no matter how the orders interleaved.
    let total: Decimal = users
        .iter()
        .map(|user| ex.balance_of(*user).unwrap())
        .sum();
    assert_eq!(total, Decimal::from(initial * writers as u64));

    // Quantity conservation: filled quantity on the buy side equals the
    // sell side, and what did not fill is still resting.
    let mut bought = Decimal::ZERO;
    let mut sold = Decimal::ZERO;
    let mut resting = Decimal::ZERO;
    for user in &users {
        for order in ex.user_orders(*user).unwrap() {
            match order.side {
                Side::Buy => bought += order.filled_quantity.as_decimal(),
                Side::Sell => sold += order.filled_quantity.as_decimal(),
            }
            if order.is_open() {
                resting += order.remaining().as_decimal();
            }
        }
    }
    assert_eq!(bought, sold);

    let book = ex.order_book("BTCUSD").unwrap();
    let on_book: Decimal = book
        .bids
        .iter()
        .chain(book.asks.iter())
        .map(|level| level.quantity)
        .sum();
    assert_eq!(on_book, resting);
}
