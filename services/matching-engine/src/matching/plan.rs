//! Fill planning
//!
//! Walks the opposite ladder in price-time priority and computes the fills
//! an aggressor would take, without touching the book. Keeping the walk
//! read-only means a port failure during commit leaves no half-mutated
//! ladder behind.

use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use crate::book::OrderBook;
use crate::matching::crossing;

/// One planned fill: the aggressor takes `quantity` from `maker_before`
/// at the maker's price, leaving the maker in the `maker_after` state.
#[derive(Debug, Clone)]
pub struct FillPlan {
    pub price: Price,
    pub quantity: Quantity,
    pub maker_before: Order,
    pub maker_after: Order,
}

/// Compute the fills `taker` would take from `book`.
///
/// Fills come out in execution order (best price first, FIFO within a
/// level) and stop at the first resting order the taker's limit does not
/// cross, or when the taker's quantity is exhausted. Every maker except
/// possibly the last is consumed completely.
pub fn plan_fills(book: &OrderBook, taker: &Order, timestamp: i64) -> Vec<FillPlan> {
    let mut open = taker.remaining();
    let mut fills = Vec::new();

    let makers: Box<dyn Iterator<Item = &Order> + '_> = match taker.side {
        Side::Buy => Box::new(book.iter_asks()),
        Side::Sell => Box::new(book.iter_bids()),
    };

    for maker in makers {
        if open.is_zero() {
            break;
        }
        let price = maker.price.expect("resting orders always carry a price");
        if !crossing::crosses(taker.side, taker.price, price) {
            break;
        }

        let quantity = open.min(maker.remaining());
        let mut maker_after = maker.clone();
        maker_after.fill(quantity, timestamp);

        open = Quantity::try_new(open.as_decimal() - quantity.as_decimal())
            .unwrap_or(Quantity::zero());
        fills.push(FillPlan {
            price,
            quantity,
            maker_before: maker.clone(),
            maker_after,
        });
    }

    fills
}
