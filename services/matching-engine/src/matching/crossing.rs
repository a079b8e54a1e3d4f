//! Crossing detection
//!
//! Decides whether an aggressor may trade against a resting order. A BUY
//! crosses when its limit is at or above the resting ask; a SELL crosses
//! when its limit is at or below the resting bid. MARKET aggressors carry
//! no limit and cross unconditionally.

use types::numeric::Price;
use types::order::Side;

/// Whether an aggressor on `side` with limit price `limit` may trade
/// against a resting order priced at `resting`.
pub fn crosses(side: Side, limit: Option<Price>, resting: Price) -> bool {
    match (side, limit) {
        (_, None) => true,
        (Side::Buy, Some(limit)) => limit >= resting,
        (Side::Sell, Some(limit)) => limit <= resting,
    }
}
