//! Capability ports
//!
//! The engine reaches the outside world only through these interfaces:
//! order persistence, the trade log, the cash ledger, and the clock. All
//! implementations must be thread-safe; the engine invokes them while
//! holding a symbol's writer lock.

use rust_decimal::Decimal;
use types::errors::StorageError;
use types::ids::{OrderId, UserId};
use types::order::Order;
use types::trade::Trade;

/// Order persistence. `save` is an upsert by id; the engine calls it after
/// every status or filled-quantity change.
pub trait OrderStore: Send + Sync {
    fn save(&self, order: &Order) -> Result<(), StorageError>;

    fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError>;

    fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, StorageError>;
}

/// Append-only trade log. One `save` per emitted trade.
pub trait TradeStore: Send + Sync {
    fn save(&self, trade: &Trade) -> Result<(), StorageError>;

    fn all(&self) -> Result<Vec<Trade>, StorageError>;
}

/// Cash ledger keyed by user.
///
/// `adjust` must be atomic per call; the engine issues a debit and a
/// credit per trade. Accounts come into existence through `deposit`.
pub trait BalanceStore: Send + Sync {
    fn deposit(&self, user: UserId, amount: Decimal) -> Result<(), StorageError>;

    fn adjust(&self, user: UserId, delta: Decimal) -> Result<(), StorageError>;

    /// Current balance, or None for an unknown user.
    fn balance_of(&self, user: UserId) -> Result<Option<Decimal>, StorageError>;
}

/// Monotonic timestamp source, unix nanos.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}
