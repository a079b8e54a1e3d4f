//! In-memory port implementations
//!
//! Default wiring for the exchange and the substrate for tests. All
//! adapters are lock-striped concurrent maps (or a single mutex for the
//! ordered trade log) and infallible by construction.

use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use types::errors::StorageError;
use types::ids::{OrderId, UserId};
use types::order::Order;
use types::trade::Trade;

use crate::ports::{BalanceStore, Clock, OrderStore, TradeStore};

/// Orders keyed by id.
#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    orders: DashMap<OrderId, Order>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderStore for MemoryOrderStore {
    fn save(&self, order: &Order) -> Result<(), StorageError> {
        self.orders.insert(order.id, order.clone());
        Ok(())
    }

    fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, StorageError> {
        Ok(self.orders.get(&id).map(|entry| entry.value().clone()))
    }

    fn find_by_user(&self, user: UserId) -> Result<Vec<Order>, StorageError> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|entry| entry.value().user_id == user)
            .map(|entry| entry.value().clone())
            .collect();
        orders.sort_by_key(|order| order.created_at);
        Ok(orders)
    }
}

/// Append-only trade log preserving insertion order.
#[derive(Debug, Default)]
pub struct MemoryTradeStore {
    trades: Mutex<Vec<Trade>>,
}

impl MemoryTradeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TradeStore for MemoryTradeStore {
    fn save(&self, trade: &Trade) -> Result<(), StorageError> {
        self.trades
            .lock()
            .expect("trade log mutex poisoned")
            .push(trade.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<Trade>, StorageError> {
        Ok(self.trades.lock().expect("trade log mutex poisoned").clone())
    }
}

/// Cash ledger keyed by user; accounts appear on first deposit.
#[derive(Debug, Default)]
pub struct MemoryBalanceStore {
    balances: DashMap<UserId, Decimal>,
}

impl MemoryBalanceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BalanceStore for MemoryBalanceStore {
    fn deposit(&self, user: UserId, amount: Decimal) -> Result<(), StorageError> {
        *self.balances.entry(user).or_insert(Decimal::ZERO) += amount;
        Ok(())
    }

    fn adjust(&self, user: UserId, delta: Decimal) -> Result<(), StorageError> {
        *self.balances.entry(user).or_insert(Decimal::ZERO) += delta;
        Ok(())
    }

    fn balance_of(&self, user: UserId) -> Result<Option<Decimal>, StorageError> {
        Ok(self.balances.get(&user).map(|entry| *entry.value()))
    }
}

/// Wall-clock time in unix nanos.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock before unix epoch")
            .as_nanos() as i64
    }
}

/// Hand-advanced clock for deterministic tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    pub fn advance(&self, nanos: i64) {
        self.now.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
