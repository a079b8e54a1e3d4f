//! Error taxonomy for the matching core
//!
//! Validation, authorization, and not-found errors are surfaced without
//! mutating books or balances. Storage errors abort the current order
//! execution atomically. Invariant violations inside the engine are
//! programming errors and panic instead of flowing through these types.

use crate::ids::{OrderId, UserId};
use rust_decimal::Decimal;
use thiserror::Error;

/// Malformed order input, rejected before any state change.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol must not be empty")]
    EmptySymbol,

    #[error("price is required for LIMIT orders")]
    MissingPrice,

    #[error("MARKET orders must not carry a price")]
    UnexpectedPrice,

    #[error("price must be positive, got {0}")]
    InvalidPrice(String),

    #[error("quantity must be positive, got {0}")]
    InvalidQuantity(String),
}

/// Failure in an external port (order store, trade store, balance store).
///
/// Fatal to the order execution that triggered it; the engine rolls its
/// side effects back before surfacing this.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Top-level error surfaced to callers of the exchange.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExchangeError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: OrderId },

    #[error("user not found: {user_id}")]
    UserNotFound { user_id: UserId },

    #[error("order {order_id} does not belong to user {user_id}")]
    NotOwner { order_id: OrderId, user_id: UserId },

    #[error("insufficient balance: required {required}, available {available}")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },

    #[error(transparent)]
    Storage(#[from] StorageError),
}
