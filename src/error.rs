use thiserror::Error;

use crate::domain::{Address, Amount, OrderId, OrderStatus};
use crate::ledger::Role;

/// Errors returned by escrow ledger operations.
///
/// Every variant leaves the ledger untouched: a failed call has no partial effect.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EscrowError {
    #[error("Unauthorized: {caller} is not the {required} of order {order_id}")]
    Unauthorized {
        order_id: OrderId,
        caller: Address,
        required: Role,
    },
    #[error("Invalid state: cannot {operation} order {order_id} while {status}")]
    InvalidState {
        order_id: OrderId,
        status: OrderStatus,
        operation: &'static str,
    },
    #[error("Insufficient or mismatched payment: price {price}, attached {attached}")]
    InsufficientOrMismatchedPayment { price: Amount, attached: Amount },
    #[error("Order not found: {0}")]
    NotFound(OrderId),
    #[error("Invalid address: {0:?}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0:?}")]
    InvalidAmount(String),
    #[error("Ledger service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Errors raised while loading [`crate::config::LedgerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}
