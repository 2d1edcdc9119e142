//! Service actors. Each owns its state and is reached only through its client.

pub mod ledger_service;

pub use ledger_service::*;
