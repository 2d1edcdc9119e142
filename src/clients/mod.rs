//! Client handles for the ledger service.

#[macro_use]
mod macros;

pub mod ledger_client;

pub use ledger_client::*;
