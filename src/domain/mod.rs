//! Escrow domain types. Pure data, no ledger or actor concerns.

pub mod address;
pub mod amount;
pub mod event;
pub mod order;

pub use address::*;
pub use amount::*;
pub use event::*;
pub use order::*;
