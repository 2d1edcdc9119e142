//! The escrow ledger: order arena, custodied balances, role gating and the
//! append-only event log. Synchronous and single-owner; serialization of callers
//! is the job of [`crate::actors::LedgerService`].

pub mod authorization;
pub mod clock;
pub mod escrow;

#[cfg(test)]
mod properties;

pub use authorization::*;
pub use clock::*;
pub use escrow::*;
