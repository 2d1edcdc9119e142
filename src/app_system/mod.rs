//! System orchestration, startup, and shutdown logic.

pub mod escrow_system;
pub mod telemetry;

pub use escrow_system::*;
pub use telemetry::*;
