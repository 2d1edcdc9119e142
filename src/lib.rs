//! # Escrow Ledger
//!
//! An escrow-style order-fulfillment ledger. A consumer funds an order, the
//! ledger holds the value in custody, and the value moves exactly once: to the
//! producer when the consumer confirms delivery, or back to the consumer if the
//! order is cancelled before shipment.
//!
//! ## Layout
//!
//! - [`domain`] - plain data: addresses, amounts, orders, events
//! - [`ledger`] - the synchronous state machine ([`ledger::EscrowLedger`])
//! - [`messages`] / [`actors`] / [`clients`] - the ledger as a Tokio actor; the
//!   mailbox serializes every call
//! - [`app_system`] - startup, shutdown and tracing setup
//! - [`config`] - defaults, JSON file and environment overrides
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! # use escrow_ledger::{app_system::EscrowSystem, config::LedgerConfig, domain::*};
//! # async fn demo() -> Result<(), escrow_ledger::error::EscrowError> {
//! let system = EscrowSystem::new(LedgerConfig::default());
//! let client = &system.ledger_client;
//!
//! let consumer = Address::new("0x3c44cdddb6a900fa2b585dd299e03d12fa4293bc")?;
//! let producer = Address::new("0x70997970c51812dc3a010c7d01b50e0d17dc79c8")?;
//! let price = Amount::parse_ether("1.0")?;
//!
//! client.deposit(consumer.clone(), price).await?;
//! let id = client.create_order(consumer.clone(), OrderCreate::new(producer.clone(), 1, "Smartphone", price)).await?;
//! client.confirm_shipment(producer, id).await?;
//! client.confirm_delivery(consumer, id).await?;
//!
//! system.shutdown().await?;
//! # Ok(())
//! # }
//! ```

pub mod actors;
pub mod app_system;
pub mod clients;
pub mod config;
pub mod domain;
pub mod error;
pub mod ledger;
pub mod messages;

#[cfg(test)]
mod mock_framework;
