use tokio::task::JoinHandle;
use tracing::{error, info, instrument};

use crate::actors::LedgerService;
use crate::clients::LedgerClient;
use crate::config::LedgerConfig;
use crate::error::EscrowError;
use crate::ledger::{Clock, SystemClock};

/// Owns the running ledger service and hands out its client.
///
/// Must be constructed inside a Tokio runtime.
pub struct EscrowSystem {
    pub ledger_client: LedgerClient,
    config: LedgerConfig,
    handles: Vec<JoinHandle<()>>,
}

impl EscrowSystem {
    /// Starts the ledger on the wall clock.
    pub fn new(config: LedgerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    #[instrument(name = "escrow_system", skip(config, clock))]
    pub fn with_clock<C: Clock>(config: LedgerConfig, clock: C) -> Self {
        info!(
            mailbox_capacity = config.mailbox_capacity,
            event_capacity = config.event_capacity,
            "Starting escrow system"
        );

        let (service, ledger_client) = LedgerService::new(config.mailbox_capacity, config.event_capacity, clock);
        let handles = vec![tokio::spawn(service.run())];

        info!("Escrow system started");
        Self {
            ledger_client,
            config,
            handles,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Stops the ledger after it drains the requests already queued ahead of
    /// the shutdown message.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), EscrowError> {
        info!("Shutting down escrow system");

        if let Err(e) = self.ledger_client.shutdown().await {
            error!(error = %e, "Ledger service already stopped");
        }

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Service shutdown error");
                return Err(EscrowError::ServiceUnavailable(e.to_string()));
            }
        }

        info!("Escrow system shutdown complete");
        Ok(())
    }
}
