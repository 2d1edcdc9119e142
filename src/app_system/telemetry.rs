use tracing_subscriber::EnvFilter;

/// Installs the process-wide `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (from
/// [`crate::config::LedgerConfig::log_filter`]) applies. Calling this twice is
/// harmless: the second install is ignored.
///
/// ```bash
/// RUST_LOG=escrow_ledger=debug cargo run
/// ```
pub fn setup_tracing(default_filter: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .try_init();
}
