use rust_decimal::Decimal;

use super::{
    cancel::CancelSignal,
    config::{default_threshold, MonitorConfig},
    error::MonitorError,
    monitor::MonitorLoop,
    types::WhaleEvent,
};
use crate::ledger::{LedgerClient, LedgerError};
use crate::solana_config::SolanaConfig;

/// Collects up to `max_events` whale transfers from the recent history of
/// `accounts`, using the RPC endpoint from the environment (mainnet by default).
///
/// `threshold` defaults to 0.001 SOL. Inputs are validated before any network
/// activity. If the ledger keeps failing past the retry budget the call fails
/// as a whole and events found so far are discarded.
pub async fn monitor_solana(
    accounts: Vec<String>,
    max_events: usize,
    threshold: Option<Decimal>,
) -> Result<Vec<WhaleEvent>, MonitorError> {
    let config = MonitorConfig::new(accounts, max_events)
        .with_threshold(threshold.unwrap_or_else(default_threshold));
    config.validate()?;

    let solana_config = SolanaConfig::load_from_env()
        .map_err(|e| MonitorError::Validation(format!("SOLANA_RPC_TIMEOUT_SECS: {e}")))?;
    let client = solana_config
        .create_ledger_client()
        .map_err(|error: LedgerError| MonitorError::Ledger {
            attempts: 0,
            source: error,
        })?;

    monitor_solana_with(client, config, CancelSignal::never()).await
}

/// Same as [`monitor_solana`] with an explicit ledger client, configuration and
/// cancellation signal. Cancellation returns the events collected so far.
pub async fn monitor_solana_with<C: LedgerClient>(
    client: C,
    config: MonitorConfig,
    cancel: CancelSignal,
) -> Result<Vec<WhaleEvent>, MonitorError> {
    let monitor = MonitorLoop::new(client, config)?;
    monitor.run(cancel).await.into_result()
}
