use dotenv::dotenv;
use log::{error, info};

use solana_whale_monitor::{CancelHandle, MonitorConfig, MonitorLoop, SolanaConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let solana_config = SolanaConfig::load_from_env()?;
    let monitor_config = MonitorConfig::load_from_env()?;

    let client = solana_config.create_ledger_client()?;
    let monitor = MonitorLoop::new(client, monitor_config)?;

    // Ctrl+C stops the run and keeps what was collected
    let cancel = CancelHandle::new();
    let signal = cancel.signal();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt signal, stopping monitor...");
            cancel.cancel();
        }
    });

    info!("Starting Solana whale monitor against {}", solana_config.rpc_url);
    let events = monitor.run(signal).await.into_result().map_err(|e| {
        error!("Monitor failed: {}", e);
        e
    })?;

    println!("FINAL RESULTS:");
    for event in &events {
        println!("{}", serde_json::to_string(event)?);
    }

    Ok(())
}
