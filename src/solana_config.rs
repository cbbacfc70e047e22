use std::env;
use std::time::Duration;

use solana_sdk::commitment_config::CommitmentConfig;

use crate::ledger::{LedgerError, RpcLedgerClient};

const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Clone, Debug)]
pub struct SolanaConfig {
    pub rpc_url: String,
    pub commitment: CommitmentConfig,
    pub request_timeout: Duration,
}

impl SolanaConfig {
    // Default mainnet configuration
    pub fn mainnet_default() -> Self {
        Self {
            rpc_url: MAINNET_RPC_URL.to_string(),
            commitment: CommitmentConfig::finalized(),
            request_timeout: Duration::from_secs(20),
        }
    }

    // Alternative constructor for different networks
    pub fn custom(rpc_url: String, commitment: CommitmentConfig) -> Self {
        Self {
            rpc_url,
            commitment,
            ..Self::mainnet_default()
        }
    }

    /// Mainnet defaults overridden by `SOLANA_RPC_URL` and
    /// `SOLANA_RPC_TIMEOUT_SECS` when set.
    pub fn load_from_env() -> Result<Self, std::num::ParseIntError> {
        let mut config = Self::mainnet_default();
        if let Ok(url) = env::var("SOLANA_RPC_URL") {
            config.rpc_url = url;
        }
        if let Ok(secs) = env::var("SOLANA_RPC_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs.trim().parse()?);
        }
        Ok(config)
    }

    pub fn create_ledger_client(&self) -> Result<RpcLedgerClient, LedgerError> {
        RpcLedgerClient::new(self.rpc_url.clone(), self.commitment, self.request_timeout)
    }
}
