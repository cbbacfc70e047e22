pub mod ledger;
pub mod whale;
mod solana_config;

pub use solana_config::SolanaConfig;

// Re-export key types
pub use ledger::{
    BalanceChange,
    LedgerClient,
    LedgerError,
    RetryConfig,
    RpcLedgerClient,
    TransactionDetail,
    TxRef,
};

pub use whale::{
    monitor_solana,
    monitor_solana_with,
    CancelHandle,
    CancelSignal,
    MonitorConfig,
    MonitorError,
    MonitorLoop,
    MonitorReport,
    StopReason,
    WhaleEvent,
};
