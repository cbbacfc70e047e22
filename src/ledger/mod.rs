mod balance;
mod client;
mod error;
mod retry;
mod rpc;
mod types;

pub use balance::extract_sol_changes;
pub use client::{LedgerClient, SignatureCursor};
#[cfg(test)]
pub use client::MockLedgerClient;
pub use error::{LedgerError, LedgerErrorType, RetryFailure};
pub use retry::{RetryConfig, RetryHandler};
pub use rpc::RpcLedgerClient;
pub use types::{
    lamports_to_sol, BalanceChange, ChangeReason, Direction, TransactionDetail, TxRef,
    SOL_DECIMALS,
};

pub(crate) use types::serialize_display;
