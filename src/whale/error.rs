use thiserror::Error;

use crate::ledger::{LedgerError, RetryFailure};

#[derive(Clone, Debug, PartialEq, Error)]
pub enum MonitorError {
    #[error("Invalid monitor configuration: {0}")]
    Validation(String),

    #[error("Ledger request failed after {attempts} attempt(s): {source}")]
    Ledger {
        attempts: u32,
        #[source]
        source: LedgerError,
    },
}

impl From<RetryFailure> for MonitorError {
    fn from(failure: RetryFailure) -> Self {
        MonitorError::Ledger {
            attempts: failure.attempts,
            source: failure.error,
        }
    }
}
