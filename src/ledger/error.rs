use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("RPC rate limited: {0}")]
    RateLimited(String),

    #[error("Transaction not found: {0}")]
    NotFound(String),

    #[error("Malformed RPC payload: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorType {
    Transport,
    RateLimited,
    NotFound,
    Decode,
}

impl LedgerError {
    pub fn error_type(&self) -> LedgerErrorType {
        match self {
            LedgerError::Transport(_) => LedgerErrorType::Transport,
            LedgerError::RateLimited(_) => LedgerErrorType::RateLimited,
            LedgerError::NotFound(_) => LedgerErrorType::NotFound,
            LedgerError::Decode(_) => LedgerErrorType::Decode,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.error_type() == LedgerErrorType::NotFound
    }
}

impl From<reqwest::Error> for LedgerError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            return LedgerError::Decode(error.to_string());
        }
        match error.status() {
            Some(status) if status == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                LedgerError::RateLimited(error.to_string())
            }
            _ => LedgerError::Transport(error.to_string()),
        }
    }
}

/// A ledger call that still failed once the retry policy gave up.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("{error} (after {attempts} attempt(s))")]
pub struct RetryFailure {
    pub attempts: u32,
    pub error: LedgerError,
}
