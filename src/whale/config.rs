use std::env;
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use super::error::MonitorError;
use crate::ledger::RetryConfig;

/// Default whale threshold: 0.001 SOL.
pub fn default_threshold() -> Decimal {
    Decimal::new(1, 3)
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    pub accounts: Vec<String>,           // Base58 addresses, watched in this order
    pub threshold: Decimal,              // Minimum transfer in SOL, inclusive
    pub max_events: usize,
    pub lookback: usize,                 // Signatures examined per account
    pub page_size: usize,
    pub concurrent: bool,                // Poll accounts concurrently
    pub deadline: Option<Duration>,      // Overall time budget, realized as cancellation
    pub retry: RetryConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            accounts: Vec::new(),
            threshold: default_threshold(),
            max_events: 10,
            lookback: 1000,
            page_size: 100,
            concurrent: false,
            deadline: None,
            retry: RetryConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn new(accounts: Vec<String>, max_events: usize) -> Self {
        Self {
            accounts,
            max_events,
            ..Self::default()
        }
    }

    pub fn with_threshold(mut self, threshold: Decimal) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_concurrency(mut self, concurrent: bool) -> Self {
        self.concurrent = concurrent;
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Checks the configuration and parses the watched accounts.
    pub fn validate(&self) -> Result<Vec<Pubkey>, MonitorError> {
        if self.accounts.is_empty() {
            return Err(MonitorError::Validation(
                "at least one account must be watched".to_string(),
            ));
        }
        if self.max_events == 0 {
            return Err(MonitorError::Validation(
                "max_events must be positive".to_string(),
            ));
        }
        if self.threshold.is_sign_negative() && !self.threshold.is_zero() {
            return Err(MonitorError::Validation(format!(
                "threshold must not be negative, got {}",
                self.threshold
            )));
        }
        if self.page_size == 0 {
            return Err(MonitorError::Validation(
                "page_size must be positive".to_string(),
            ));
        }
        if self.lookback == 0 {
            return Err(MonitorError::Validation(
                "lookback must be positive".to_string(),
            ));
        }

        self.accounts
            .iter()
            .map(|account| {
                Pubkey::from_str(account.trim()).map_err(|e| {
                    MonitorError::Validation(format!("invalid account address {account}: {e}"))
                })
            })
            .collect()
    }

    /// Loads the monitor settings from the environment.
    ///
    /// `WHALE_ACCOUNTS` (comma separated) is required; `WHALE_THRESHOLD_SOL`,
    /// `WHALE_MAX_EVENTS`, `WHALE_LOOKBACK`, `WHALE_CONCURRENT` and
    /// `WHALE_DEADLINE_SECS` override the defaults.
    pub fn load_from_env() -> Result<Self, MonitorError> {
        let accounts = env::var("WHALE_ACCOUNTS")
            .map_err(|_| MonitorError::Validation("WHALE_ACCOUNTS must be set".to_string()))?;

        let mut config = Self {
            accounts: parse_accounts(&accounts),
            ..Self::default()
        };

        if let Some(threshold) = env_value::<Decimal>("WHALE_THRESHOLD_SOL")? {
            config.threshold = threshold;
        }
        if let Some(max_events) = env_value("WHALE_MAX_EVENTS")? {
            config.max_events = max_events;
        }
        if let Some(lookback) = env_value("WHALE_LOOKBACK")? {
            config.lookback = lookback;
        }
        if let Some(concurrent) = env_value("WHALE_CONCURRENT")? {
            config.concurrent = concurrent;
        }
        if let Some(secs) = env_value::<u64>("WHALE_DEADLINE_SECS")? {
            config.deadline = Some(Duration::from_secs(secs));
        }

        Ok(config)
    }
}

fn parse_accounts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_value<T>(name: &str) -> Result<Option<T>, MonitorError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| MonitorError::Validation(format!("{name}={raw}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> String {
        Pubkey::new_unique().to_string()
    }

    #[test]
    fn default_threshold_is_one_thousandth_sol() {
        assert_eq!(MonitorConfig::default().threshold, Decimal::new(1, 3));
    }

    #[test]
    fn valid_config_parses_accounts_in_order() {
        let (a, b) = (account(), account());
        let config = MonitorConfig::new(vec![a.clone(), b.clone()], 5);
        let parsed = config.validate().unwrap();
        assert_eq!(parsed[0].to_string(), a);
        assert_eq!(parsed[1].to_string(), b);
    }

    #[test]
    fn rejects_empty_accounts() {
        let err = MonitorConfig::new(Vec::new(), 5).validate().unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[test]
    fn rejects_zero_max_events() {
        let err = MonitorConfig::new(vec![account()], 0).validate().unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[test]
    fn rejects_negative_threshold() {
        let err = MonitorConfig::new(vec![account()], 1)
            .with_threshold(Decimal::new(-1, 3))
            .validate()
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[test]
    fn rejects_zero_lookback() {
        let err = MonitorConfig::new(vec![account()], 1)
            .with_lookback(0)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[test]
    fn zero_threshold_is_allowed() {
        assert!(MonitorConfig::new(vec![account()], 1)
            .with_threshold(Decimal::ZERO)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_malformed_address() {
        let err = MonitorConfig::new(vec!["not-an-address".to_string()], 1)
            .validate()
            .unwrap_err();
        assert!(matches!(err, MonitorError::Validation(_)));
    }

    #[test]
    fn splits_account_list() {
        assert_eq!(parse_accounts(" a, b ,,c"), vec!["a", "b", "c"]);
    }
}
