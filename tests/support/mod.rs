#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use solana_whale_monitor::ledger::{extract_sol_changes, RetryConfig};
use solana_whale_monitor::{CancelHandle, LedgerClient, LedgerError, TransactionDetail, TxRef};

pub const SOL: i64 = 1_000_000_000;
const FEE: u64 = 5_000;

pub fn sig(n: u8) -> TxRef {
    TxRef::from(Signature::new(&[n; 64]))
}

pub fn key(n: u8) -> Pubkey {
    Pubkey::new_from_array([n; 32])
}

pub fn fast_retry() -> RetryConfig {
    RetryConfig {
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(4),
        ..RetryConfig::default()
    }
}

/// How the scripted ledger answers `fetch_transaction` for one signature.
#[derive(Clone, Debug)]
pub enum Script {
    /// Moves this many lamports from `key(1)` to `key(2)`.
    Transfer(i64),
    /// Pruned from the ledger.
    Missing,
    /// Fails with a transport error this many times, then transfers.
    Flaky(u32, i64),
    Down,
    Malformed,
    /// Never answers.
    Hang,
}

#[derive(Default)]
pub struct ScriptedLedger {
    histories: HashMap<Pubkey, Vec<TxRef>>,
    scripts: HashMap<TxRef, Script>,
    failures: Mutex<HashMap<TxRef, u32>>,
    detail_calls: Mutex<Vec<TxRef>>,
    page_calls: AtomicUsize,
    cancel_on_detail: Option<(usize, CancelHandle)>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account whose history is `entries`, most recent first.
    pub fn account(mut self, account: Pubkey, entries: Vec<(TxRef, Script)>) -> Self {
        let history = entries.iter().map(|(tx, _)| *tx).collect();
        self.histories.insert(account, history);
        self.scripts.extend(entries);
        self
    }

    /// Cancels `handle` when the `nth` (1-based) transaction fetch starts; that
    /// fetch then never completes.
    pub fn cancel_on_detail(mut self, nth: usize, handle: CancelHandle) -> Self {
        self.cancel_on_detail = Some((nth, handle));
        self
    }

    pub fn detail_calls(&self) -> Vec<TxRef> {
        self.detail_calls.lock().unwrap().clone()
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    fn transfer(tx_ref: &TxRef, lamports: i64) -> Result<TransactionDetail, LedgerError> {
        let lamports = lamports as u64;
        let keys = [key(1), key(2)];
        let changes = extract_sol_changes(
            &[SOL as u64 + lamports + FEE, 0],
            &[SOL as u64, lamports],
            FEE,
            &keys,
        )?;
        Ok(TransactionDetail::from_changes(*tx_ref, 1, None, keys[0], changes))
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn fetch_recent_signatures(
        &self,
        account: &Pubkey,
        before: Option<TxRef>,
        limit: usize,
    ) -> Result<Vec<TxRef>, LedgerError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        // Every call suspends once so concurrent scans interleave.
        tokio::task::yield_now().await;

        let history = self.histories.get(account).cloned().unwrap_or_default();
        let start = match before {
            Some(before) => history
                .iter()
                .position(|tx| *tx == before)
                .map_or(history.len(), |i| i + 1),
            None => 0,
        };
        Ok(history.into_iter().skip(start).take(limit).collect())
    }

    async fn fetch_transaction(&self, tx_ref: &TxRef) -> Result<TransactionDetail, LedgerError> {
        tokio::task::yield_now().await;

        let call_number = {
            let mut calls = self.detail_calls.lock().unwrap();
            calls.push(*tx_ref);
            calls.len()
        };

        if let Some((nth, handle)) = &self.cancel_on_detail {
            if call_number == *nth {
                handle.cancel();
                std::future::pending::<()>().await;
            }
        }

        let script = self
            .scripts
            .get(tx_ref)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(tx_ref.to_string()))?;

        match script {
            Script::Transfer(lamports) => Self::transfer(tx_ref, lamports),
            Script::Missing => Err(LedgerError::NotFound(tx_ref.to_string())),
            Script::Flaky(times, lamports) => {
                let failed = {
                    let mut failures = self.failures.lock().unwrap();
                    let count = failures.entry(*tx_ref).or_insert(0);
                    *count += 1;
                    *count
                };
                if failed <= times {
                    Err(LedgerError::RateLimited("429 Too Many Requests".into()))
                } else {
                    Self::transfer(tx_ref, lamports)
                }
            }
            Script::Down => Err(LedgerError::Transport("connection refused".into())),
            Script::Malformed => Err(LedgerError::Decode("missing preBalances".into())),
            Script::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
        }
    }
}
