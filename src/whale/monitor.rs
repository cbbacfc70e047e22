use std::fmt;

use futures::future::join_all;
use log::{debug, info, warn};
use solana_sdk::pubkey::Pubkey;
use tokio::sync::Mutex;

use super::{
    cancel::CancelSignal,
    config::MonitorConfig,
    detector::ThresholdFilter,
    error::MonitorError,
    seen::SeenSet,
    types::WhaleEvent,
};
use crate::ledger::{LedgerClient, RetryHandler, SignatureCursor, TxRef};

#[derive(Clone, Debug, PartialEq)]
pub enum StopReason {
    MaxEventsReached,
    Exhausted,
    Cancelled,
    Failed(MonitorError),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::MaxEventsReached => f.write_str("max events reached"),
            StopReason::Exhausted => f.write_str("signatures exhausted"),
            StopReason::Cancelled => f.write_str("cancelled"),
            StopReason::Failed(error) => write!(f, "failed: {error}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum MonitorState {
    Running,
    Stopped(StopReason),
}

/// Outcome of one monitor run. Events collected before a failure are kept here.
#[derive(Clone, Debug, PartialEq)]
pub struct MonitorReport {
    pub events: Vec<WhaleEvent>,
    pub stop_reason: StopReason,
}

impl MonitorReport {
    /// Applies the failure policy of the `monitor_solana` entry points: a failed
    /// run discards its partial events and surfaces the error.
    pub fn into_result(self) -> Result<Vec<WhaleEvent>, MonitorError> {
        match self.stop_reason {
            StopReason::Failed(error) => Err(error),
            _ => Ok(self.events),
        }
    }
}

// Seen set and results, mutated only under one lock. A transaction is reserved
// in the seen set before its detail is fetched and released again if the run
// stops before it is recorded.
#[derive(Debug)]
struct Collector {
    seen: SeenSet,
    events: Vec<WhaleEvent>,
    max_events: usize,
    state: MonitorState,
}

impl Collector {
    fn new(max_events: usize) -> Self {
        Self {
            seen: SeenSet::new(),
            events: Vec::new(),
            max_events,
            state: MonitorState::Running,
        }
    }

    fn is_stopped(&self) -> bool {
        matches!(self.state, MonitorState::Stopped(_))
    }

    fn stop(&mut self, reason: StopReason) {
        if !self.is_stopped() {
            self.state = MonitorState::Stopped(reason);
        }
    }

    // False when another scan already holds `tx_ref`.
    fn reserve(&mut self, tx_ref: TxRef) -> bool {
        self.seen.add(tx_ref)
    }

    fn abandon(&mut self, tx_ref: &TxRef, reason: StopReason) {
        self.seen.remove(tx_ref);
        self.stop(reason);
    }

    // Returns false once the run must stop.
    fn commit(&mut self, tx_ref: TxRef, event: Option<WhaleEvent>) -> bool {
        if self.is_stopped() {
            self.seen.remove(&tx_ref);
            return false;
        }
        if let Some(event) = event {
            info!("Whale transfer: {}", event);
            for change in &event.transaction.changes {
                info!("  {}", change);
            }
            self.events.push(event);
            if self.events.len() >= self.max_events {
                self.stop(StopReason::MaxEventsReached);
                return false;
            }
        }
        true
    }

    fn into_report(self) -> MonitorReport {
        let stop_reason = match self.state {
            MonitorState::Stopped(reason) => reason,
            MonitorState::Running => StopReason::Exhausted,
        };
        MonitorReport {
            events: self.events,
            stop_reason,
        }
    }
}

/// Polls watched accounts for whale transfers until `max_events` are found or
/// every account's recent signatures are exhausted.
pub struct MonitorLoop<C> {
    client: C,
    config: MonitorConfig,
    accounts: Vec<Pubkey>,
    filter: ThresholdFilter,
    retry: RetryHandler,
}

impl<C: LedgerClient> MonitorLoop<C> {
    /// Validates `config`; no ledger call is made.
    pub fn new(client: C, config: MonitorConfig) -> Result<Self, MonitorError> {
        let accounts = config.validate()?;
        Ok(Self {
            client,
            filter: ThresholdFilter::new(config.threshold),
            retry: RetryHandler::new(config.retry.clone()),
            accounts,
            config,
        })
    }

    pub async fn run(&self, cancel: CancelSignal) -> MonitorReport {
        let cancel = match self.config.deadline {
            Some(deadline) => cancel.with_timeout(deadline),
            None => cancel,
        };
        let collector = Mutex::new(Collector::new(self.config.max_events));

        info!(
            "Monitoring {} account(s) for transfers >= {} SOL (max {} events)",
            self.accounts.len(),
            self.filter.threshold(),
            self.config.max_events
        );

        if self.config.concurrent {
            let scans = self
                .accounts
                .iter()
                .map(|account| self.scan_account(*account, &collector, cancel.clone()));
            join_all(scans).await;
        } else {
            for account in &self.accounts {
                self.scan_account(*account, &collector, cancel.clone()).await;
                if collector.lock().await.is_stopped() {
                    break;
                }
            }
        }

        let report = collector.into_inner().into_report();
        info!(
            "Monitor stopped ({}) with {} event(s)",
            report.stop_reason,
            report.events.len()
        );
        report
    }

    async fn scan_account(&self, account: Pubkey, collector: &Mutex<Collector>, mut cancel: CancelSignal) {
        let mut cursor = SignatureCursor::new(
            &self.client,
            &self.retry,
            account,
            self.config.page_size,
            self.config.lookback,
        );

        loop {
            if collector.lock().await.is_stopped() {
                return;
            }

            let tx_ref = match cancel.guard(cursor.next()).await {
                None => return collector.lock().await.stop(StopReason::Cancelled),
                Some(Ok(Some(tx_ref))) => tx_ref,
                Some(Ok(None)) => {
                    debug!("Signatures exhausted for {}", account);
                    return;
                }
                Some(Err(failure)) => {
                    warn!("Listing signatures for {} failed: {}", account, failure);
                    return collector.lock().await.stop(StopReason::Failed(failure.into()));
                }
            };

            if !collector.lock().await.reserve(tx_ref) {
                debug!("Skipping already seen {}", tx_ref);
                continue;
            }

            let fetched = cancel
                .guard(self.retry.retry(|| self.client.fetch_transaction(&tx_ref)))
                .await;
            let detail = match fetched {
                None => return collector.lock().await.abandon(&tx_ref, StopReason::Cancelled),
                Some(Ok(detail)) => Some(detail),
                Some(Err(failure)) if failure.error.is_not_found() => {
                    debug!("Skipping pruned transaction {}", tx_ref);
                    None
                }
                Some(Err(failure)) => {
                    warn!("Resolving {} failed: {}", tx_ref, failure);
                    return collector
                        .lock()
                        .await
                        .abandon(&tx_ref, StopReason::Failed(failure.into()));
                }
            };

            let event = detail.and_then(|detail| self.filter.apply(detail, account));
            if !collector.lock().await.commit(tx_ref, event) {
                return;
            }
        }
    }
}
