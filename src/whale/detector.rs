use rust_decimal::Decimal;
use solana_sdk::pubkey::Pubkey;

use super::types::WhaleEvent;
use crate::ledger::TransactionDetail;

/// Decides whether a transaction is a whale transfer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThresholdFilter {
    threshold: Decimal,
}

impl ThresholdFilter {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Decimal {
        self.threshold
    }

    /// Returns the event when `detail.amount >= threshold`. The bound is inclusive.
    pub fn apply(&self, detail: TransactionDetail, account: Pubkey) -> Option<WhaleEvent> {
        if detail.amount < self.threshold {
            return None;
        }

        Some(WhaleEvent {
            account,
            transaction: detail,
        })
    }
}
