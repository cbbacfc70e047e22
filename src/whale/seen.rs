use std::collections::HashSet;

use crate::ledger::TxRef;

/// Transactions already processed during one monitor run.
#[derive(Debug, Default)]
pub struct SeenSet {
    refs: HashSet<TxRef>,
}

impl SeenSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `tx_ref` was not present before.
    pub fn add(&mut self, tx_ref: TxRef) -> bool {
        self.refs.insert(tx_ref)
    }

    /// Forgets a reservation whose transaction was never processed.
    pub fn remove(&mut self, tx_ref: &TxRef) -> bool {
        self.refs.remove(tx_ref)
    }
}
