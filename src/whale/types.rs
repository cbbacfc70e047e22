use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;
use solana_sdk::pubkey::Pubkey;

use crate::ledger::{serialize_display, TransactionDetail, TxRef};

/// A transfer that met the whale threshold, with the watched account it was
/// discovered under.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WhaleEvent {
    #[serde(serialize_with = "serialize_display")]
    pub account: Pubkey,
    #[serde(flatten)]
    pub transaction: TransactionDetail,
}

impl WhaleEvent {
    pub fn tx_ref(&self) -> &TxRef {
        &self.transaction.tx_ref
    }

    pub fn amount(&self) -> Decimal {
        self.transaction.amount
    }
}

impl fmt::Display for WhaleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {}: {:.9} SOL (watching {})",
            self.transaction.tx_ref,
            self.transaction.sender,
            self.transaction.receiver,
            self.transaction.amount,
            self.account
        )
    }
}
