use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use solana_sdk::{pubkey::Pubkey, signature::Signature};

use super::error::LedgerError;

/// Decimal places of one lamport expressed in SOL.
pub const SOL_DECIMALS: u32 = 9;

/// Signature of a ledger transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TxRef(Signature);

impl From<Signature> for TxRef {
    fn from(signature: Signature) -> Self {
        Self(signature)
    }
}

impl FromStr for TxRef {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Signature::from_str(s)
            .map(Self)
            .map_err(|e| LedgerError::Decode(format!("invalid signature {s}: {e}")))
    }
}

impl fmt::Display for TxRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for TxRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

// Pubkey's own serde impl writes raw bytes; events are reported in base58.
pub(crate) fn serialize_display<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(value)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Gain,
    Loss,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Gain => f.write_str("gain"),
            Direction::Loss => f.write_str("loss"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeReason {
    Fee,
    SentOrFee,
    Received,
}

impl fmt::Display for ChangeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeReason::Fee => f.write_str("fee"),
            ChangeReason::SentOrFee => f.write_str("sent SOL or fee"),
            ChangeReason::Received => f.write_str("received SOL"),
        }
    }
}

/// Lamport balance change of one account inside a transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BalanceChange {
    #[serde(serialize_with = "serialize_display")]
    pub account: Pubkey,
    pub delta_lamports: i64,
    pub delta_sol: Decimal,
    pub direction: Direction,
    pub reason: ChangeReason,
}

impl fmt::Display for BalanceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {:.9} SOL ({})",
            self.account,
            self.direction,
            self.delta_sol.abs(),
            self.reason
        )
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TransactionDetail {
    pub tx_ref: TxRef,
    pub slot: u64,
    #[serde(serialize_with = "serialize_display")]
    pub sender: Pubkey,
    #[serde(serialize_with = "serialize_display")]
    pub receiver: Pubkey,
    /// Transferred amount in SOL.
    pub amount: Decimal,
    pub timestamp: Option<DateTime<Utc>>,
    pub changes: Vec<BalanceChange>,
}

impl TransactionDetail {
    /// Builds a detail whose transfer is derived from its balance changes.
    ///
    /// The receiver is the account with the largest gain and the amount is that
    /// gain. The sender is the account with the largest loss, or the fee payer
    /// when nothing was debited. Without any gain the transaction moved no SOL:
    /// the amount is zero and the receiver is the sender.
    pub fn from_changes(
        tx_ref: TxRef,
        slot: u64,
        timestamp: Option<DateTime<Utc>>,
        fee_payer: Pubkey,
        changes: Vec<BalanceChange>,
    ) -> Self {
        let largest_gain = changes
            .iter()
            .filter(|c| c.delta_lamports > 0)
            .reduce(|best, c| if c.delta_lamports > best.delta_lamports { c } else { best });
        let largest_loss = changes
            .iter()
            .filter(|c| c.delta_lamports < 0)
            .reduce(|best, c| if c.delta_lamports < best.delta_lamports { c } else { best });

        let sender = largest_loss.map(|c| c.account).unwrap_or(fee_payer);
        let (receiver, amount) = match largest_gain {
            Some(gain) => (gain.account, gain.delta_sol),
            None => (sender, Decimal::ZERO),
        };

        Self {
            tx_ref,
            slot,
            sender,
            receiver,
            amount,
            timestamp,
            changes,
        }
    }
}

/// Converts lamports into an exact SOL amount.
pub fn lamports_to_sol(lamports: i64) -> Decimal {
    Decimal::new(lamports, SOL_DECIMALS)
}
