use solana_sdk::pubkey::Pubkey;

use super::error::LedgerError;
use super::types::{lamports_to_sol, BalanceChange, ChangeReason, Direction};

/// Extracts the lamport balance changes of a transaction.
///
/// `account_keys` must be ordered the way the ledger indexes the balances:
/// static keys first, then loaded writable and loaded readonly addresses.
/// Accounts whose balance did not move are left out.
pub fn extract_sol_changes(
    pre_balances: &[u64],
    post_balances: &[u64],
    fee: u64,
    account_keys: &[Pubkey],
) -> Result<Vec<BalanceChange>, LedgerError> {
    if pre_balances.len() != post_balances.len() || pre_balances.len() != account_keys.len() {
        return Err(LedgerError::Decode(format!(
            "balance arrays ({} pre, {} post) do not match {} account keys",
            pre_balances.len(),
            post_balances.len(),
            account_keys.len()
        )));
    }

    let mut changes = Vec::new();
    for (i, (&before, &after)) in pre_balances.iter().zip(post_balances).enumerate() {
        if before == after {
            continue;
        }

        let delta = i64::try_from(i128::from(after) - i128::from(before)).map_err(|_| {
            LedgerError::Decode(format!("balance delta overflows at index {i}"))
        })?;

        let direction = if delta > 0 { Direction::Gain } else { Direction::Loss };
        let reason = if i == 0 && delta < 0 && delta.unsigned_abs() == fee {
            ChangeReason::Fee
        } else if delta < 0 {
            ChangeReason::SentOrFee
        } else {
            ChangeReason::Received
        };

        changes.push(BalanceChange {
            account: account_keys[i],
            delta_lamports: delta,
            delta_sol: lamports_to_sol(delta),
            direction,
            reason,
        });
    }

    Ok(changes)
}
