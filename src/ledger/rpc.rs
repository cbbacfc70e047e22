use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use solana_client::rpc_config::{RpcSignaturesForAddressConfig, RpcTransactionConfig};
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use solana_transaction_status::UiTransactionEncoding;

use super::balance::extract_sol_changes;
use super::client::LedgerClient;
use super::error::LedgerError;
use super::types::{TransactionDetail, TxRef};

// Solana RPC server errors meaning the block holding a transaction is gone.
const SLOT_SKIPPED: i64 = -32007;
const LONG_TERM_STORAGE_SLOT_SKIPPED: i64 = -32009;

/// JSON-RPC ledger client for a Solana HTTP endpoint.
#[derive(Clone, Debug)]
pub struct RpcLedgerClient {
    http: Client,
    url: String,
    commitment: CommitmentConfig,
}

impl RpcLedgerClient {
    pub fn new(
        url: String,
        commitment: CommitmentConfig,
        timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url,
            commitment,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn call(&self, method: &str, params: Value) -> Result<Value, LedgerError> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self.http.post(&self.url).json(&body).send().await?;
        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LedgerError::RateLimited(format!("{method}: HTTP {status}")));
        }
        if !status.is_success() {
            return Err(LedgerError::Transport(format!("{method}: HTTP {status}")));
        }

        let envelope: RpcEnvelope = response.json().await?;
        envelope.into_result(method)
    }
}

#[async_trait]
impl LedgerClient for RpcLedgerClient {
    async fn fetch_recent_signatures(
        &self,
        account: &Pubkey,
        before: Option<TxRef>,
        limit: usize,
    ) -> Result<Vec<TxRef>, LedgerError> {
        let config = RpcSignaturesForAddressConfig {
            before: before.map(|b| b.to_string()),
            limit: Some(limit),
            commitment: Some(self.commitment),
            ..Default::default()
        };

        let result = self
            .call("getSignaturesForAddress", json!([account.to_string(), config]))
            .await?;
        decode_signatures(result)
    }

    async fn fetch_transaction(&self, tx_ref: &TxRef) -> Result<TransactionDetail, LedgerError> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::Json),
            commitment: Some(self.commitment),
            max_supported_transaction_version: Some(0),
        };

        let result = self
            .call("getTransaction", json!([tx_ref.to_string(), config]))
            .await?;
        decode_transaction(tx_ref, result)
    }
}

#[derive(Debug, Deserialize)]
struct RpcEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<RpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    message: String,
}

impl RpcEnvelope {
    fn into_result(self, method: &str) -> Result<Value, LedgerError> {
        if let Some(err) = self.error {
            let message = format!("{method}: {} (code {})", err.message, err.code);
            return Err(match err.code {
                429 => LedgerError::RateLimited(message),
                SLOT_SKIPPED | LONG_TERM_STORAGE_SLOT_SKIPPED => LedgerError::NotFound(message),
                _ => LedgerError::Transport(message),
            });
        }
        // A missing result field reads as null, which callers interpret.
        Ok(self.result.unwrap_or(Value::Null))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignatureInfo {
    signature: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransactionPayload {
    slot: u64,
    #[serde(default)]
    block_time: Option<i64>,
    transaction: TransactionBody,
    meta: Option<MetaPayload>,
}

#[derive(Debug, Deserialize)]
struct TransactionBody {
    message: MessagePayload,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessagePayload {
    account_keys: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MetaPayload {
    fee: u64,
    pre_balances: Vec<u64>,
    post_balances: Vec<u64>,
    #[serde(default)]
    loaded_addresses: Option<LoadedAddresses>,
}

#[derive(Debug, Default, Deserialize)]
struct LoadedAddresses {
    #[serde(default)]
    writable: Vec<String>,
    #[serde(default)]
    readonly: Vec<String>,
}

fn decode_signatures(result: Value) -> Result<Vec<TxRef>, LedgerError> {
    let infos: Vec<SignatureInfo> = serde_json::from_value(result)
        .map_err(|e| LedgerError::Decode(format!("getSignaturesForAddress: {e}")))?;

    infos.iter().map(|info| TxRef::from_str(&info.signature)).collect()
}

fn decode_transaction(tx_ref: &TxRef, result: Value) -> Result<TransactionDetail, LedgerError> {
    if result.is_null() {
        return Err(LedgerError::NotFound(tx_ref.to_string()));
    }

    let payload: TransactionPayload = serde_json::from_value(result)
        .map_err(|e| LedgerError::Decode(format!("getTransaction {tx_ref}: {e}")))?;
    let meta = payload
        .meta
        .ok_or_else(|| LedgerError::Decode(format!("getTransaction {tx_ref}: missing meta")))?;

    let loaded = meta.loaded_addresses.unwrap_or_default();
    let account_keys = payload
        .transaction
        .message
        .account_keys
        .iter()
        .chain(&loaded.writable)
        .chain(&loaded.readonly)
        .map(|key| {
            Pubkey::from_str(key)
                .map_err(|e| LedgerError::Decode(format!("invalid account key {key}: {e}")))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let fee_payer = *account_keys
        .first()
        .ok_or_else(|| LedgerError::Decode(format!("getTransaction {tx_ref}: no account keys")))?;

    let changes =
        extract_sol_changes(&meta.pre_balances, &meta.post_balances, meta.fee, &account_keys)?;
    let timestamp = payload
        .block_time
        .and_then(|secs| DateTime::from_timestamp(secs, 0));

    Ok(TransactionDetail::from_changes(
        *tx_ref,
        payload.slot,
        timestamp,
        fee_payer,
        changes,
    ))
}
