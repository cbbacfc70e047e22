use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;

use super::error::{LedgerError, RetryFailure};
use super::retry::RetryHandler;
use super::types::{TransactionDetail, TxRef};

/// Read access to ledger history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// One page of signatures for `account`, most recent first, strictly older
    /// than `before` when given. A page shorter than `limit` is the last one.
    async fn fetch_recent_signatures(
        &self,
        account: &Pubkey,
        before: Option<TxRef>,
        limit: usize,
    ) -> Result<Vec<TxRef>, LedgerError>;

    async fn fetch_transaction(&self, tx_ref: &TxRef) -> Result<TransactionDetail, LedgerError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for Arc<T> {
    async fn fetch_recent_signatures(
        &self,
        account: &Pubkey,
        before: Option<TxRef>,
        limit: usize,
    ) -> Result<Vec<TxRef>, LedgerError> {
        (**self).fetch_recent_signatures(account, before, limit).await
    }

    async fn fetch_transaction(&self, tx_ref: &TxRef) -> Result<TransactionDetail, LedgerError> {
        (**self).fetch_transaction(tx_ref).await
    }
}

/// Pull cursor over an account's recent signatures.
///
/// Pages are requested lazily as the buffer drains, and the cursor ends after
/// `lookback` signatures or at the first short page, so every sequence is finite.
pub struct SignatureCursor<'a, C: ?Sized> {
    client: &'a C,
    retry: &'a RetryHandler,
    account: Pubkey,
    page_size: usize,
    remaining: usize,
    before: Option<TxRef>,
    buffer: VecDeque<TxRef>,
    last_page: bool,
}

impl<'a, C> SignatureCursor<'a, C>
where
    C: LedgerClient + ?Sized,
{
    pub fn new(
        client: &'a C,
        retry: &'a RetryHandler,
        account: Pubkey,
        page_size: usize,
        lookback: usize,
    ) -> Self {
        Self {
            client,
            retry,
            account,
            page_size: page_size.max(1),
            remaining: lookback,
            before: None,
            buffer: VecDeque::new(),
            last_page: false,
        }
    }

    /// Next signature, or `None` once the sequence is exhausted.
    ///
    /// A failed page fetch leaves the cursor untouched.
    pub async fn next(&mut self) -> Result<Option<TxRef>, RetryFailure> {
        if let Some(next) = self.buffer.pop_front() {
            return Ok(Some(next));
        }
        if self.last_page || self.remaining == 0 {
            return Ok(None);
        }

        let limit = self.page_size.min(self.remaining);
        let (account, before) = (self.account, self.before);
        let mut page = self
            .retry
            .retry(|| self.client.fetch_recent_signatures(&account, before, limit))
            .await?;

        page.truncate(limit);
        log::debug!("Fetched {} signatures for {}", page.len(), self.account);

        if page.len() < limit {
            self.last_page = true;
        }
        self.remaining -= page.len();
        self.before = page.last().copied().or(self.before);
        self.buffer.extend(page);

        Ok(self.buffer.pop_front())
    }
}
