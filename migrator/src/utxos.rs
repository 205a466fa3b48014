//! Sequence-cursor pagination over the wallet's unspent safe outputs.
//!
//! The ledger returns outputs in ascending sequence order and has no "last
//! page" marker, so enumeration only ends on an empty page. Each following
//! request starts one past the largest sequence seen.

use safemig_types::{SafeUtxo, UtxoState};
use safemig_wallet_core::{LedgerClient, SortOrder, UtxoQuery, WalletError};

/// Outputs requested per page.
pub const PAGE_SIZE: u32 = 500;

/// Pages through unspent outputs, starting from sequence 0.
pub struct UtxoPager<'a> {
    ledger: &'a dyn LedgerClient,
    offset: u64,
    page_size: u32,
    requests: usize,
    exhausted: bool,
}

impl<'a> UtxoPager<'a> {
    pub fn new(ledger: &'a dyn LedgerClient) -> Self {
        Self::with_page_size(ledger, PAGE_SIZE)
    }

    pub fn with_page_size(ledger: &'a dyn LedgerClient, page_size: u32) -> Self {
        Self {
            ledger,
            offset: 0,
            page_size: page_size.max(1),
            requests: 0,
            exhausted: false,
        }
    }

    /// Number of page requests made so far, including the terminating empty one.
    pub fn requests(&self) -> usize {
        self.requests
    }

    /// Fetch the next page, or `None` once an empty page has been seen.
    pub async fn next_page(&mut self) -> Result<Option<Vec<SafeUtxo>>, WalletError> {
        if self.exhausted {
            return Ok(None);
        }

        let query = UtxoQuery {
            offset: self.offset,
            limit: self.page_size,
            order: SortOrder::Asc,
            state: UtxoState::Unspent,
        };
        let page = self.ledger.list_utxos(&query).await?;
        self.requests += 1;

        let Some(max_sequence) = page.iter().map(|u| u.sequence).max() else {
            self.exhausted = true;
            return Ok(None);
        };
        if max_sequence < self.offset {
            return Err(WalletError::InvalidResponse(format!(
                "output page at offset {} ends at sequence {max_sequence}",
                self.offset
            )));
        }
        self.offset = max_sequence.checked_add(1).ok_or_else(|| {
            WalletError::InvalidResponse(format!("output sequence {max_sequence} cannot advance"))
        })?;

        tracing::debug!(
            outputs = page.len(),
            next_offset = self.offset,
            "fetched safe output page"
        );
        Ok(Some(page))
    }
}

/// Enumerate every unspent output from the start.
pub async fn list_unspent(ledger: &dyn LedgerClient) -> Result<Vec<SafeUtxo>, WalletError> {
    let mut pager = UtxoPager::new(ledger);
    let mut utxos = Vec::new();
    while let Some(page) = pager.next_page().await? {
        utxos.extend(page.into_iter().filter(SafeUtxo::is_unspent));
    }
    Ok(utxos)
}
