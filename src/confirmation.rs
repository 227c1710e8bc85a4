//! Bounded waiting for receipts.
//!
//! Each attempt first waits for the next block tick, then checks. Running out
//! of attempts is an ordinary outcome, not an error.

use crate::network::{BlockTicker, ReceiptLookup};
use crate::types::{Receipt, TxId};
use std::future::Future;
use tracing::{debug, warn};

/// Outcome of waiting for a transaction to be mined.
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    Confirmed(Receipt),
    /// No receipt appeared within the attempt budget.
    NotFound { attempts: u32 },
}

impl Confirmation {
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Confirmation::Confirmed(r) => Some(r),
            Confirmation::NotFound { .. } => None,
        }
    }

    pub fn into_receipt(self) -> Option<Receipt> {
        match self {
            Confirmation::Confirmed(r) => Some(r),
            Confirmation::NotFound { .. } => None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Confirmation::Confirmed(_))
    }
}

/// Run `check` up to `max_attempts` times, waiting for a tick before each.
///
/// `check` receives the 1-based attempt number. A failed tick is logged and
/// the check still runs, so a flaky ticker cannot stretch the budget.
pub async fn retry_on_ticks<T, K, F, Fut>(ticker: &mut K, max_attempts: u32, mut check: F) -> Option<T>
where
    K: BlockTicker + ?Sized,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for attempt in 1..=max_attempts {
        if let Err(e) = ticker.next().await {
            warn!(attempt, "block ticker failed: {}", e);
        }
        if let Some(value) = check(attempt).await {
            return Some(value);
        }
    }
    None
}

/// Poll for the receipt of `txid`, one lookup per block, for at most
/// `max_attempts` blocks. Lookup errors count as a spent attempt.
pub async fn wait_for_receipt<K, L>(
    ticker: &mut K,
    lookup: &L,
    txid: &TxId,
    max_attempts: u32,
) -> Confirmation
where
    K: BlockTicker + ?Sized,
    L: ReceiptLookup + ?Sized,
{
    let found = retry_on_ticks(ticker, max_attempts, |attempt| async move {
        match lookup.receipt(txid).await {
            Ok(Some(receipt)) => Some(receipt),
            Ok(None) => {
                debug!(%txid, attempt, "receipt not available yet");
                None
            }
            Err(e) => {
                warn!(%txid, attempt, "receipt lookup failed: {}", e);
                None
            }
        }
    })
    .await;

    match found {
        Some(receipt) => Confirmation::Confirmed(receipt),
        None => {
            warn!(%txid, attempts = max_attempts, "Cannot find the TX");
            Confirmation::NotFound {
                attempts: max_attempts,
            }
        }
    }
}
