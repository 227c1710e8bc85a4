//! Seams to the node. Transport lives outside this crate; anything that can
//! answer these calls (an HTTP client, an in-process test double) plugs in.

use crate::address::Address;
use crate::error::Result;
use crate::transaction::Clause;
use crate::types::{BlockHead, Receipt, TxId};
use async_trait::async_trait;
use std::time::Duration;
use tokio::time::{interval, Interval, MissedTickBehavior};

/// Chain facts needed to build a transaction body.
#[async_trait]
pub trait ChainContext: Send + Sync {
    async fn chain_tag(&self) -> Result<u8>;

    async fn best_block(&self) -> Result<BlockHead>;

    /// VM gas the clauses would consume when sent by `caller`, excluding
    /// intrinsic gas.
    async fn execution_gas(&self, caller: &Address, clauses: &[Clause]) -> Result<u64>;
}

/// Accepts a fully signed transaction for broadcast.
#[async_trait]
pub trait TxSubmitter: Send + Sync {
    /// `raw` is the `0x`-hex RLP of the signed transaction.
    async fn submit(&self, raw: &str) -> Result<TxId>;
}

/// Looks up receipts. `Ok(None)` means not yet mined. Implementations must
/// return rather than wait for the transaction to appear.
#[async_trait]
pub trait ReceiptLookup: Send + Sync {
    async fn receipt(&self, txid: &TxId) -> Result<Option<Receipt>>;
}

/// Everything the signing service needs from a node.
pub trait ThorNode: ChainContext + TxSubmitter + ReceiptLookup {}

impl<T: ChainContext + TxSubmitter + ReceiptLookup> ThorNode for T {}

/// Source of "a new block was produced" events, used only for pacing.
#[async_trait]
pub trait BlockTicker: Send {
    async fn next(&mut self) -> Result<()>;
}

/// Ticks on a fixed wall-clock period instead of watching the chain.
pub struct IntervalTicker {
    inner: Interval,
}

impl IntervalTicker {
    /// Thor produces a block every ten seconds.
    pub const BLOCK_INTERVAL: Duration = Duration::from_secs(10);

    /// The first tick fires one full `period` after creation.
    pub fn new(period: Duration) -> Self {
        let start = tokio::time::Instant::now() + period;
        let mut inner = tokio::time::interval_at(start, period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner }
    }

    pub fn block_interval() -> Self {
        Self::new(Self::BLOCK_INTERVAL)
    }

    /// Ticks immediately, then every `period`.
    pub fn immediate(period: Duration) -> Self {
        let mut inner = interval(period);
        inner.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner }
    }
}

#[async_trait]
impl BlockTicker for IntervalTicker {
    async fn next(&mut self) -> Result<()> {
        self.inner.tick().await;
        Ok(())
    }
}
