// tests/common/mod.rs
// In-memory node and ticker shared by the integration tests.
#![allow(dead_code)]

use alloy_rlp::Header;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use thor_sponsor::crypto::{blake2b256, recover_address, SIGNATURE_LENGTH};
use thor_sponsor::error::{Result, SponsorError};
use thor_sponsor::hexutil;
use thor_sponsor::network::{BlockTicker, ChainContext, ReceiptLookup, TxSubmitter};
use thor_sponsor::transaction::Clause;
use thor_sponsor::types::{BlockHead, Bytes32, Receipt, ReceiptMeta, TxId};
use thor_sponsor::{Address, Credential, Wallet};

pub const SENDER_KEY: &str = "0x207a28b692c2b1d399d684bf03d635c42fbb333a34fff91cad87f65b0368d982";
pub const SENDER: &str = "0xd55100eedb61f1e553a38c33a234ce07952c43f2";
pub const DELEGATOR_KEY: &str = "0x3c6f1c52984a4d58507ed542689237c01c9a3fcaacc7c3b1b1fbee62910e35f2";
pub const DELEGATOR: &str = "0xe4660c72dea1d9fc2a0dc2b3a42107d37edc6327";
pub const RECIPIENT: &str = "0x91436f1e5008b2e6093e114a25842f060012685d";

pub const CHAIN_TAG: u8 = 0x27;
pub const BEST_BLOCK_ID: &str = "0x0004f6cc88bb4626a92907718e82f255b8fa511453a78e8797eb8cea3393b215";

pub fn addr(s: &str) -> Address {
    s.parse().expect("fixture address")
}

pub fn sender() -> Credential {
    Credential::from_hex(SENDER_KEY).expect("sender key")
}

pub fn delegator() -> Credential {
    Credential::from_hex(DELEGATOR_KEY).expect("delegator key")
}

/// Wallet holding both fixture keys.
pub fn wallet() -> Wallet {
    let mut wallet = Wallet::new();
    wallet.insert(sender());
    wallet.insert(delegator());
    wallet
}

/// Node double. Receipts stay missing for `pending_lookups` calls, then
/// appear with `gas_payer` set to whatever the test configured.
pub struct MockNode {
    pub execution_gas: u64,
    pub submitted: Mutex<Vec<String>>,
    pub pending_lookups: AtomicU32,
    pub lookups: AtomicU32,
    pub receipt_payer: Mutex<Option<Address>>,
    pub fail_lookups: bool,
}

impl MockNode {
    pub fn new() -> Self {
        Self {
            execution_gas: 0,
            submitted: Mutex::new(Vec::new()),
            pending_lookups: AtomicU32::new(0),
            lookups: AtomicU32::new(0),
            receipt_payer: Mutex::new(None),
            fail_lookups: false,
        }
    }

    pub fn with_execution_gas(mut self, gas: u64) -> Self {
        self.execution_gas = gas;
        self
    }

    /// Answer "not mined yet" for the first `n` lookups.
    pub fn mined_after(self, n: u32) -> Self {
        self.pending_lookups.store(n, Ordering::SeqCst);
        self
    }

    pub fn paid_by(self, payer: Address) -> Self {
        *self.receipt_payer.lock().unwrap() = Some(payer);
        self
    }

    pub fn failing_lookups(mut self) -> Self {
        self.fail_lookups = true;
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn lookup_count(&self) -> u32 {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChainContext for MockNode {
    async fn chain_tag(&self) -> Result<u8> {
        Ok(CHAIN_TAG)
    }

    async fn best_block(&self) -> Result<BlockHead> {
        Ok(BlockHead {
            id: BEST_BLOCK_ID.parse()?,
            number: 325324,
            timestamp: 1533267900,
        })
    }

    async fn execution_gas(&self, _caller: &Address, _clauses: &[Clause]) -> Result<u64> {
        Ok(self.execution_gas)
    }
}

#[async_trait]
impl TxSubmitter for MockNode {
    async fn submit(&self, raw: &str) -> Result<TxId> {
        let bytes = hexutil::decode_prefixed(raw)?;
        if bytes.is_empty() {
            return Err(SponsorError::Submission("empty payload".into()));
        }
        let txid = thor_tx_id(&bytes)?;
        self.submitted.lock().unwrap().push(raw.to_string());
        Ok(txid)
    }
}

fn rlp_err(e: alloy_rlp::Error) -> SponsorError {
    SponsorError::Submission(format!("bad rlp: {}", e))
}

/// Id the way the node derives it from broadcast bytes: strip the trailing
/// signature item, hash the remaining body, recover the origin, then
/// `blake2b256(signing_hash || origin)`.
pub fn thor_tx_id(signed: &[u8]) -> Result<TxId> {
    let mut buf = signed;
    let outer = Header::decode(&mut buf).map_err(rlp_err)?;
    if !outer.list || buf.len() != outer.payload_length {
        return Err(SponsorError::Submission("not a transaction list".into()));
    }
    let payload = buf;

    let mut rest = payload;
    let mut last_item = 0;
    while !rest.is_empty() {
        last_item = payload.len() - rest.len();
        let item = Header::decode(&mut rest).map_err(rlp_err)?;
        if item.payload_length > rest.len() {
            return Err(SponsorError::Submission("truncated item".into()));
        }
        rest = &rest[item.payload_length..];
    }

    let mut sig_buf = &payload[last_item..];
    let sig_header = Header::decode(&mut sig_buf).map_err(rlp_err)?;
    let signature = &sig_buf[..sig_header.payload_length];
    if signature.len() < SIGNATURE_LENGTH {
        return Err(SponsorError::Submission("missing signature".into()));
    }

    let body_payload = &payload[..last_item];
    let mut unsigned = Vec::new();
    Header {
        list: true,
        payload_length: body_payload.len(),
    }
    .encode(&mut unsigned);
    unsigned.extend_from_slice(body_payload);

    let signing_hash = blake2b256(&[unsigned.as_slice()]);
    let origin = recover_address(&signing_hash, &signature[..SIGNATURE_LENGTH])?;
    Ok(Bytes32(blake2b256(&[&signing_hash[..], &origin.as_bytes()[..]])))
}

#[async_trait]
impl ReceiptLookup for MockNode {
    async fn receipt(&self, txid: &TxId) -> Result<Option<Receipt>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(SponsorError::Network("connection reset".into()));
        }
        let pending = self.pending_lookups.load(Ordering::SeqCst);
        if pending > 0 {
            self.pending_lookups.store(pending - 1, Ordering::SeqCst);
            return Ok(None);
        }

        let origin = addr(SENDER);
        let gas_payer = self.receipt_payer.lock().unwrap().unwrap_or(origin);
        Ok(Some(Receipt {
            gas_used: 21000,
            gas_payer,
            paid: "0x1236efcbcbb340000".into(),
            reward: "0x576e189f04f60000".into(),
            reverted: false,
            meta: ReceiptMeta {
                block_id: BEST_BLOCK_ID.parse()?,
                block_number: 325325,
                block_timestamp: 1533267910,
                tx_id: *txid,
                tx_origin: origin,
            },
            outputs: Vec::new(),
        }))
    }
}

/// Ticks instantly and counts how often it was awaited.
#[derive(Default)]
pub struct InstantTicker {
    pub ticks: u32,
}

#[async_trait]
impl BlockTicker for InstantTicker {
    async fn next(&mut self) -> Result<()> {
        self.ticks += 1;
        Ok(())
    }
}
