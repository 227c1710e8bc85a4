use crate::address::Address;
use crate::error::{Result, SponsorError};
use crate::hexutil;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 32-byte identifier, shown as `0x`-hex.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes32(pub [u8; 32]);

pub type TxId = Bytes32;
pub type BlockId = Bytes32;

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bytes32({})", self)
    }
}

impl FromStr for Bytes32 {
    type Err = SponsorError;

    fn from_str(s: &str) -> Result<Self> {
        hexutil::decode_fixed::<32>(s).map(Bytes32)
    }
}

impl Serialize for Bytes32 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Bytes32 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Head of the chain as seen by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHead {
    pub id: BlockId,
    pub number: u32,
    pub timestamp: u64,
}

impl BlockHead {
    /// First 8 bytes of the block id, used to anchor new transactions.
    pub fn block_ref(&self) -> [u8; 8] {
        let mut out = [0u8; 8];
        out.copy_from_slice(&self.id.0[..8]);
        out
    }
}

/// Acknowledgment that a transaction was accepted for broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    pub txid: TxId,
    pub signer: Address,
    pub gas_payer: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptMeta {
    #[serde(rename = "blockID")]
    pub block_id: BlockId,
    pub block_number: u32,
    pub block_timestamp: u64,
    #[serde(rename = "txID")]
    pub tx_id: TxId,
    pub tx_origin: Address,
}

/// On-chain confirmation record of a mined transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub gas_used: u64,
    pub gas_payer: Address,
    /// Energy paid, `0x`-hex.
    #[serde(default)]
    pub paid: String,
    #[serde(default)]
    pub reward: String,
    pub reverted: bool,
    pub meta: ReceiptMeta,
    #[serde(default)]
    pub outputs: Vec<serde_json::Value>,
}

impl Receipt {
    pub fn succeeded(&self) -> bool {
        !self.reverted
    }

    /// True when someone other than the origin paid for gas.
    pub fn is_sponsored(&self) -> bool {
        self.gas_payer != self.meta.tx_origin
    }

    pub fn block_time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(i64::try_from(self.meta.block_timestamp).ok()?, 0)
    }

    pub fn summary<'a>(&'a self, label: &'a str, to: &'a Address) -> ReceiptSummary<'a> {
        ReceiptSummary {
            label,
            receipt: self,
            to,
        }
    }
}

/// Human-readable block for logs.
pub struct ReceiptSummary<'a> {
    label: &'a str,
    receipt: &'a Receipt,
    to: &'a Address,
}

impl fmt::Display for ReceiptSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.receipt;
        writeln!(f, "--------------------------")?;
        writeln!(f, "{}", self.label)?;
        writeln!(f, "--------------------------")?;
        writeln!(f, "TXID       = {}", r.meta.tx_id)?;
        writeln!(f, "From       = {}", r.meta.tx_origin)?;
        writeln!(f, "To         = {}", self.to)?;
        writeln!(f, "GasPayer   = {}", r.gas_payer)?;
        writeln!(f, "GasUsed    = {}", r.gas_used)?;
        writeln!(f, "Status     = {}", if r.reverted { "reverted" } else { "ok" })?;
        match r.block_time() {
            Some(t) => write!(f, "Block      = #{} ({})", r.meta.block_number, t.to_rfc3339()),
            None => write!(f, "Block      = #{}", r.meta.block_number),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIPT_JSON: &str = r#"{
        "gasUsed": 21000,
        "gasPayer": "0xe4660c72dea1d9fc2a0dc2b3a42107d37edc6327",
        "paid": "0x1236efcbcbb340000",
        "reward": "0x576e189f04f60000",
        "reverted": false,
        "meta": {
            "blockID": "0x0004f6cc88bb4626a92907718e82f255b8fa511453a78e8797eb8cea3393b215",
            "blockNumber": 325324,
            "blockTimestamp": 1533267900,
            "txID": "0x284bba50ef777889ff1a367ed0b38d5e5626714477c40de38d71cedd6f9fa477",
            "txOrigin": "0xd55100eedb61f1e553a38c33a234ce07952c43f2"
        },
        "outputs": []
    }"#;

    #[test]
    fn test_receipt_parses_node_json() {
        let receipt: Receipt = serde_json::from_str(RECEIPT_JSON).unwrap();
        assert_eq!(receipt.gas_used, 21000);
        assert!(receipt.succeeded());
        assert!(receipt.is_sponsored());
        assert_eq!(receipt.meta.block_number, 325324);
        assert_eq!(
            receipt.meta.tx_id.to_string(),
            "0x284bba50ef777889ff1a367ed0b38d5e5626714477c40de38d71cedd6f9fa477"
        );
    }

    #[test]
    fn test_summary_lists_gas_payer() {
        let receipt: Receipt = serde_json::from_str(RECEIPT_JSON).unwrap();
        let to: Address = "0x91436f1e5008b2e6093e114a25842f060012685d".parse().unwrap();
        let text = receipt.summary("VIP-191", &to).to_string();
        assert!(text.contains("VIP-191"));
        assert!(text.contains("GasPayer   = 0xe4660c72dea1d9fc2a0dc2b3a42107d37edc6327"));
        assert!(text.contains("To         = 0x91436f1e5008b2e6093e114a25842f060012685d"));
        assert!(text.contains("2018-08-03"));
    }

    #[test]
    fn test_out_of_range_timestamp_has_no_block_time() {
        let mut receipt: Receipt = serde_json::from_str(RECEIPT_JSON).unwrap();
        receipt.meta.block_timestamp = u64::MAX;
        assert!(receipt.block_time().is_none());
        let to = Address::default();
        assert!(receipt.summary("far future", &to).to_string().ends_with(&format!("#{}", receipt.meta.block_number)));
    }

    #[test]
    fn test_block_ref_is_id_prefix() {
        let head = BlockHead {
            id: "0x0004f6cc88bb4626a92907718e82f255b8fa511453a78e8797eb8cea3393b215"
                .parse()
                .unwrap(),
            number: 325324,
            timestamp: 0,
        };
        assert_eq!(head.block_ref(), [0x00, 0x04, 0xf6, 0xcc, 0x88, 0xbb, 0x46, 0x26]);
    }
}
