//! VeChainThor transaction model and RLP encoding.
//!
//! The body is encoded as the RLP list
//! `[chainTag, blockRef, expiration, clauses, gasPriceCoef, gas, dependsOn, nonce, reserved]`
//! where integers use their minimal big-endian form and `reserved` is
//! `[features]` (or the empty list when no feature bit is set). A signed
//! transaction appends the signature bytes as a tenth element.

use crate::address::Address;
use crate::crypto::{self, blake2b256, SIGNATURE_LENGTH};
use crate::error::{Result, SponsorError};
use crate::hexutil::{self, trim_leading_zeros};
use alloy_rlp::{Encodable, Header};
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

/// Reserved feature bit marking a fee-delegated transaction.
pub const FEATURE_DELEGATED: u32 = 1;

const TX_GAS: u64 = 5_000;
const CLAUSE_GAS: u64 = 16_000;
const CLAUSE_GAS_CONTRACT_CREATION: u64 = 48_000;
const ZERO_BYTE_GAS: u64 = 4;
const NON_ZERO_BYTE_GAS: u64 = 68;
const MAX_VALUE_BITS: u64 = 256;

/// One instruction within a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ClauseRepr", into = "ClauseRepr")]
pub struct Clause {
    /// `None` deploys a contract.
    pub to: Option<Address>,
    pub value: BigUint,
    pub data: Vec<u8>,
}

impl Clause {
    /// Plain value transfer with no payload.
    pub fn transfer(to: Address, value: BigUint) -> Self {
        Self {
            to: Some(to),
            value,
            data: Vec::new(),
        }
    }

    pub fn call(to: Address, data: Vec<u8>) -> Self {
        Self {
            to: Some(to),
            value: BigUint::default(),
            data,
        }
    }

    fn encode_into(&self, out: &mut Vec<u8>) {
        let mut payload = Vec::new();
        let to: &[u8] = match &self.to {
            Some(addr) => addr.as_bytes().as_slice(),
            None => &[],
        };
        to.encode(&mut payload);
        trim_leading_zeros(&self.value.to_bytes_be()).encode(&mut payload);
        self.data.as_slice().encode(&mut payload);
        put_list(&payload, out);
    }
}

#[derive(Serialize, Deserialize)]
struct ClauseRepr {
    to: Option<String>,
    value: String,
    data: String,
}

impl TryFrom<ClauseRepr> for Clause {
    type Error = SponsorError;

    fn try_from(repr: ClauseRepr) -> Result<Self> {
        let to = match repr.to {
            Some(s) => Some(s.parse()?),
            None => None,
        };
        let value = hexutil::parse_quantity(&repr.value)?;
        if value.bits() > MAX_VALUE_BITS {
            return Err(SponsorError::MalformedHex(format!(
                "clause value {} exceeds 256 bits",
                repr.value
            )));
        }
        Ok(Clause {
            to,
            value,
            data: hexutil::decode_prefixed(&repr.data)?,
        })
    }
}

impl From<Clause> for ClauseRepr {
    fn from(clause: Clause) -> Self {
        ClauseRepr {
            to: clause.to.map(|a| a.to_string()),
            value: hexutil::encode_quantity(&clause.value),
            data: hexutil::encode_prefixed(&clause.data),
        }
    }
}

/// Gas charged before any VM execution.
pub fn intrinsic_gas(clauses: &[Clause]) -> u64 {
    if clauses.is_empty() {
        return TX_GAS + CLAUSE_GAS;
    }
    clauses.iter().fold(TX_GAS, |total, clause| {
        let base = if clause.to.is_some() {
            CLAUSE_GAS
        } else {
            CLAUSE_GAS_CONTRACT_CREATION
        };
        let data: u64 = clause
            .data
            .iter()
            .map(|b| if *b == 0 { ZERO_BYTE_GAS } else { NON_ZERO_BYTE_GAS })
            .sum();
        total + base + data
    })
}

/// Unsigned transaction body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxBody {
    pub chain_tag: u8,
    /// First 8 bytes of the block id the transaction is anchored to.
    pub block_ref: [u8; 8],
    /// Validity window in blocks, counted from `block_ref`.
    pub expiration: u32,
    pub clauses: Vec<Clause>,
    pub gas_price_coef: u8,
    pub gas: u64,
    pub depends_on: Option<[u8; 32]>,
    pub nonce: u64,
    pub features: u32,
}

impl TxBody {
    pub fn is_delegated(&self) -> bool {
        self.features & FEATURE_DELEGATED == FEATURE_DELEGATED
    }

    fn encode_fields(&self, payload: &mut Vec<u8>) {
        trim_leading_zeros(&[self.chain_tag]).encode(payload);
        trim_leading_zeros(&self.block_ref).encode(payload);
        trim_leading_zeros(&self.expiration.to_be_bytes()).encode(payload);

        let mut clauses = Vec::new();
        for clause in &self.clauses {
            clause.encode_into(&mut clauses);
        }
        put_list(&clauses, payload);

        trim_leading_zeros(&[self.gas_price_coef]).encode(payload);
        trim_leading_zeros(&self.gas.to_be_bytes()).encode(payload);
        let depends_on: &[u8] = match &self.depends_on {
            Some(id) => id.as_slice(),
            None => &[],
        };
        depends_on.encode(payload);
        trim_leading_zeros(&self.nonce.to_be_bytes()).encode(payload);

        let mut reserved = Vec::new();
        if self.features != 0 {
            trim_leading_zeros(&self.features.to_be_bytes()).encode(&mut reserved);
        }
        put_list(&reserved, payload);
    }

    /// RLP bytes of the unsigned body; this is what both parties hash.
    pub fn encode_unsigned(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.encode_fields(&mut payload);
        let mut out = Vec::with_capacity(payload.len() + 9);
        put_list(&payload, &mut out);
        out
    }

    pub fn signing_hash(&self) -> [u8; 32] {
        blake2b256(&[self.encode_unsigned().as_slice()])
    }

    /// Digest the gas payer signs to sponsor this body for `origin`.
    pub fn delegator_signing_hash(&self, origin: &Address) -> [u8; 32] {
        blake2b256(&[&self.signing_hash()[..], &origin.as_bytes()[..]])
    }
}

/// A body plus its signature: 65 bytes from the origin, followed by 65 bytes
/// from the gas payer when the delegated feature is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTx {
    pub body: TxBody,
    pub signature: Vec<u8>,
}

impl SignedTx {
    /// Assemble and check the signature layout against the feature bits.
    pub fn new(body: TxBody, signature: Vec<u8>) -> Result<Self> {
        let expected = if body.is_delegated() {
            SIGNATURE_LENGTH * 2
        } else {
            SIGNATURE_LENGTH
        };
        if signature.len() != expected {
            return Err(SponsorError::InvalidSignature(format!(
                "expected {} signature bytes, got {}",
                expected,
                signature.len()
            )));
        }
        Ok(Self { body, signature })
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut payload = Vec::new();
        self.body.encode_fields(&mut payload);
        self.signature.as_slice().encode(&mut payload);
        let mut out = Vec::with_capacity(payload.len() + 9);
        put_list(&payload, &mut out);
        out
    }

    pub fn origin(&self) -> Result<Address> {
        crypto::recover_address(
            &self.body.signing_hash(),
            &self.signature[..SIGNATURE_LENGTH.min(self.signature.len())],
        )
    }

    /// The sponsoring address, if the transaction is delegated.
    pub fn delegator(&self) -> Result<Option<Address>> {
        if !self.body.is_delegated() {
            return Ok(None);
        }
        let origin = self.origin()?;
        let sig = self.signature.get(SIGNATURE_LENGTH..).unwrap_or_default();
        let digest = self.body.delegator_signing_hash(&origin);
        crypto::recover_address(&digest, sig).map(Some)
    }

    /// `blake2b256(signing_hash || origin)`.
    pub fn id(&self) -> Result<[u8; 32]> {
        let origin = self.origin()?;
        Ok(blake2b256(&[&self.body.signing_hash()[..], &origin.as_bytes()[..]]))
    }
}

fn put_list(payload: &[u8], out: &mut Vec<u8>) {
    Header {
        list: true,
        payload_length: payload.len(),
    }
    .encode(out);
    out.extend_from_slice(payload);
}
