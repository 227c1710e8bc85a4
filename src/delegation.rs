//! Fee delegation handshake (VIP-191).
//!
//! The origin signs the unsigned transaction as usual. The gas payer never
//! sees the origin's key: it receives the raw unsigned bytes and the claimed
//! origin address, and signs
//!
//! ```text
//! blake2b256( blake2b256(raw) || origin )
//! ```
//!
//! which binds its consent to that exact transaction *and* that exact origin.
//! Both signatures are then concatenated (origin first) before broadcast.
//!
//! A handler is a plain synchronous function of its request and the key it
//! holds, so one handler can serve concurrent requests without locking.

use crate::address::{Address, ADDRESS_LENGTH};
use crate::credential::Credential;
use crate::crypto::{self, blake2b256};
use crate::error::{Result, SponsorError};
use crate::hexutil;
use k256::ecdsa::VerifyingKey;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What the submission service hands to the gas payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationRequest {
    /// `0x`-hex RLP of the unsigned transaction.
    pub raw: String,
    /// `0x`-hex address of the account claiming to originate it.
    pub origin: String,
}

/// The gas payer's answer: a `0x`-hex 65-byte signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationResponse {
    pub signature: String,
}

/// Co-signs transactions on behalf of a gas payer.
pub trait DelegationHandler: Send + Sync {
    fn delegate(&self, request: &DelegationRequest) -> Result<DelegationResponse>;
}

impl<F> DelegationHandler for F
where
    F: Fn(&DelegationRequest) -> Result<DelegationResponse> + Send + Sync,
{
    fn delegate(&self, request: &DelegationRequest) -> Result<DelegationResponse> {
        self(request)
    }
}

/// `blake2b256(blake2b256(raw_tx) || origin)`.
pub fn delegation_digest(raw_tx: &[u8], origin: &Address) -> [u8; 32] {
    let tx_hash = blake2b256(&[raw_tx]);
    blake2b256(&[&tx_hash[..], &origin.as_bytes()[..]])
}

fn decode_request(request: &DelegationRequest) -> Result<(Vec<u8>, Address)> {
    let raw = hexutil::decode_strict(&request.raw)?;
    if raw.is_empty() {
        return Err(SponsorError::EmptyTransaction);
    }

    // Length only: the origin is matched byte-for-byte, so checksum casing is irrelevant here.
    let origin_bytes = hexutil::decode_strict(&request.origin)?;
    if origin_bytes.len() != ADDRESS_LENGTH {
        return Err(SponsorError::AddressLength(origin_bytes.len()));
    }
    let origin = Address::from_slice(&origin_bytes)?;
    Ok((raw, origin))
}

/// Produce the gas payer's signature for `request`.
///
/// Any malformed input is an error; there is no fallback signature.
pub fn sign_delegation(request: &DelegationRequest, delegator: &Credential) -> Result<DelegationResponse> {
    let (raw, origin) = decode_request(request)?;
    let digest = delegation_digest(&raw, &origin);
    let signature = delegator.sign(&digest)?;

    debug!(origin = %origin, delegator = %delegator.address(), "signed delegation");
    Ok(DelegationResponse {
        signature: hexutil::encode_prefixed(signature),
    })
}

/// True when `response` is a valid gas-payer signature by `delegator` over `request`.
pub fn verify_delegation(
    request: &DelegationRequest,
    response: &DelegationResponse,
    delegator: &VerifyingKey,
) -> Result<bool> {
    let (raw, origin) = decode_request(request)?;
    let signature = hexutil::decode_prefixed(&response.signature)?;
    let digest = delegation_digest(&raw, &origin);
    Ok(crypto::verify(&digest, &signature, delegator))
}

/// A gas payer whose key lives in this process.
#[derive(Debug, Clone)]
pub struct LocalDelegator {
    credential: Credential,
}

impl LocalDelegator {
    pub fn new(credential: Credential) -> Self {
        Self { credential }
    }

    pub fn address(&self) -> Address {
        self.credential.address()
    }
}

impl DelegationHandler for LocalDelegator {
    fn delegate(&self, request: &DelegationRequest) -> Result<DelegationResponse> {
        sign_delegation(request, &self.credential)
    }
}
