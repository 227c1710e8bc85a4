// src/crypto.rs
use crate::address::Address;
use crate::error::{Result, SponsorError};
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};

type Blake2b256 = Blake2b<U32>;

/// Length of a recoverable secp256k1 signature: r(32) || s(32) || v(1).
pub const SIGNATURE_LENGTH: usize = 65;

/// BLAKE2b-256 over the concatenation of `parts`.
pub fn blake2b256(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b256::new();
    for part in parts {
        hasher.update(part);
    }
    let res = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&res[..32]);
    out
}

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    use tiny_keccak::{Hasher, Keccak};

    let mut keccak = Keccak::v256();
    keccak.update(data);
    let mut out = [0u8; 32];
    keccak.finalize(&mut out);
    out
}

/// Sign a 32-byte digest. RFC6979 nonces make this deterministic, and the
/// `s` value is always normalized to the low half of the curve order.
pub fn sign(digest: &[u8; 32], key: &SigningKey) -> Result<[u8; SIGNATURE_LENGTH]> {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(digest)
        .map_err(|e| SponsorError::Signing(e.to_string()))?;

    let mut out = [0u8; SIGNATURE_LENGTH];
    out[..64].copy_from_slice(&signature.to_bytes());
    out[64] = recovery_id.to_byte();
    Ok(out)
}

/// Recover the public key that produced `sig` over `digest`.
pub fn recover(digest: &[u8; 32], sig: &[u8]) -> Result<VerifyingKey> {
    if sig.len() != SIGNATURE_LENGTH {
        return Err(SponsorError::InvalidSignature(format!(
            "expected {} bytes, got {}",
            SIGNATURE_LENGTH,
            sig.len()
        )));
    }
    let signature = Signature::from_slice(&sig[..64])
        .map_err(|e| SponsorError::InvalidSignature(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(sig[64])
        .ok_or_else(|| SponsorError::InvalidSignature(format!("bad recovery id {}", sig[64])))?;

    VerifyingKey::recover_from_prehash(digest, &signature, recovery_id)
        .map_err(|e| SponsorError::InvalidSignature(e.to_string()))
}

pub fn recover_address(digest: &[u8; 32], sig: &[u8]) -> Result<Address> {
    recover(digest, sig).map(|key| public_key_to_address(&key))
}

/// True when `sig` over `digest` recovers to `key`. Any decode error is a
/// failed verification.
pub fn verify(digest: &[u8; 32], sig: &[u8], key: &VerifyingKey) -> bool {
    match recover(digest, sig) {
        Ok(recovered) => &recovered == key,
        Err(_) => false,
    }
}

/// Right-most 20 bytes of keccak256 over the uncompressed point (tag byte dropped).
pub fn public_key_to_address(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut out = [0u8; 20];
    out.copy_from_slice(&hash[12..]);
    Address(out)
}
