//! `0x`-prefixed hex helpers used at every string boundary.

use crate::error::{Result, SponsorError};
use num_bigint::BigUint;
use num_traits::Num;

/// Strip an optional `0x`/`0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}

/// Decode a hex string, with or without the `0x` prefix. Whitespace is not
/// hex and is rejected; trim at the text boundary instead.
pub fn decode_prefixed(s: &str) -> Result<Vec<u8>> {
    let body = strip_prefix(s);
    hex::decode(body).map_err(|e| SponsorError::MalformedHex(format!("{:?}: {}", s, e)))
}

/// Like [`decode_prefixed`], but the `0x`/`0X` prefix is mandatory.
pub fn decode_strict(s: &str) -> Result<Vec<u8>> {
    if !(s.starts_with("0x") || s.starts_with("0X")) {
        return Err(SponsorError::MalformedHex(format!("missing 0x prefix: {:?}", s)));
    }
    decode_prefixed(s)
}

/// Decode into a fixed-size array, rejecting any other length.
pub fn decode_fixed<const N: usize>(s: &str) -> Result<[u8; N]> {
    let bytes = decode_prefixed(s)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        SponsorError::MalformedHex(format!("expected {} bytes, got {}", N, len))
    })
}

pub fn encode_prefixed(bytes: impl AsRef<[u8]>) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse an unsigned quantity written as `0x`-hex or as decimal.
pub fn parse_quantity(s: &str) -> Result<BigUint> {
    let s = s.trim();
    let parsed = if s.starts_with("0x") || s.starts_with("0X") {
        let body = strip_prefix(s);
        if body.is_empty() {
            return Err(SponsorError::MalformedHex(format!("empty quantity: {}", s)));
        }
        BigUint::from_str_radix(body, 16)
    } else {
        BigUint::from_str_radix(s, 10)
    };
    parsed.map_err(|e| SponsorError::MalformedHex(format!("{}: {}", s, e)))
}

pub fn encode_quantity(value: &BigUint) -> String {
    format!("0x{}", value.to_str_radix(16))
}

/// Minimal big-endian form, as used for RLP integers.
pub fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let first = bytes.iter().position(|b| *b != 0).unwrap_or(bytes.len());
    &bytes[first..]
}
