//! 20-byte account address.
//!
//! Displayed as lowercase `0x…` hex. Parsing accepts all-lowercase and
//! all-uppercase input as-is; mixed-case input must match the keccak256
//! checksum casing (the same scheme as EIP-55).

use crate::crypto::keccak256;
use crate::error::{Result, SponsorError};
use crate::hexutil;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub const ADDRESS_LENGTH: usize = 20;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct Address(pub [u8; ADDRESS_LENGTH]);

impl Address {
    pub fn from_bytes(b: [u8; ADDRESS_LENGTH]) -> Self {
        Address(b)
    }

    pub fn from_slice(b: &[u8]) -> Result<Self> {
        let arr: [u8; ADDRESS_LENGTH] = b
            .try_into()
            .map_err(|_| SponsorError::AddressLength(b.len()))?;
        Ok(Address(arr))
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Checksummed form, e.g. `0xD55100EEdB61F1E553a38c33A234CE07952c43f2`.
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak256(lower.as_bytes());
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = if i % 2 == 0 { hash[i / 2] >> 4 } else { hash[i / 2] & 0x0f };
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl AsRef<[u8]> for Address {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl FromStr for Address {
    type Err = SponsorError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bytes = hexutil::decode_prefixed(s)?;
        let address = Address::from_slice(&bytes)?;

        let body = hexutil::strip_prefix(s);
        let has_lower = body.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = body.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper {
            let expected = address.to_checksum();
            if &expected[2..] != body {
                return Err(SponsorError::AddressChecksum(s.to_string()));
            }
        }
        Ok(address)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
