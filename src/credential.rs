use crate::address::Address;
use crate::crypto::{self, SIGNATURE_LENGTH};
use crate::error::{Result, SponsorError};
use crate::hexutil;
use k256::ecdsa::{SigningKey, VerifyingKey};
use rand::rngs::OsRng;
use std::collections::HashMap;
use std::fmt;

/// A private key together with the address derived from it.
///
/// The key never leaves the process except through [`Credential::secret_hex`],
/// which exists for the key generation tool.
#[derive(Clone)]
pub struct Credential {
    signing_key: SigningKey,
    address: Address,
}

impl Credential {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::random(&mut OsRng))
    }

    /// Import from a 32-byte private key in hex, `0x` prefix optional.
    pub fn from_hex(private_key_hex: &str) -> Result<Self> {
        let key_bytes = hexutil::decode_prefixed(private_key_hex)
            .map_err(|_| SponsorError::InvalidKey("invalid hex private key".into()))?;

        if key_bytes.len() != 32 {
            return Err(SponsorError::InvalidKey(format!(
                "private key must be 32 bytes, got {}",
                key_bytes.len()
            )));
        }

        let signing_key = SigningKey::from_slice(&key_bytes)
            .map_err(|e| SponsorError::InvalidKey(e.to_string()))?;
        Ok(Self::from_signing_key(signing_key))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = crypto::public_key_to_address(signing_key.verifying_key());
        Self { signing_key, address }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn public_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    pub fn sign(&self, digest: &[u8; 32]) -> Result<[u8; SIGNATURE_LENGTH]> {
        crypto::sign(digest, &self.signing_key)
    }

    pub fn secret_hex(&self) -> String {
        hexutil::encode_prefixed(self.signing_key.to_bytes())
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

/// Credentials held by the caller, keyed by address.
#[derive(Debug, Clone, Default)]
pub struct Wallet {
    credentials: HashMap<Address, Credential>,
}

impl Wallet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Import a private key and return its address.
    pub fn add(&mut self, private_key_hex: &str) -> Result<Address> {
        let credential = Credential::from_hex(private_key_hex)?;
        Ok(self.insert(credential))
    }

    pub fn insert(&mut self, credential: Credential) -> Address {
        let address = credential.address();
        self.credentials.insert(address, credential);
        address
    }

    pub fn get(&self, address: &Address) -> Option<&Credential> {
        self.credentials.get(address)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.credentials.contains_key(address)
    }

    pub fn addresses(&self) -> Vec<Address> {
        let mut list: Vec<Address> = self.credentials.keys().copied().collect();
        list.sort();
        list
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
