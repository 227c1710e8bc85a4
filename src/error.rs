use crate::address::Address;
use thiserror::Error;

/// Errors raised by the sponsorship library.
#[derive(Error, Debug)]
pub enum SponsorError {
    #[error("Malformed hex: {0}")]
    MalformedHex(String),

    #[error("Invalid address length: expected 20 bytes, got {0}")]
    AddressLength(usize),

    #[error("Address checksum mismatch: {0}")]
    AddressChecksum(String),

    #[error("Empty transaction payload")]
    EmptyTransaction,

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    #[error("No credential held for signer {0}")]
    UnknownSigner(Address),

    #[error("ABI error: {0}")]
    Abi(String),

    #[error("Delegation rejected: {0}")]
    DelegationRejected(String),

    #[error("Transaction submission failed: {0}")]
    Submission(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SponsorError>;
