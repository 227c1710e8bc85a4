//! Gas sponsorship for VeChainThor transactions.
//!
//! Two mechanisms are supported:
//!
//! - **Fee delegation (VIP-191)**: a gas payer co-signs each transaction
//!   through a [`DelegationHandler`]; see [`delegation`].
//! - **Prototype credit**: a sponsor registers users and a credit plan on the
//!   built-in Prototype contract, after which the chain bills those users'
//!   transactions to the sponsor; see [`prototype`].
//!
//! Node transport is not part of this crate. Callers provide implementations
//! of the traits in [`network`].

pub mod abi;
pub mod address;
pub mod config;
pub mod confirmation;
pub mod credential;
pub mod crypto;
pub mod delegation;
pub mod error;
pub mod hexutil;
pub mod network;
pub mod prototype;
pub mod signing;
pub mod sponsor;
pub mod transaction;
pub mod types;

pub use address::Address;
pub use config::SponsorConfig;
pub use confirmation::{wait_for_receipt, Confirmation};
pub use credential::{Credential, Wallet};
pub use delegation::{DelegationHandler, DelegationRequest, DelegationResponse, LocalDelegator};
pub use error::{Result, SponsorError};
pub use prototype::PrototypeContract;
pub use signing::SigningService;
pub use transaction::{Clause, SignedTx, TxBody};
pub use types::{Receipt, SubmitResult, TxId};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::address::Address;
    pub use crate::config::SponsorConfig;
    pub use crate::confirmation::{wait_for_receipt, Confirmation};
    pub use crate::credential::{Credential, Wallet};
    pub use crate::delegation::{DelegationHandler, DelegationRequest, DelegationResponse, LocalDelegator};
    pub use crate::error::{Result, SponsorError};
    pub use crate::network::{BlockTicker, ChainContext, ReceiptLookup, ThorNode, TxSubmitter};
    pub use crate::prototype::PrototypeContract;
    pub use crate::signing::SigningService;
    pub use crate::sponsor::{send_delegated_tx, send_user_tx, submit_and_confirm};
    pub use crate::transaction::Clause;
    pub use crate::types::*;
}
