//! Transaction signing and submission.
//!
//! ```ignore
//! let service = SigningService::new(&node, &wallet, &config);
//! let result = service
//!     .signer(sender)
//!     .delegate(&gas_payer)
//!     .request(clauses)
//!     .await?;
//! ```

use crate::address::Address;
use crate::config::SponsorConfig;
use crate::credential::Wallet;
use crate::crypto;
use crate::delegation::{DelegationHandler, DelegationRequest};
use crate::error::{Result, SponsorError};
use crate::hexutil;
use crate::network::ThorNode;
use crate::transaction::{intrinsic_gas, Clause, SignedTx, TxBody, FEATURE_DELEGATED};
use crate::types::{Bytes32, SubmitResult};
use tracing::{debug, info, warn};

/// Extra headroom added on top of a non-zero VM gas estimate.
const EXECUTION_GAS_MARGIN: u64 = 15_000;

/// Signs with credentials from a caller-owned [`Wallet`] and submits
/// through a node.
pub struct SigningService<'a, N: ?Sized> {
    node: &'a N,
    wallet: &'a Wallet,
    config: &'a SponsorConfig,
}

impl<'a, N: ThorNode + ?Sized> SigningService<'a, N> {
    pub fn new(node: &'a N, wallet: &'a Wallet, config: &'a SponsorConfig) -> Self {
        Self { node, wallet, config }
    }

    pub fn node(&self) -> &'a N {
        self.node
    }

    pub fn config(&self) -> &'a SponsorConfig {
        self.config
    }

    /// Submit a transaction that was signed earlier, e.g. with
    /// [`TxRequest::sign`].
    pub async fn submit(&self, signed: &SignedTx) -> Result<SubmitResult> {
        submit_signed(self.node, signed).await
    }

    /// Start a request signed by `signer`.
    pub fn signer(&self, signer: Address) -> TxRequest<'a, N> {
        TxRequest {
            node: self.node,
            wallet: self.wallet,
            config: self.config,
            signer,
            gas: None,
            depends_on: None,
            delegate: None,
        }
    }
}

/// A single transaction being prepared.
pub struct TxRequest<'a, N: ?Sized> {
    node: &'a N,
    wallet: &'a Wallet,
    config: &'a SponsorConfig,
    signer: Address,
    gas: Option<u64>,
    depends_on: Option<[u8; 32]>,
    delegate: Option<&'a dyn DelegationHandler>,
}

impl<'a, N: ThorNode + ?Sized> TxRequest<'a, N> {
    /// Use an explicit gas limit instead of estimating.
    pub fn gas(mut self, gas: u64) -> Self {
        self.gas = Some(gas);
        self
    }

    pub fn depends_on(mut self, txid: Bytes32) -> Self {
        self.depends_on = Some(txid.0);
        self
    }

    /// Have `handler` co-sign as gas payer.
    pub fn delegate(mut self, handler: &'a dyn DelegationHandler) -> Self {
        self.delegate = Some(handler);
        self
    }

    async fn estimate_gas(&self, clauses: &[Clause]) -> Result<u64> {
        let intrinsic = intrinsic_gas(clauses);
        let execution = self.node.execution_gas(&self.signer, clauses).await?;
        let gas = if execution == 0 {
            intrinsic
        } else {
            intrinsic + execution + EXECUTION_GAS_MARGIN
        };
        debug!(intrinsic, execution, gas, "estimated gas");
        Ok(gas)
    }

    /// Build and sign without submitting.
    pub async fn sign(&self, clauses: Vec<Clause>) -> Result<SignedTx> {
        let credential = self
            .wallet
            .get(&self.signer)
            .ok_or(SponsorError::UnknownSigner(self.signer))?;

        let chain_tag = self.node.chain_tag().await?;
        let head = self.node.best_block().await?;
        let gas = match self.gas {
            Some(gas) => gas,
            None => self.estimate_gas(&clauses).await?,
        };

        let body = TxBody {
            chain_tag,
            block_ref: head.block_ref(),
            expiration: self.config.expiration,
            clauses,
            gas_price_coef: self.config.gas_price_coef,
            gas,
            depends_on: self.depends_on,
            nonce: rand::random::<u64>(),
            features: if self.delegate.is_some() { FEATURE_DELEGATED } else { 0 },
        };

        let mut signature = credential.sign(&body.signing_hash())?.to_vec();

        if let Some(handler) = self.delegate {
            let request = DelegationRequest {
                raw: hexutil::encode_prefixed(body.encode_unsigned()),
                origin: self.signer.to_string(),
            };
            let response = handler.delegate(&request).map_err(|e| match e {
                SponsorError::DelegationRejected(_) => e,
                other => SponsorError::DelegationRejected(other.to_string()),
            })?;

            let delegator_sig = hexutil::decode_prefixed(&response.signature)
                .map_err(|e| SponsorError::DelegationRejected(e.to_string()))?;
            let digest = body.delegator_signing_hash(&self.signer);
            let gas_payer = crypto::recover_address(&digest, &delegator_sig).map_err(|e| {
                SponsorError::DelegationRejected(format!("unusable gas payer signature: {}", e))
            })?;

            debug!(origin = %self.signer, gas_payer = %gas_payer, "gas payer co-signed");
            signature.extend_from_slice(&delegator_sig);
        }

        SignedTx::new(body, signature)
    }

    /// Sign and submit `clauses`. Returns once the node accepted the
    /// transaction; it is not mined yet.
    pub async fn request(self, clauses: Vec<Clause>) -> Result<SubmitResult> {
        let signed = self.sign(clauses).await?;
        submit_signed(self.node, &signed).await
    }
}

async fn submit_signed<N: ThorNode + ?Sized>(node: &N, signed: &SignedTx) -> Result<SubmitResult> {
    let signer = signed.origin()?;
    let expected = Bytes32(signed.id()?);
    let gas_payer = signed.delegator()?.unwrap_or(signer);
    let raw = hexutil::encode_prefixed(signed.encode());

    let txid = node.submit(&raw).await?;
    if txid != expected {
        warn!(%txid, %expected, "node reported an unexpected transaction id");
    }

    info!(%txid, %signer, %gas_payer, "transaction submitted");
    Ok(SubmitResult {
        txid,
        signer,
        gas_payer,
    })
}
