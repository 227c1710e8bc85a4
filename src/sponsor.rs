use crate::address::Address;
use crate::confirmation::{wait_for_receipt, Confirmation};
use crate::delegation::DelegationHandler;
use crate::error::Result;
use crate::network::{BlockTicker, ThorNode};
use crate::signing::SigningService;
use crate::transaction::Clause;
use crate::types::SubmitResult;
use std::future::Future;
use tracing::info;

/// Send `clauses` from `sender` with `gas_payer` co-signing (VIP-191).
pub async fn send_delegated_tx<N: ThorNode + ?Sized>(
    service: &SigningService<'_, N>,
    clauses: Vec<Clause>,
    sender: Address,
    gas_payer: &dyn DelegationHandler,
) -> Result<SubmitResult> {
    service
        .signer(sender)
        .delegate(gas_payer)
        .request(clauses)
        .await
}

/// Send `clauses` signed only by `user`. Whether a Prototype sponsor pays is
/// decided by the chain.
pub async fn send_user_tx<N: ThorNode + ?Sized>(
    service: &SigningService<'_, N>,
    user: Address,
    clauses: Vec<Clause>,
) -> Result<SubmitResult> {
    service.signer(user).request(clauses).await
}

/// Await a submission, then poll for its receipt within the configured
/// attempt budget.
pub async fn submit_and_confirm<N, K, F>(
    service: &SigningService<'_, N>,
    ticker: &mut K,
    submission: F,
) -> Result<(SubmitResult, Confirmation)>
where
    N: ThorNode + ?Sized,
    K: BlockTicker + ?Sized,
    F: Future<Output = Result<SubmitResult>>,
{
    let submitted = submission.await?;
    let confirmation = wait_for_receipt(
        ticker,
        service.node(),
        &submitted.txid,
        service.config().confirm_attempts,
    )
    .await;

    if let Confirmation::Confirmed(receipt) = &confirmation {
        info!(
            txid = %submitted.txid,
            gas_payer = %receipt.gas_payer,
            gas_used = receipt.gas_used,
            reverted = receipt.reverted,
            "transaction confirmed"
        );
    }
    Ok((submitted, confirmation))
}
