//! Credit sponsorship through the built-in Prototype contract.
//!
//! A sponsor registers users (`addUser`) and a credit plan
//! (`setCreditPlan`). Once both are in place, the network charges a
//! registered user's transactions to the sponsor's credit without any
//! per-transaction co-signing. Both administrative calls are signed and
//! paid for by the sponsor itself, with an explicit gas limit.

use crate::abi::{FunctionDescriptor, Token};
use crate::address::Address;
use crate::config::{SponsorConfig, ADD_USER_ABI, SET_CREDIT_PLAN_ABI};
use crate::error::Result;
use crate::hexutil;
use crate::network::ThorNode;
use crate::signing::SigningService;
use crate::transaction::Clause;
use crate::types::SubmitResult;
use tracing::info;

/// Validated handle on the Prototype contract.
#[derive(Debug, Clone)]
pub struct PrototypeContract {
    address: Address,
    add_user: FunctionDescriptor,
    set_credit_plan: FunctionDescriptor,
}

impl PrototypeContract {
    pub fn load(config: &SponsorConfig) -> Result<Self> {
        Ok(Self {
            address: config.prototype_address()?,
            add_user: FunctionDescriptor::from_json(ADD_USER_ABI)?,
            set_credit_plan: FunctionDescriptor::from_json(SET_CREDIT_PLAN_ABI)?,
        })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn add_user_abi(&self) -> &FunctionDescriptor {
        &self.add_user
    }

    pub fn set_credit_plan_abi(&self) -> &FunctionDescriptor {
        &self.set_credit_plan
    }

    /// `addUser(self = sponsor, user)`.
    pub fn grant_user_clause(&self, sponsor: &Address, user: &Address) -> Result<Clause> {
        let data = self
            .add_user
            .encode_call(&[Token::Address(*sponsor), Token::Address(*user)])?;
        Ok(Clause::call(self.address, data))
    }

    /// `setCreditPlan(self = sponsor, credit, recoveryRate)`. Both amounts are
    /// `0x`-hex or decimal; only the uint256 range is enforced.
    pub fn set_credit_plan_clause(
        &self,
        sponsor: &Address,
        credit: &str,
        recovery_rate: &str,
    ) -> Result<Clause> {
        let data = self.set_credit_plan.encode_call(&[
            Token::Address(*sponsor),
            Token::Uint(hexutil::parse_quantity(credit)?),
            Token::Uint(hexutil::parse_quantity(recovery_rate)?),
        ])?;
        Ok(Clause::call(self.address, data))
    }

    /// Register `user` under `sponsor`. Returns the submission, not the receipt.
    pub async fn grant_user<N: ThorNode + ?Sized>(
        &self,
        service: &SigningService<'_, N>,
        sponsor: Address,
        user: Address,
    ) -> Result<SubmitResult> {
        let clause = self.grant_user_clause(&sponsor, &user)?;
        let result = service
            .signer(sponsor)
            .gas(service.config().admin_gas)
            .request(vec![clause])
            .await?;
        info!(txid = %result.txid, %sponsor, %user, "addUser submitted");
        Ok(result)
    }

    /// Set the sponsor's credit plan. Returns the submission, not the receipt.
    pub async fn set_credit_plan<N: ThorNode + ?Sized>(
        &self,
        service: &SigningService<'_, N>,
        sponsor: Address,
        credit: &str,
        recovery_rate: &str,
    ) -> Result<SubmitResult> {
        let clause = self.set_credit_plan_clause(&sponsor, credit, recovery_rate)?;
        let result = service
            .signer(sponsor)
            .gas(service.config().admin_gas)
            .request(vec![clause])
            .await?;
        info!(txid = %result.txid, %sponsor, credit, recovery_rate, "setCreditPlan submitted");
        Ok(result)
    }
}
