// src/config.rs
// Well-known constants and environment overrides, validated on load

use crate::abi::FunctionDescriptor;
use crate::address::Address;
use crate::error::{Result, SponsorError};
use std::env;
use tracing::{error, info, warn};

/// Built-in Prototype contract managing users and credit plans.
pub const PROTOTYPE_ADDRESS: &str = "0x000000000000000000000050726f746f74797065";

pub const ADD_USER_ABI: &str = r#"{
    "constant": false,
    "inputs": [
        { "name": "self", "type": "address" },
        { "name": "user", "type": "address" }
    ],
    "name": "addUser",
    "outputs": [],
    "payable": false,
    "stateMutability": "nonpayable",
    "type": "function"
}"#;

pub const SET_CREDIT_PLAN_ABI: &str = r#"{
    "constant": false,
    "inputs": [
        { "name": "self", "type": "address" },
        { "name": "credit", "type": "uint256" },
        { "name": "recoveryRate", "type": "uint256" }
    ],
    "name": "setCreditPlan",
    "outputs": [],
    "payable": false,
    "stateMutability": "nonpayable",
    "type": "function"
}"#;

pub const DEFAULT_ADMIN_GAS: u64 = 100_000;
pub const DEFAULT_CONFIRM_ATTEMPTS: u32 = 3;
pub const DEFAULT_EXPIRATION: u32 = 18;
pub const DEFAULT_GAS_PRICE_COEF: u8 = 0;

/// Validation result for configuration checks
#[derive(Debug, Default)]
pub struct ConfigValidation {
    pub valid: bool,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ConfigValidation {
    fn new() -> Self {
        Self {
            valid: true,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn add_warning(&mut self, msg: String) {
        self.warnings.push(msg);
    }

    fn add_error(&mut self, msg: String) {
        self.errors.push(msg);
        self.valid = false;
    }

    pub fn print_summary(&self) {
        for w in &self.warnings {
            warn!("config: {}", w);
        }
        for e in &self.errors {
            error!("config: {}", e);
        }
        if self.valid && self.warnings.is_empty() {
            info!("configuration validation passed");
        }
    }

    /// Collapse into a single error when any check failed.
    pub fn into_result(self) -> Result<()> {
        if self.valid {
            Ok(())
        } else {
            Err(SponsorError::Config(self.errors.join("; ")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SponsorConfig {
    /// Kept as text so validation can report the original spelling.
    pub prototype_address: String,
    /// Explicit gas for the administrative Prototype calls.
    pub admin_gas: u64,
    pub confirm_attempts: u32,
    pub expiration: u32,
    pub gas_price_coef: u8,
}

impl Default for SponsorConfig {
    fn default() -> Self {
        Self {
            prototype_address: PROTOTYPE_ADDRESS.to_string(),
            admin_gas: DEFAULT_ADMIN_GAS,
            confirm_attempts: DEFAULT_CONFIRM_ATTEMPTS,
            expiration: DEFAULT_EXPIRATION,
            gas_price_coef: DEFAULT_GAS_PRICE_COEF,
        }
    }
}

impl SponsorConfig {
    /// Read `SPONSOR_*` overrides from the environment and validate them.
    pub fn from_env() -> (Self, ConfigValidation) {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`SponsorConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> (Self, ConfigValidation)
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut validation = ConfigValidation::new();
        let mut config = SponsorConfig::default();

        if let Some(addr) = lookup("SPONSOR_PROTOTYPE_ADDRESS") {
            config.prototype_address = addr.trim().to_string();
        }
        if let Some(v) = parse_var::<u64>(&lookup, "SPONSOR_ADMIN_GAS", &mut validation) {
            config.admin_gas = v;
        }
        if let Some(v) = parse_var::<u32>(&lookup, "SPONSOR_CONFIRM_ATTEMPTS", &mut validation) {
            config.confirm_attempts = v;
        }
        if let Some(v) = parse_var::<u32>(&lookup, "SPONSOR_TX_EXPIRATION", &mut validation) {
            config.expiration = v;
        }
        if let Some(v) = parse_var::<u8>(&lookup, "SPONSOR_GAS_PRICE_COEF", &mut validation) {
            config.gas_price_coef = v;
        }

        config.check(&mut validation);
        (config, validation)
    }

    pub fn validate(&self) -> ConfigValidation {
        let mut validation = ConfigValidation::new();
        self.check(&mut validation);
        validation
    }

    fn check(&self, validation: &mut ConfigValidation) {
        if let Err(e) = self.prototype_address.parse::<Address>() {
            validation.add_error(format!(
                "prototype address '{}' is invalid: {}",
                self.prototype_address, e
            ));
        }
        for abi in [ADD_USER_ABI, SET_CREDIT_PLAN_ABI] {
            if let Err(e) = FunctionDescriptor::from_json(abi) {
                validation.add_error(format!("built-in ABI literal is malformed: {}", e));
            }
        }

        if self.admin_gas < 21_000 {
            validation.add_error(format!(
                "SPONSOR_ADMIN_GAS {} is below the intrinsic gas of any call",
                self.admin_gas
            ));
        }
        if self.confirm_attempts == 0 {
            validation.add_error("SPONSOR_CONFIRM_ATTEMPTS must be at least 1".into());
        } else if self.confirm_attempts > 30 {
            validation.add_warning(format!(
                "SPONSOR_CONFIRM_ATTEMPTS is very high ({}) - each attempt waits a block",
                self.confirm_attempts
            ));
        }
        if self.expiration == 0 {
            validation.add_error("SPONSOR_TX_EXPIRATION must be at least 1 block".into());
        } else if self.expiration < self.confirm_attempts {
            validation.add_warning(format!(
                "SPONSOR_TX_EXPIRATION ({}) is shorter than the confirmation window ({})",
                self.expiration, self.confirm_attempts
            ));
        }
    }

    pub fn prototype_address(&self) -> Result<Address> {
        self.prototype_address.parse()
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    validation: &mut ConfigValidation,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            validation.add_error(format!("{} has invalid value '{}'", key, raw));
            None
        }
    }
}
