//! Contract method encoding for the static ABI types the sponsorship
//! contract needs: `address`, `uintN` and `bool`.

use crate::address::Address;
use crate::crypto::keccak256;
use crate::error::{Result, SponsorError};
use crate::hexutil;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

const WORD: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Address,
    /// Bit width, a multiple of 8 in `8..=256`.
    Uint(usize),
    Bool,
}

impl ParamType {
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "address" => Ok(ParamType::Address),
            "bool" => Ok(ParamType::Bool),
            "uint" => Ok(ParamType::Uint(256)),
            other => {
                let bits = other
                    .strip_prefix("uint")
                    .and_then(|n| n.parse::<usize>().ok())
                    .ok_or_else(|| SponsorError::Abi(format!("unsupported type {}", other)))?;
                if bits == 0 || bits > 256 || bits % 8 != 0 {
                    return Err(SponsorError::Abi(format!("invalid integer width {}", other)));
                }
                Ok(ParamType::Uint(bits))
            }
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Address => write!(f, "address"),
            ParamType::Uint(bits) => write!(f, "uint{}", bits),
            ParamType::Bool => write!(f, "bool"),
        }
    }
}

/// A bound argument value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Address(Address),
    Uint(BigUint),
    Bool(bool),
}

impl Token {
    /// Parse a textual argument: hex addresses, `0x`-hex or decimal integers,
    /// `true`/`false`.
    pub fn parse(kind: ParamType, s: &str) -> Result<Self> {
        match kind {
            ParamType::Address => Ok(Token::Address(s.parse()?)),
            ParamType::Uint(_) => Ok(Token::Uint(hexutil::parse_quantity(s)?)),
            ParamType::Bool => match s.trim() {
                "true" => Ok(Token::Bool(true)),
                "false" => Ok(Token::Bool(false)),
                other => Err(SponsorError::Abi(format!("invalid bool {}", other))),
            },
        }
    }

    fn encode_word(&self, kind: ParamType, out: &mut Vec<u8>) -> Result<()> {
        let mut word = [0u8; WORD];
        match (kind, self) {
            (ParamType::Address, Token::Address(addr)) => {
                word[WORD - 20..].copy_from_slice(addr.as_bytes());
            }
            (ParamType::Uint(bits), Token::Uint(value)) => {
                if value.bits() > bits as u64 {
                    return Err(SponsorError::Abi(format!(
                        "value {} does not fit in uint{}",
                        value, bits
                    )));
                }
                let bytes = value.to_bytes_be();
                let bytes = hexutil::trim_leading_zeros(&bytes);
                word[WORD - bytes.len()..].copy_from_slice(bytes);
            }
            (ParamType::Bool, Token::Bool(b)) => {
                word[WORD - 1] = u8::from(*b);
            }
            (kind, token) => {
                return Err(SponsorError::Abi(format!(
                    "argument {:?} does not match type {}",
                    token, kind
                )));
            }
        }
        out.extend_from_slice(&word);
        Ok(())
    }

    fn decode_word(kind: ParamType, word: &[u8]) -> Result<Self> {
        match kind {
            ParamType::Address => {
                if word[..WORD - 20].iter().any(|b| *b != 0) {
                    return Err(SponsorError::Abi("dirty address padding".into()));
                }
                Ok(Token::Address(Address::from_slice(&word[WORD - 20..])?))
            }
            ParamType::Uint(bits) => {
                let value = BigUint::from_bytes_be(word);
                if value.bits() > bits as u64 {
                    return Err(SponsorError::Abi(format!("value overflows uint{}", bits)));
                }
                Ok(Token::Uint(value))
            }
            ParamType::Bool => match word {
                w if w[..WORD - 1].iter().all(|b| *b == 0) && w[WORD - 1] <= 1 => {
                    Ok(Token::Bool(w[WORD - 1] == 1))
                }
                _ => Err(SponsorError::Abi("invalid bool word".into())),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// A single entry of a JSON contract ABI describing a function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionDescriptor {
    #[serde(default)]
    pub constant: bool,
    pub inputs: Vec<Param>,
    pub name: String,
    #[serde(default)]
    pub outputs: Vec<Param>,
    #[serde(default)]
    pub payable: bool,
    #[serde(default)]
    pub state_mutability: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FunctionDescriptor {
    /// Parse and validate one ABI entry from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let descriptor: FunctionDescriptor = serde_json::from_str(json)?;
        if descriptor.kind != "function" {
            return Err(SponsorError::Abi(format!(
                "{} is a {}, not a function",
                descriptor.name, descriptor.kind
            )));
        }
        descriptor.input_types()?;
        Ok(descriptor)
    }

    pub fn input_types(&self) -> Result<Vec<ParamType>> {
        self.inputs.iter().map(|p| ParamType::parse(&p.kind)).collect()
    }

    /// Canonical signature, e.g. `addUser(address,address)`.
    pub fn signature(&self) -> String {
        let types: Vec<String> = self
            .inputs
            .iter()
            .map(|p| {
                ParamType::parse(&p.kind)
                    .map(|t| t.to_string())
                    .unwrap_or_else(|_| p.kind.clone())
            })
            .collect();
        format!("{}({})", self.name, types.join(","))
    }

    pub fn selector(&self) -> [u8; 4] {
        let hash = keccak256(self.signature().as_bytes());
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// `true` unless the function is declared `view`/`pure`/`constant`.
    pub fn is_mutating(&self) -> bool {
        match self.state_mutability.as_deref() {
            Some("view") | Some("pure") => false,
            Some(_) => true,
            None => !self.constant,
        }
    }

    pub fn encode_call(&self, args: &[Token]) -> Result<Vec<u8>> {
        let types = self.input_types()?;
        if types.len() != args.len() {
            return Err(SponsorError::Abi(format!(
                "{} expects {} arguments, got {}",
                self.name,
                types.len(),
                args.len()
            )));
        }
        let mut out = Vec::with_capacity(4 + WORD * args.len());
        out.extend_from_slice(&self.selector());
        for (kind, token) in types.iter().zip(args) {
            token.encode_word(*kind, &mut out)?;
        }
        Ok(out)
    }

    /// Encode from textual arguments, one per input.
    pub fn encode_call_str(&self, args: &[&str]) -> Result<Vec<u8>> {
        let types = self.input_types()?;
        if types.len() != args.len() {
            return Err(SponsorError::Abi(format!(
                "{} expects {} arguments, got {}",
                self.name,
                types.len(),
                args.len()
            )));
        }
        let tokens = types
            .iter()
            .zip(args)
            .map(|(kind, s)| Token::parse(*kind, s))
            .collect::<Result<Vec<_>>>()?;
        self.encode_call(&tokens)
    }

    pub fn decode_call(&self, data: &[u8]) -> Result<Vec<Token>> {
        let types = self.input_types()?;
        if data.len() != 4 + WORD * types.len() {
            return Err(SponsorError::Abi(format!(
                "call data for {} must be {} bytes, got {}",
                self.name,
                4 + WORD * types.len(),
                data.len()
            )));
        }
        if data[..4] != self.selector() {
            return Err(SponsorError::Abi(format!("selector mismatch for {}", self.name)));
        }
        types
            .iter()
            .zip(data[4..].chunks(WORD))
            .map(|(kind, word)| Token::decode_word(*kind, word))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSFER_ABI: &str = r#"{
        "constant": false,
        "inputs": [{"name": "to", "type": "address"}, {"name": "amount", "type": "uint256"}],
        "name": "transfer",
        "outputs": [{"name": "", "type": "bool"}],
        "payable": false,
        "stateMutability": "nonpayable",
        "type": "function"
    }"#;

    #[test]
    fn test_transfer_selector() {
        let f = FunctionDescriptor::from_json(TRANSFER_ABI).unwrap();
        assert_eq!(f.signature(), "transfer(address,uint256)");
        assert_eq!(hex::encode(f.selector()), "a9059cbb");
        assert!(f.is_mutating());
    }

    #[test]
    fn test_encode_decode_call() {
        let f = FunctionDescriptor::from_json(TRANSFER_ABI).unwrap();
        let data = f
            .encode_call_str(&["0x91436f1e5008b2e6093e114a25842f060012685d", "0x10"])
            .unwrap();
        assert_eq!(data.len(), 4 + 64);
        assert_eq!(data[4 + 63], 0x10);

        let tokens = f.decode_call(&data).unwrap();
        assert_eq!(
            tokens[0],
            Token::Address("0x91436f1e5008b2e6093e114a25842f060012685d".parse().unwrap())
        );
        assert_eq!(tokens[1], Token::Uint(BigUint::from(16u8)));
    }

    #[test]
    fn test_uint_range_enforced() {
        let f = FunctionDescriptor::from_json(
            r#"{"inputs":[{"name":"x","type":"uint8"}],"name":"f","type":"function"}"#,
        )
        .unwrap();
        assert!(f.encode_call_str(&["255"]).is_ok());
        assert!(f.encode_call_str(&["256"]).is_err());

        let u256 = FunctionDescriptor::from_json(
            r#"{"inputs":[{"name":"x","type":"uint256"}],"name":"f","type":"function"}"#,
        )
        .unwrap();
        let max = format!("0x{}", "ff".repeat(32));
        assert!(u256.encode_call_str(&[&max]).is_ok());
        let over = format!("0x1{}", "00".repeat(32));
        assert!(u256.encode_call_str(&[&over]).is_err());
    }

    #[test]
    fn test_argument_mismatch() {
        let f = FunctionDescriptor::from_json(TRANSFER_ABI).unwrap();
        assert!(f.encode_call(&[Token::Bool(true)]).is_err());
        assert!(f
            .encode_call(&[Token::Bool(true), Token::Uint(BigUint::default())])
            .is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_selector() {
        let f = FunctionDescriptor::from_json(TRANSFER_ABI).unwrap();
        let mut data = f
            .encode_call_str(&["0x91436f1e5008b2e6093e114a25842f060012685d", "1"])
            .unwrap();
        data[0] ^= 0xff;
        assert!(f.decode_call(&data).is_err());
    }

    #[test]
    fn test_rejects_non_function_entries() {
        let event = r#"{"inputs":[],"name":"Transfer","type":"event"}"#;
        assert!(FunctionDescriptor::from_json(event).is_err());
        let bad_type = r#"{"inputs":[{"name":"s","type":"string"}],"name":"f","type":"function"}"#;
        assert!(FunctionDescriptor::from_json(bad_type).is_err());
    }
}
