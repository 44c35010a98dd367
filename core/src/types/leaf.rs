// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Leaf encoding
//!
//! Leaves of the tree are tuples of Solidity values. Before hashing, a leaf is encoded with the
//! standard ABI encoding (`abi.encode(...)`) of its type tags, so that two representations of the
//! same value (e.g. a checksummed and a lowercase address, or `"1"` and `1`) produce the same
//! bytes.

use crate::invalid_value;
use crate::types::error::TypesError;
use crate::types::ADDRESS_BYTES_LEN;
use ethers_core::abi::{self, Token};
use ethers_core::types::{Address, Sign, I256, U256};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Maximum bit size of Solidity integer types.
const MAX_INT_BITS: usize = 256;

/// Maximum size in bytes of Solidity fixed-size byte arrays.
const MAX_FIXED_BYTES: usize = 32;

/// A Solidity type tag describing one field of a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeafType {
    Address,
    Bool,
    /// Unsigned integer with the given bit size.
    Uint(usize),
    /// Signed integer with the given bit size.
    Int(usize),
    /// Fixed-size byte array with the given length.
    FixedBytes(usize),
    Bytes,
    String,
}

impl FromStr for LeafType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unsupported = || TypesError::UnsupportedType(s.to_string());
        let parse_size = |digits: &str| digits.parse::<usize>().map_err(|_| unsupported());

        let tag = s.trim();
        match tag {
            "address" => return Ok(LeafType::Address),
            "bool" => return Ok(LeafType::Bool),
            "bytes" => return Ok(LeafType::Bytes),
            "string" => return Ok(LeafType::String),
            "uint" => return Ok(LeafType::Uint(MAX_INT_BITS)),
            "int" => return Ok(LeafType::Int(MAX_INT_BITS)),
            _ => {}
        }

        if let Some(bits) = tag.strip_prefix("uint") {
            let bits = parse_size(bits)?;
            if bits == 0 || bits > MAX_INT_BITS || bits % 8 != 0 {
                return Err(unsupported());
            }
            Ok(LeafType::Uint(bits))
        } else if let Some(bits) = tag.strip_prefix("int") {
            let bits = parse_size(bits)?;
            if bits == 0 || bits > MAX_INT_BITS || bits % 8 != 0 {
                return Err(unsupported());
            }
            Ok(LeafType::Int(bits))
        } else if let Some(len) = tag.strip_prefix("bytes") {
            let len = parse_size(len)?;
            if len == 0 || len > MAX_FIXED_BYTES {
                return Err(unsupported());
            }
            Ok(LeafType::FixedBytes(len))
        } else {
            Err(unsupported())
        }
    }
}

impl fmt::Display for LeafType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LeafType::Address => write!(f, "address"),
            LeafType::Bool => write!(f, "bool"),
            LeafType::Uint(bits) => write!(f, "uint{}", bits),
            LeafType::Int(bits) => write!(f, "int{}", bits),
            LeafType::FixedBytes(len) => write!(f, "bytes{}", len),
            LeafType::Bytes => write!(f, "bytes"),
            LeafType::String => write!(f, "string"),
        }
    }
}

impl LeafType {
    /// Converts a JSON value into the ABI token of this type.
    ///
    /// # Arguments
    ///
    /// * `value` - The JSON value to convert.
    ///
    /// # Returns
    ///
    /// The ABI token, or a `TypesError` if the value does not fit this type.
    pub fn tokenize(&self, value: &Value) -> Result<Token, TypesError> {
        match self {
            LeafType::Address => {
                let bytes = decode_hex(self, value)?;
                if bytes.len() != ADDRESS_BYTES_LEN {
                    return Err(invalid_value!(
                        self,
                        value,
                        format!("expected {} bytes, got {}", ADDRESS_BYTES_LEN, bytes.len())
                    ));
                }
                Ok(Token::Address(Address::from_slice(&bytes)))
            }
            LeafType::Bool => match value {
                Value::Bool(b) => Ok(Token::Bool(*b)),
                Value::String(s) if s == "true" => Ok(Token::Bool(true)),
                Value::String(s) if s == "false" => Ok(Token::Bool(false)),
                _ => Err(invalid_value!(self, value, "expected a boolean")),
            },
            LeafType::Uint(bits) => {
                let uint = parse_uint(self, value)?;
                if uint.bits() > *bits {
                    return Err(invalid_value!(
                        self,
                        value,
                        format!("does not fit in {} bits", bits)
                    ));
                }
                Ok(Token::Uint(uint))
            }
            LeafType::Int(bits) => {
                let int = parse_int(self, value)?;
                let magnitude = if int.is_negative() {
                    !int.into_raw()
                } else {
                    int.into_raw()
                };
                if magnitude.bits() >= *bits {
                    return Err(invalid_value!(
                        self,
                        value,
                        format!("does not fit in {} bits", bits)
                    ));
                }
                Ok(Token::Int(int.into_raw()))
            }
            LeafType::FixedBytes(len) => {
                let bytes = decode_hex(self, value)?;
                if bytes.len() != *len {
                    return Err(invalid_value!(
                        self,
                        value,
                        format!("expected {} bytes, got {}", len, bytes.len())
                    ));
                }
                Ok(Token::FixedBytes(bytes))
            }
            LeafType::Bytes => Ok(Token::Bytes(decode_hex(self, value)?)),
            LeafType::String => match value {
                Value::String(s) => Ok(Token::String(s.clone())),
                _ => Err(invalid_value!(self, value, "expected a string")),
            },
        }
    }
}

/// Parses a list of type tags.
///
/// # Arguments
///
/// * `tags` - The type tags, e.g. `["address", "uint256"]`.
///
/// # Returns
///
/// The parsed `LeafType`s, in order.
pub fn parse_leaf_types<S: AsRef<str>>(tags: &[S]) -> Result<Vec<LeafType>, TypesError> {
    tags.iter().map(|tag| tag.as_ref().parse()).collect()
}

/// ABI-encodes a leaf according to its type tags, as `abi.encode(values...)` would in Solidity.
///
/// # Arguments
///
/// * `types` - The type tag of each field of the leaf.
/// * `values` - The values of the leaf.
///
/// # Returns
///
/// The encoded bytes, or a `TypesError` if the leaf does not match the type tags.
pub fn encode_leaf(types: &[LeafType], values: &[Value]) -> Result<Vec<u8>, TypesError> {
    if types.len() != values.len() {
        return Err(TypesError::ArityMismatch {
            expected: types.len(),
            actual: values.len(),
        });
    }

    let tokens = types
        .iter()
        .zip(values)
        .map(|(leaf_type, value)| leaf_type.tokenize(value))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(abi::encode(&tokens))
}

fn decode_hex(leaf_type: &LeafType, value: &Value) -> Result<Vec<u8>, TypesError> {
    let Value::String(s) = value else {
        return Err(invalid_value!(leaf_type, value, "expected a hexadecimal string"));
    };
    let stripped = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);

    hex::decode(stripped).map_err(|err| TypesError::InvalidHexadecimal {
        leaf_type: leaf_type.to_string(),
        source: err.into(),
    })
}

/// Integer strings are decimal, or hexadecimal when prefixed with `0x`. Signed values may carry a
/// leading `-` or `+`. A string without any digit is rejected rather than read as zero.
fn has_digits(s: &str) -> bool {
    let unsigned = s
        .strip_prefix('-')
        .or_else(|| s.strip_prefix('+'))
        .unwrap_or(s);
    !unsigned.strip_prefix("0x").unwrap_or(unsigned).is_empty()
}

fn parse_uint(leaf_type: &LeafType, value: &Value) -> Result<U256, TypesError> {
    let invalid = || invalid_value!(leaf_type, value, "expected an unsigned integer");

    match value {
        Value::Number(n) => n.as_u64().map(U256::from).ok_or_else(invalid),
        Value::String(s) if has_digits(s) => match s.strip_prefix("0x") {
            Some(hex_digits) => U256::from_str_radix(hex_digits, 16).map_err(|_| invalid()),
            None => U256::from_dec_str(s).map_err(|_| invalid()),
        },
        _ => Err(invalid()),
    }
}

fn parse_int(leaf_type: &LeafType, value: &Value) -> Result<I256, TypesError> {
    let invalid = || invalid_value!(leaf_type, value, "expected an integer");

    match value {
        Value::Number(n) => n.as_i64().map(I256::from).ok_or_else(invalid),
        Value::String(s) if has_digits(s) => {
            let (sign, unsigned) = match s.strip_prefix('-') {
                Some(unsigned) => (Sign::Negative, unsigned),
                None => (Sign::Positive, s.strip_prefix('+').unwrap_or(s)),
            };
            let abs = match unsigned.strip_prefix("0x") {
                Some(hex_digits) => U256::from_str_radix(hex_digits, 16).ok(),
                None => U256::from_dec_str(unsigned).ok(),
            };
            abs.and_then(|abs| I256::checked_from_sign_and_abs(sign, abs))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}
