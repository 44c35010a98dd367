// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Crypto Hash Module
//!
//! This module provides the keccak-256 primitives used to build the allow-list tree.
//!
//! ## Usage
//!
//! Every digest manipulated by the crate is a `HashValue`. Leaves are hashed twice with
//! [`keccak256`] over their ABI encoding, and internal nodes are hashed with [`hash_pair`], which
//! orders its two children before hashing them. This is the convention expected by the
//! `MerkleProof` library of OpenZeppelin, so that roots and proofs produced here can be checked
//! on-chain as-is.

use anyhow::{anyhow, Result};
use getset::CopyGetters;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use tiny_keccak::{Hasher, Keccak};

/// Length in bytes of a given `HashValue`.
pub const HASH_LENGTH: usize = 32;

/// Computes the keccak-256 digest of the given data.
///
/// # Arguments
///
/// * `data` - A byte slice to be hashed.
///
/// # Returns
///
/// A `HashValue` holding the digest.
pub fn keccak256(data: &[u8]) -> HashValue {
    keccak256_concat(&[data])
}

/// Computes the keccak-256 digest of the concatenation of the given byte slices.
///
/// # Arguments
///
/// * `data` - The byte slices to be hashed, in order.
///
/// # Returns
///
/// A `HashValue` holding the digest.
pub fn keccak256_concat(data: &[&[u8]]) -> HashValue {
    let mut hasher = Keccak::v256();
    for d in data {
        hasher.update(d);
    }
    let mut output = [0u8; HASH_LENGTH];
    hasher.finalize(&mut output);
    HashValue::new(output)
}

/// Hashes two sibling nodes into their parent. The smaller of the two digests (compared as
/// big-endian byte strings) is hashed first, which makes the parent independent of the order of
/// its children.
///
/// # Arguments
///
/// * `a` - One of the children.
/// * `b` - The other child.
///
/// # Returns
///
/// The digest of the parent node.
pub fn hash_pair(a: &HashValue, b: &HashValue) -> HashValue {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    keccak256_concat(&[first.as_ref(), second.as_ref()])
}

/// A structure representing a hash value.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, CopyGetters, Hash)]
pub struct HashValue {
    #[getset(get_copy = "pub")]
    hash: [u8; HASH_LENGTH],
}

impl HashValue {
    /// Creates a new `HashValue` from a given hash.
    ///
    /// # Arguments
    ///
    /// * `hash` - A byte array of length `HASH_LENGTH` representing the hash value.
    ///
    /// # Returns
    ///
    /// A new `HashValue` instance.
    pub const fn new(hash: [u8; HASH_LENGTH]) -> Self {
        HashValue { hash }
    }

    /// Creates a `HashValue` from a slice (e.g., retrieved from storage).
    ///
    /// # Arguments
    ///
    /// * `bytes` - A byte slice from which to create the `HashValue`.
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok` if the `HashValue` could be created successfully. If the slice has an invalid length,
    /// the `Result` is `Err` with an error message.
    pub fn from_slice<T: AsRef<[u8]>>(bytes: T) -> Result<Self> {
        <[u8; HASH_LENGTH]>::try_from(bytes.as_ref())
            .map_err(|e| anyhow!("Invalid length: {}", e))
            .map(Self::new)
    }

    /// Renders the `HashValue` as a `0x`-prefixed lowercase hexadecimal string.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.hash))
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.hash
    }
}

impl From<[u8; HASH_LENGTH]> for HashValue {
    fn from(hash: [u8; HASH_LENGTH]) -> Self {
        HashValue::new(hash)
    }
}

impl fmt::LowerHex for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            write!(f, "0x")?;
        }
        for byte in &self.hash {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

impl FromStr for HashValue {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped).map_err(|e| anyhow!("Invalid hexadecimal: {}", e))?;
        Self::from_slice(bytes)
    }
}

impl Serialize for HashValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        HashValue::from_str(&s).map_err(de::Error::custom)
    }
}
