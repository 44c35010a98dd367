// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use crate::crypto::hash::{hash_pair, HashValue};
use getset::Getters;
use serde::{Deserialize, Serialize};

/// Inclusion proof of a single leaf.
///
/// Siblings are ordered from the leaf level to the level right below the root. The proof serializes
/// as a plain list of hexadecimal digests, which is what on-chain verifiers take as input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(transparent)]
pub struct MerkleProof {
    #[getset(get = "pub")]
    siblings: Vec<HashValue>,
}

impl MerkleProof {
    pub const fn new(siblings: Vec<HashValue>) -> Self {
        Self { siblings }
    }

    pub fn len(&self) -> usize {
        self.siblings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.siblings.is_empty()
    }

    /// Recomputes the root of the tree from a leaf hash by folding the siblings with
    /// [`hash_pair`].
    ///
    /// # Arguments
    ///
    /// * `leaf_hash` - The hash of the proven leaf.
    ///
    /// # Returns
    ///
    /// The reconstructed root.
    pub fn compute_root(&self, leaf_hash: &HashValue) -> HashValue {
        self.siblings
            .iter()
            .fold(*leaf_hash, |acc, sibling| hash_pair(&acc, sibling))
    }

    /// Checks that the proof links `leaf_hash` to `root`.
    ///
    /// # Arguments
    ///
    /// * `root` - The expected root of the tree.
    /// * `leaf_hash` - The hash of the proven leaf.
    ///
    /// # Returns
    ///
    /// `true` if the reconstructed root is exactly `root`.
    pub fn verify(&self, root: &HashValue, leaf_hash: &HashValue) -> bool {
        self.compute_root(leaf_hash) == *root
    }

    /// Returns the siblings as `0x`-prefixed hexadecimal strings.
    pub fn to_hex_strings(&self) -> Vec<String> {
        self.siblings.iter().map(HashValue::to_hex).collect()
    }
}

/// Proof of inclusion of several leaves at once.
///
/// The root is rebuilt by consuming `proof_flags` in order: each flag combines the next pending
/// hash with either another pending hash (`true`) or the next hash of `proof` (`false`). `leaves`
/// must be given in the order produced by the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
#[getset(get = "pub")]
pub struct MultiProof<T> {
    leaves: Vec<T>,
    proof: Vec<HashValue>,
    proof_flags: Vec<bool>,
}

impl<T> MultiProof<T> {
    pub const fn new(leaves: Vec<T>, proof: Vec<HashValue>, proof_flags: Vec<bool>) -> Self {
        Self {
            leaves,
            proof,
            proof_flags,
        }
    }

    /// Replaces the leaves of the proof, keeping its hashes and flags.
    pub fn with_leaves<U>(self, leaves: Vec<U>) -> MultiProof<U> {
        MultiProof {
            leaves,
            proof: self.proof,
            proof_flags: self.proof_flags,
        }
    }
}
