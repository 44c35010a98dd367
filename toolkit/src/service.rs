// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Proof service
//!
//! A [`ProofService`] owns exactly one tree, loaded once from a dump and never mutated afterwards.
//! It can be shared between threads behind an `Arc`.

use crate::storage::{read_dump, StorageError};
use crate::types::LeafProof;
use log::{debug, info, warn};
use serde_json::Value;
use std::path::Path;
use supply_chain_core::crypto::hash::HashValue;
use supply_chain_core::merkle::error::MerkleError;
use supply_chain_core::merkle::proof::{MerkleProof, MultiProof};
use supply_chain_core::merkle::tree::StandardMerkleTree;
use supply_chain_core::types::dump::TreeDump;
use supply_chain_core::types::LeafValue;
use thiserror::Error;

/// Errors possible while setting up a [`ProofService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Could not read the tree dump: {source}")]
    Storage {
        #[source]
        source: StorageError,
    },
    #[error("Could not load the tree: {source}")]
    Tree {
        #[source]
        source: MerkleError,
    },
}

/// Answers membership queries over one allow-list tree.
#[derive(Debug, Clone)]
pub struct ProofService {
    tree: StandardMerkleTree,
}

impl ProofService {
    /// Loads a dump and checks every node of it.
    ///
    /// # Arguments
    ///
    /// * `dump` - The dump written by the tree builder.
    ///
    /// # Errors
    ///
    /// Returns an error if the dump is not in the `standard-v1` format or if any of its nodes
    /// does not match its content.
    pub fn init(dump: TreeDump) -> Result<Self, MerkleError> {
        let tree = StandardMerkleTree::load(dump)?;
        tree.validate()?;

        info!(
            "Loaded tree with {} leaves, root {}",
            tree.len(),
            tree.root()
        );

        Ok(Self { tree })
    }

    /// Reads a dump from disk and loads it, see [`ProofService::init`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let dump = read_dump(path).map_err(|source| ServiceError::Storage { source })?;
        Self::init(dump).map_err(|source| ServiceError::Tree { source })
    }

    /// Wraps a tree that was just built.
    pub const fn from_tree(tree: StandardMerkleTree) -> Self {
        Self { tree }
    }

    pub const fn tree(&self) -> &StandardMerkleTree {
        &self.tree
    }

    pub fn root(&self) -> HashValue {
        self.tree.root()
    }

    /// Proves the leaf at the given index, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::IndexOutOfRange` if there is no leaf at `index`.
    pub fn prove_index(&self, index: usize) -> Result<LeafProof, MerkleError> {
        let proof = self.tree.get_proof(index)?;
        let value = self
            .tree
            .at(index)
            .ok_or(MerkleError::IndexOutOfRange {
                index,
                len: self.tree.len(),
            })?
            .to_vec();

        Ok(LeafProof::new(value, index, proof))
    }

    /// Proves a leaf given by value.
    ///
    /// When the leaf was inserted several times, the proof of its first occurrence is returned.
    /// Every occurrence shares the same hash, so that proof verifies for all of them.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the leaf is not part of the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the leaf does not match the type tags of the tree.
    pub fn prove_value(&self, leaf: &[Value]) -> Result<Option<LeafProof>, MerkleError> {
        let indices = self.tree.leaf_indices(leaf)?;

        let Some(&index) = indices.first() else {
            debug!("Leaf {:?} is not part of the tree", leaf);
            return Ok(None);
        };
        if indices.len() > 1 {
            warn!(
                "Leaf {:?} appears at indices {:?}, proving the first one",
                leaf, indices
            );
        }

        self.prove_index(index).map(Some)
    }

    /// Proves the membership of an address in a single `address` field allow-list.
    pub fn prove_address(&self, address: &str) -> Result<Option<LeafProof>, MerkleError> {
        self.prove_value(&[Value::String(address.to_string())])
    }

    /// Proves several leaves at once.
    pub fn prove_many(&self, indices: &[usize]) -> Result<MultiProof<LeafValue>, MerkleError> {
        self.tree.get_multi_proof(indices)
    }

    /// Checks a proof for a leaf.
    ///
    /// # Arguments
    ///
    /// * `root` - The root to check against. Defaults to the root of the loaded tree.
    /// * `leaf` - The proven leaf.
    /// * `proof` - The inclusion proof.
    ///
    /// # Returns
    ///
    /// `true` if the proof links the leaf to the root.
    pub fn verify(
        &self,
        root: Option<HashValue>,
        leaf: &[Value],
        proof: &MerkleProof,
    ) -> Result<bool, MerkleError> {
        StandardMerkleTree::verify_proof(
            &root.unwrap_or_else(|| self.root()),
            self.tree.leaf_encoding(),
            leaf,
            proof,
        )
    }
}
