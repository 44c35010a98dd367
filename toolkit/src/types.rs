// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Network types
//!
//! JSON bodies exchanged between the proof server and its clients.

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};
use supply_chain_core::crypto::hash::HashValue;
use supply_chain_core::merkle::proof::MerkleProof;
use supply_chain_core::types::LeafValue;

/// Response of `GET /root`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct RootResponse {
    root: HashValue,
}

impl RootResponse {
    pub const fn new(root: HashValue) -> Self {
        Self { root }
    }
}

/// A leaf of the tree along with its index and inclusion proof. Response of `GET /proof/{address}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
pub struct LeafProof {
    /// The leaf as stored in the tree.
    #[getset(get = "pub")]
    value: LeafValue,
    /// Index of the leaf, in insertion order.
    #[getset(get_copy = "pub")]
    index: usize,
    #[getset(get = "pub")]
    proof: MerkleProof,
}

impl LeafProof {
    pub const fn new(value: LeafValue, index: usize, proof: MerkleProof) -> Self {
        Self {
            value,
            index,
            proof,
        }
    }
}

/// Body of `POST /verify`. The root defaults to the one of the served tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[getset(get = "pub")]
pub struct VerifyRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    root: Option<HashValue>,
    value: LeafValue,
    proof: MerkleProof,
}

impl VerifyRequest {
    pub const fn new(root: Option<HashValue>, value: LeafValue, proof: MerkleProof) -> Self {
        Self { root, value, proof }
    }
}

/// Response of `POST /verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, CopyGetters)]
#[getset(get_copy = "pub")]
pub struct VerifyResponse {
    valid: bool,
}

impl VerifyResponse {
    pub const fn new(valid: bool) -> Self {
        Self { valid }
    }
}
