// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors possible while building, loading or querying a Merkle tree.
#[derive(Debug, Error)]
pub enum MerkleError {
    #[error("Cannot build a Merkle tree without leaves")]
    EmptyTree,
    #[error("Invalid leaf at index {index}: {source}")]
    Validation {
        index: usize,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Invalid leaf encoding: {source}")]
    LeafEncoding {
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Leaf not found in tree: {value}")]
    NotFound { value: String },
    #[error("Index out of range: got {index}, tree holds {len} leaves")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("Node {0} is not a leaf of the tree")]
    NotALeaf(usize),
    #[error("Unsupported tree format. Expected \"{expected}\", got \"{actual}\"")]
    UnsupportedFormat { expected: String, actual: String },
    #[error("Invalid tree: {reason}")]
    InvalidTree { reason: String },
    #[error("Invalid multi-proof: {reason}")]
    InvalidMultiProof { reason: String },
}
