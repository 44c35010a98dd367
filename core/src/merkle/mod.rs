// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Merkle Tree
//!
//! This module provides the utilities to commit to an allow-list and to prove membership in it.
//! The tree is a complete binary tree stored as an array of `2n - 1` nodes in heap order: the
//! root sits at index `0` and the children of node `i` at `2i + 1` and `2i + 2`. Leaf hashes are
//! sorted before being laid out, so the root only depends on the set of leaves and not on the
//! order in which they were provided.
//!
//! ## Sub-modules
//!
//! - `error`: This sub-module contains the error types that can be returned by the Merkle Tree
//!   utilities.
//! - `proof`: This sub-module contains the single-leaf `MerkleProof` and the `MultiProof` covering
//!   several leaves at once.
//! - `tree`: This sub-module contains the `StandardMerkleTree`, built over ABI-encoded leaves.
//! - `utils`: This sub-module contains the index arithmetic and the hash-level algorithms shared by
//!   the tree and the proofs.

pub mod error;
pub mod proof;
pub mod tree;
pub mod utils;
