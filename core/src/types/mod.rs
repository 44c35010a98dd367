// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Types Module
//!
//! This module provides the data structures describing what goes into the allow-list tree and how
//! the tree is persisted between runs.
//!
//! ## Sub-modules
//!
//! - `leaf`: This sub-module contains the `LeafType` type tags and the ABI encoding of leaf values.
//! - `dump`: This sub-module contains the `TreeDump` structure written by the builder and read back
//!   by the proof service.
//! - `error`: This sub-module contains the `TypesError` error type.
//!
//! For more detailed information, users should refer to the specific
//! documentation for each sub-module.

pub mod dump;
pub mod error;
pub mod leaf;

/// Length in bytes for an Ethereum address.
pub const ADDRESS_BYTES_LEN: usize = 20;

/// A leaf of the tree: an ordered tuple of JSON values, one per type tag of the tree.
pub type LeafValue = Vec<serde_json::Value>;
