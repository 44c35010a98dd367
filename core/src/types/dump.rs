// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Tree dump
//!
//! The dump is the persisted form of a `StandardMerkleTree`. It carries every node of the tree so
//! that a proof service can answer queries without rebuilding the tree, and it is versioned through
//! its `format` field. The layout is the one used by the `@openzeppelin/merkle-tree` JavaScript
//! package, so dumps produced by either tool can be read by the other.

use crate::crypto::hash::HashValue;
use crate::types::LeafValue;
use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

/// Format identifier of the dumps produced by this crate.
pub const STANDARD_DUMP_FORMAT: &str = "standard-v1";

/// A leaf value along with the position of its hash in the node array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, CopyGetters)]
#[serde(rename_all = "camelCase")]
pub struct DumpValue {
    #[getset(get = "pub")]
    value: LeafValue,
    #[getset(get_copy = "pub")]
    tree_index: usize,
}

impl DumpValue {
    pub const fn new(value: LeafValue, tree_index: usize) -> Self {
        Self { value, tree_index }
    }
}

/// Serializable snapshot of a tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(rename_all = "camelCase")]
#[getset(get = "pub")]
pub struct TreeDump {
    /// Version of the tree layout, see [`STANDARD_DUMP_FORMAT`].
    format: String,
    /// Type tags of the leaf fields.
    leaf_encoding: Vec<String>,
    /// Node array, root first.
    tree: Vec<HashValue>,
    /// Leaf values in insertion order.
    values: Vec<DumpValue>,
}

impl TreeDump {
    pub fn new(
        format: impl Into<String>,
        leaf_encoding: Vec<String>,
        tree: Vec<HashValue>,
        values: Vec<DumpValue>,
    ) -> Self {
        Self {
            format: format.into(),
            leaf_encoding,
            tree,
            values,
        }
    }

    /// Parses a dump from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Renders the dump as JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
