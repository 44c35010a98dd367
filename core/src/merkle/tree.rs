// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Standard Merkle Tree
//!
//! A `StandardMerkleTree` commits to a list of leaves, each leaf being a tuple of Solidity values.
//!
//! - A leaf is hashed as `keccak256(keccak256(abi.encode(values)))`. Hashing twice keeps leaf
//!   hashes out of the domain of internal nodes, whose preimage is always 64 bytes of child
//!   digests, so that an internal node can never be passed off as a leaf.
//! - Leaf hashes are sorted before the tree is built, which makes the root a function of the
//!   multiset of leaves only.
//! - Internal nodes hash their children with [`hash_pair`](crate::crypto::hash::hash_pair).
//!
//! These are the conventions of OpenZeppelin's `MerkleProof.verify`, so roots and proofs can be
//! consumed by a Solidity contract directly.

use crate::crypto::hash::{keccak256, HashValue};
use crate::merkle::error::MerkleError;
use crate::merkle::proof::{MerkleProof, MultiProof};
use crate::merkle::utils::{
    get_multi_proof, get_proof, is_leaf_node, is_valid_merkle_tree, make_merkle_tree,
    process_multi_proof, render_merkle_tree,
};
use crate::types::dump::{DumpValue, TreeDump, STANDARD_DUMP_FORMAT};
use crate::types::leaf::{encode_leaf, parse_leaf_types, LeafType};
use crate::types::LeafValue;
use getset::Getters;
use serde_json::Value;
use std::collections::{HashMap, HashSet};

/// Hashes a leaf according to the given type tags.
///
/// # Arguments
///
/// * `leaf_encoding` - The type tag of each field of the leaf.
/// * `value` - The leaf.
///
/// # Returns
///
/// The double keccak-256 hash of the ABI-encoded leaf.
pub fn standard_leaf_hash(
    leaf_encoding: &[LeafType],
    value: &[Value],
) -> Result<HashValue, MerkleError> {
    let encoded = encode_leaf(leaf_encoding, value)
        .map_err(|err| MerkleError::LeafEncoding { source: err.into() })?;
    Ok(keccak256(keccak256(&encoded).as_ref()))
}

/// A leaf value along with the position of its hash in the node array.
#[derive(Debug, Clone, PartialEq, Eq)]
struct IndexedValue {
    value: LeafValue,
    tree_index: usize,
}

/// Merkle tree over ABI-encoded leaves.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct StandardMerkleTree {
    /// Type tags of the leaf fields.
    #[getset(get = "pub")]
    leaf_encoding: Vec<LeafType>,
    /// Node array, root first.
    #[getset(get = "pub")]
    tree: Vec<HashValue>,
    values: Vec<IndexedValue>,
    /// Maps a leaf hash to the first value carrying it.
    hash_lookup: HashMap<HashValue, usize>,
}

impl StandardMerkleTree {
    /// Builds a tree over the given leaves.
    ///
    /// # Arguments
    ///
    /// * `values` - The leaves, in the order they should be indexed. Duplicates are kept.
    /// * `leaf_encoding` - The type tags of the leaf fields, e.g. `["address"]`.
    ///
    /// # Returns
    ///
    /// The built tree.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::EmptyTree` if there are no leaves, `MerkleError::LeafEncoding` if a
    /// type tag is not supported, and `MerkleError::Validation` naming the first leaf that does
    /// not match the type tags.
    pub fn of<S: AsRef<str>>(
        values: Vec<LeafValue>,
        leaf_encoding: &[S],
    ) -> Result<Self, MerkleError> {
        let leaf_encoding = parse_leaf_types(leaf_encoding)
            .map_err(|err| MerkleError::LeafEncoding { source: err.into() })?;
        Self::from_leaf_types(values, leaf_encoding)
    }

    /// Builds a tree over the given leaves, with already parsed type tags.
    ///
    /// See [`StandardMerkleTree::of`].
    pub fn from_leaf_types(
        values: Vec<LeafValue>,
        leaf_encoding: Vec<LeafType>,
    ) -> Result<Self, MerkleError> {
        if values.is_empty() {
            return Err(MerkleError::EmptyTree);
        }

        let mut hashed_values = values
            .iter()
            .enumerate()
            .map(|(index, value)| {
                let encoded = encode_leaf(&leaf_encoding, value)
                    .map_err(|err| MerkleError::Validation {
                        index,
                        source: err.into(),
                    })?;
                Ok((keccak256(keccak256(&encoded).as_ref()), index))
            })
            .collect::<Result<Vec<_>, MerkleError>>()?;

        // Ties between duplicated leaves are broken by insertion order to keep the layout stable.
        hashed_values.sort();

        let leaves: Vec<HashValue> = hashed_values.iter().map(|(hash, _)| *hash).collect();
        let tree = make_merkle_tree(&leaves)?;

        let mut tree_indices = vec![0; values.len()];
        for (leaf_index, (_, value_index)) in hashed_values.iter().enumerate() {
            tree_indices[*value_index] = tree.len() - 1 - leaf_index;
        }

        let values = values
            .into_iter()
            .zip(tree_indices)
            .map(|(value, tree_index)| IndexedValue { value, tree_index })
            .collect();

        Ok(Self::assemble(leaf_encoding, tree, values))
    }

    /// Reconstructs a tree from its dump, without rehashing the leaves.
    ///
    /// Only the shape of the dump is checked here. Use [`StandardMerkleTree::validate`] to check
    /// every hash.
    ///
    /// # Arguments
    ///
    /// * `dump` - The dump to load.
    ///
    /// # Returns
    ///
    /// The loaded tree.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::UnsupportedFormat` for dumps of another format, and
    /// `MerkleError::InvalidTree` when the node array and the values do not describe a tree.
    pub fn load(dump: TreeDump) -> Result<Self, MerkleError> {
        if dump.format() != STANDARD_DUMP_FORMAT {
            return Err(MerkleError::UnsupportedFormat {
                expected: STANDARD_DUMP_FORMAT.into(),
                actual: dump.format().clone(),
            });
        }

        let leaf_encoding = parse_leaf_types(dump.leaf_encoding())
            .map_err(|err| MerkleError::LeafEncoding { source: err.into() })?;

        let tree = dump.tree().clone();
        if dump.values().is_empty() {
            return Err(MerkleError::InvalidTree {
                reason: "dump holds no values".into(),
            });
        }
        if tree.len() != 2 * dump.values().len() - 1 {
            return Err(MerkleError::InvalidTree {
                reason: format!(
                    "expected {} nodes for {} values, got {}",
                    2 * dump.values().len() - 1,
                    dump.values().len(),
                    tree.len()
                ),
            });
        }

        let mut seen = HashSet::with_capacity(dump.values().len());
        let values = dump
            .values()
            .iter()
            .map(|value| {
                let tree_index = value.tree_index();
                if !is_leaf_node(tree.len(), tree_index) {
                    return Err(MerkleError::InvalidTree {
                        reason: format!("value points to node {} which is not a leaf", tree_index),
                    });
                }
                if !seen.insert(tree_index) {
                    return Err(MerkleError::InvalidTree {
                        reason: format!("node {} is shared by several values", tree_index),
                    });
                }
                if value.value().len() != leaf_encoding.len() {
                    return Err(MerkleError::InvalidTree {
                        reason: format!(
                            "value at node {} has {} fields, expected {}",
                            tree_index,
                            value.value().len(),
                            leaf_encoding.len()
                        ),
                    });
                }
                Ok(IndexedValue {
                    value: value.value().clone(),
                    tree_index,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::assemble(leaf_encoding, tree, values))
    }

    fn assemble(
        leaf_encoding: Vec<LeafType>,
        tree: Vec<HashValue>,
        values: Vec<IndexedValue>,
    ) -> Self {
        let mut hash_lookup = HashMap::with_capacity(values.len());
        for (value_index, value) in values.iter().enumerate() {
            hash_lookup
                .entry(tree[value.tree_index])
                .or_insert(value_index);
        }

        Self {
            leaf_encoding,
            tree,
            values,
            hash_lookup,
        }
    }

    /// Produces the serializable snapshot of the tree.
    pub fn dump(&self) -> TreeDump {
        TreeDump::new(
            STANDARD_DUMP_FORMAT,
            self.leaf_encoding.iter().map(ToString::to_string).collect(),
            self.tree.clone(),
            self.values
                .iter()
                .map(|value| DumpValue::new(value.value.clone(), value.tree_index))
                .collect(),
        )
    }

    /// The root of the tree.
    pub fn root(&self) -> HashValue {
        self.tree[0]
    }

    /// Number of leaves in the tree.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always `false`: a tree holds at least one leaf.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the leaf at the given index, in insertion order.
    pub fn at(&self, index: usize) -> Option<&[Value]> {
        self.values.get(index).map(|value| value.value.as_slice())
    }

    /// Iterates over the leaves along with their index, in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, &[Value])> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(index, value)| (index, value.value.as_slice()))
    }

    /// Hashes a leaf with the type tags of this tree.
    pub fn leaf_hash(&self, leaf: &[Value]) -> Result<HashValue, MerkleError> {
        standard_leaf_hash(&self.leaf_encoding, leaf)
    }

    /// Finds the index of a leaf.
    ///
    /// Leaves are compared on their encoding, so representation differences such as address case
    /// do not matter. When the leaf was inserted several times, the index of its first occurrence
    /// is returned.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the leaf is not part of the tree, and an error when it does not match the
    /// type tags of the tree.
    pub fn leaf_lookup(&self, leaf: &[Value]) -> Result<Option<usize>, MerkleError> {
        let hash = self.leaf_hash(leaf)?;
        Ok(self.hash_lookup.get(&hash).copied())
    }

    /// Finds every index at which a leaf was inserted, in increasing order.
    pub fn leaf_indices(&self, leaf: &[Value]) -> Result<Vec<usize>, MerkleError> {
        let hash = self.leaf_hash(leaf)?;
        Ok(self
            .values
            .iter()
            .enumerate()
            .filter(|(_, value)| self.tree[value.tree_index] == hash)
            .map(|(index, _)| index)
            .collect())
    }

    fn tree_index(&self, index: usize) -> Result<usize, MerkleError> {
        self.values
            .get(index)
            .map(|value| value.tree_index)
            .ok_or(MerkleError::IndexOutOfRange {
                index,
                len: self.values.len(),
            })
    }

    /// Builds the inclusion proof of the leaf at the given index.
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the leaf, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::IndexOutOfRange` if there is no leaf at `index`.
    pub fn get_proof(&self, index: usize) -> Result<MerkleProof, MerkleError> {
        let tree_index = self.tree_index(index)?;
        get_proof(&self.tree, tree_index).map(MerkleProof::new)
    }

    /// Builds the inclusion proof of a leaf given by value.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the leaf is not part of the tree.
    pub fn get_proof_for_value(&self, leaf: &[Value]) -> Result<Option<MerkleProof>, MerkleError> {
        match self.leaf_lookup(leaf)? {
            Some(index) => self.get_proof(index).map(Some),
            None => Ok(None),
        }
    }

    /// Builds a multi-proof for the leaves at the given indices.
    ///
    /// # Arguments
    ///
    /// * `indices` - The indices of the leaves, in insertion order. Must not contain duplicates.
    ///
    /// # Returns
    ///
    /// A multi-proof carrying the leaf values, in the order expected by the verifier.
    pub fn get_multi_proof(&self, indices: &[usize]) -> Result<MultiProof<LeafValue>, MerkleError> {
        let tree_indices = indices
            .iter()
            .map(|&index| self.tree_index(index))
            .collect::<Result<Vec<_>, _>>()?;
        let multi_proof = get_multi_proof(&self.tree, &tree_indices)?;

        // The proof lists its leaves from the highest node index to the lowest.
        let mut sorted = tree_indices;
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        let leaves = sorted
            .into_iter()
            .map(|tree_index| self.value_at_tree_index(tree_index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(multi_proof.with_leaves(leaves))
    }

    fn value_at_tree_index(&self, tree_index: usize) -> Result<LeafValue, MerkleError> {
        self.values
            .iter()
            .find(|value| value.tree_index == tree_index)
            .map(|value| value.value.clone())
            .ok_or(MerkleError::NotALeaf(tree_index))
    }

    /// Checks a proof for the leaf at the given index against the root of this tree.
    pub fn verify(&self, index: usize, proof: &MerkleProof) -> Result<bool, MerkleError> {
        let tree_index = self.tree_index(index)?;
        Ok(proof.verify(&self.root(), &self.tree[tree_index]))
    }

    /// Checks a proof for a leaf given by value against the root of this tree.
    pub fn verify_leaf(&self, leaf: &[Value], proof: &MerkleProof) -> Result<bool, MerkleError> {
        Self::verify_proof(&self.root(), &self.leaf_encoding, leaf, proof)
    }

    /// Checks a proof for a leaf against a root, without the tree at hand.
    ///
    /// # Arguments
    ///
    /// * `root` - The published root.
    /// * `leaf_encoding` - The type tags of the leaf fields.
    /// * `leaf` - The leaf to check.
    /// * `proof` - The inclusion proof of the leaf.
    ///
    /// # Returns
    ///
    /// `true` if the proof links the leaf to `root`.
    pub fn verify_proof(
        root: &HashValue,
        leaf_encoding: &[LeafType],
        leaf: &[Value],
        proof: &MerkleProof,
    ) -> Result<bool, MerkleError> {
        let leaf_hash = standard_leaf_hash(leaf_encoding, leaf)?;
        Ok(proof.verify(root, &leaf_hash))
    }

    /// Checks a multi-proof against the root of this tree.
    pub fn verify_multi_proof(
        &self,
        multi_proof: &MultiProof<LeafValue>,
    ) -> Result<bool, MerkleError> {
        Self::verify_multi_proof_with_root(&self.root(), &self.leaf_encoding, multi_proof)
    }

    /// Checks a multi-proof against a root, without the tree at hand.
    pub fn verify_multi_proof_with_root(
        root: &HashValue,
        leaf_encoding: &[LeafType],
        multi_proof: &MultiProof<LeafValue>,
    ) -> Result<bool, MerkleError> {
        let leaves = multi_proof
            .leaves()
            .iter()
            .map(|leaf| standard_leaf_hash(leaf_encoding, leaf))
            .collect::<Result<Vec<_>, _>>()?;
        let hashed = multi_proof.clone().with_leaves(leaves);

        Ok(process_multi_proof(&hashed)? == *root)
    }

    /// Rehashes every leaf and every internal node and checks them against the node array.
    ///
    /// # Errors
    ///
    /// Returns `MerkleError::InvalidTree` naming the first inconsistency found.
    pub fn validate(&self) -> Result<(), MerkleError> {
        for (index, value) in self.values.iter().enumerate() {
            let hash = standard_leaf_hash(&self.leaf_encoding, &value.value).map_err(|err| {
                MerkleError::Validation {
                    index,
                    source: err.into(),
                }
            })?;
            if hash != self.tree[value.tree_index] {
                return Err(MerkleError::InvalidTree {
                    reason: format!(
                        "leaf {} does not hash to node {}",
                        index, value.tree_index
                    ),
                });
            }
        }

        if !is_valid_merkle_tree(&self.tree) {
            return Err(MerkleError::InvalidTree {
                reason: "internal nodes do not match their children".into(),
            });
        }

        Ok(())
    }

    /// Renders the node array as an indented tree.
    pub fn render(&self) -> String {
        render_merkle_tree(&self.tree)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::str::FromStr;

    const ALLOWLIST: [&str; 5] = [
        "0x6CA6d1e2D5347Bfab1d91e883F1915560e09129D",
        "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266",
        "0x70997970C51812dc3A010C7d01b50e0d17dc79C8",
        "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC",
        "0x90F79bf6EB2c4f870365E785982E1f101E93b906",
    ];

    const ALLOWLIST_ROOT: &str =
        "0xd7c266b39bce7003ef91fd9187b926a19abc1aee7ff0499974436876b52f71e6";

    fn leaves(addresses: &[&str]) -> Vec<LeafValue> {
        addresses.iter().map(|address| vec![json!(address)]).collect()
    }

    fn allowlist_tree() -> StandardMerkleTree {
        StandardMerkleTree::of(leaves(&ALLOWLIST), &["address"]).unwrap()
    }

    #[test]
    fn test_reference_vector() {
        // Root published for this input by the `@openzeppelin/merkle-tree` package.
        let values = vec![
            vec![
                json!("0x1111111111111111111111111111111111111111"),
                json!("5000000000000000000"),
            ],
            vec![
                json!("0x2222222222222222222222222222222222222222"),
                json!("2500000000000000000"),
            ],
        ];
        let tree = StandardMerkleTree::of(values, &["address", "uint256"]).unwrap();

        assert_eq!(
            tree.root().to_hex(),
            "0xd4dee0beab2d53f2cc83e567171bd2820e49898130a22622b10ead383e90bd77"
        );
    }

    #[test]
    fn test_allowlist_layout() {
        let tree = allowlist_tree();

        assert_eq!(tree.root().to_hex(), ALLOWLIST_ROOT);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.tree().len(), 9);

        let tree_indices: Vec<_> = tree
            .dump()
            .values()
            .iter()
            .map(DumpValue::tree_index)
            .collect();
        assert_eq!(tree_indices, vec![4, 5, 8, 6, 7]);

        let proof = tree.get_proof(0).unwrap();
        assert_eq!(
            proof.to_hex_strings(),
            vec![
                "0x166a633689f07198f116bd599dbcfafd186431540ba501bc90f55692742b0374",
                "0xe3e347f8d89dba0c928b134cfe6492b90cbb217bee7e19c72413681678e22422",
            ]
        );
        assert_eq!(tree.get_proof(2).unwrap().len(), 3);
    }

    #[test]
    fn test_every_leaf_verifies() {
        let tree = allowlist_tree();

        for (index, leaf) in tree.entries() {
            let proof = tree.get_proof_for_value(leaf).unwrap().unwrap();
            assert_eq!(proof, tree.get_proof(index).unwrap());
            assert!(tree.verify(index, &proof).unwrap());
            assert!(StandardMerkleTree::verify_proof(
                &tree.root(),
                tree.leaf_encoding(),
                leaf,
                &proof
            )
            .unwrap());
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let tree = allowlist_tree();
        let leaf = tree.at(2).unwrap().to_vec();
        let proof = tree.get_proof(2).unwrap();

        for sibling in 0..proof.len() {
            for byte in 0..32 {
                let mut siblings = proof.siblings().clone();
                let mut bytes = siblings[sibling].hash();
                bytes[byte] ^= 0x01;
                siblings[sibling] = HashValue::new(bytes);

                assert!(!tree.verify_leaf(&leaf, &MerkleProof::new(siblings)).unwrap());
            }
        }

        let mut reordered = proof.siblings().clone();
        reordered.reverse();
        assert!(!tree.verify_leaf(&leaf, &MerkleProof::new(reordered)).unwrap());

        let mut truncated = proof.siblings().clone();
        truncated.pop();
        assert!(!tree.verify_leaf(&leaf, &MerkleProof::new(truncated)).unwrap());
    }

    #[test]
    fn test_substituted_leaf_fails() {
        let tree = allowlist_tree();
        let proof = tree.get_proof(2).unwrap();

        for (index, leaf) in tree.entries() {
            if index != 2 {
                assert!(!tree.verify_leaf(leaf, &proof).unwrap());
            }
        }
        let outsider = [json!("0x5B38Da6a701c568545dCfcB03FcB875f56beddC4")];
        assert!(!tree.verify_leaf(&outsider, &proof).unwrap());
    }

    #[test]
    fn test_replaced_member_changes_root() {
        let original = allowlist_tree();
        let c = original.at(2).unwrap().to_vec();
        let proof = original.get_proof_for_value(&c).unwrap().unwrap();

        let mut replaced = ALLOWLIST;
        replaced[2] = "0x5B38Da6a701c568545dCfcB03FcB875f56beddC4";
        let other = StandardMerkleTree::of(leaves(&replaced), &["address"]).unwrap();

        let encoding = original.leaf_encoding();
        assert!(StandardMerkleTree::verify_proof(&original.root(), encoding, &c, &proof).unwrap());
        assert_ne!(original.root(), other.root());
        assert!(!StandardMerkleTree::verify_proof(&other.root(), encoding, &c, &proof).unwrap());
    }

    #[test]
    fn test_lookup() {
        let tree = allowlist_tree();

        // Lookups compare encodings, so the address case does not matter.
        let lowercase = [json!(ALLOWLIST[1].to_lowercase())];
        assert_eq!(tree.leaf_lookup(&lowercase).unwrap(), Some(1));

        let outsider = [json!("0x4B20993Bc481177ec7E8f571ceCaE8A9e22C02db")];
        assert_eq!(tree.leaf_lookup(&outsider).unwrap(), None);
        assert!(tree.get_proof_for_value(&outsider).unwrap().is_none());

        assert!(matches!(
            tree.get_proof_for_value(&[json!("not an address")]),
            Err(MerkleError::LeafEncoding { .. })
        ));
        assert!(matches!(
            tree.leaf_lookup(&[]),
            Err(MerkleError::LeafEncoding { .. })
        ));
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            StandardMerkleTree::of(vec![], &["address"]),
            Err(MerkleError::EmptyTree)
        ));

        let mut values = leaves(&ALLOWLIST);
        values[3] = vec![json!(ALLOWLIST[3]), json!(1)];
        assert!(matches!(
            StandardMerkleTree::of(values, &["address"]),
            Err(MerkleError::Validation { index: 3, .. })
        ));

        assert!(matches!(
            StandardMerkleTree::of(leaves(&ALLOWLIST), &["address[]"]),
            Err(MerkleError::LeafEncoding { .. })
        ));

        let tree = allowlist_tree();
        assert!(matches!(
            tree.get_proof(tree.len()),
            Err(MerkleError::IndexOutOfRange { index: 5, len: 5 })
        ));
    }

    #[test]
    fn test_duplicated_leaves() {
        let values = leaves(&[ALLOWLIST[0], ALLOWLIST[1], ALLOWLIST[0]]);
        let tree = StandardMerkleTree::of(values, &["address"]).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.tree().len(), 5);

        let leaf = [json!(ALLOWLIST[0])];
        assert_eq!(tree.leaf_lookup(&leaf).unwrap(), Some(0));
        assert_eq!(tree.leaf_indices(&leaf).unwrap(), vec![0, 2]);

        for index in [0, 2] {
            let proof = tree.get_proof(index).unwrap();
            assert!(tree.verify_leaf(&leaf, &proof).unwrap());
        }
        tree.validate().unwrap();
    }

    #[test]
    fn test_dump_round_trip() {
        let tree = allowlist_tree();
        let json = tree.dump().to_json().unwrap();
        let loaded = StandardMerkleTree::load(TreeDump::from_json(&json).unwrap()).unwrap();

        assert_eq!(loaded, tree);
        assert_eq!(loaded.root(), tree.root());
        for index in 0..tree.len() {
            assert_eq!(loaded.get_proof(index).unwrap(), tree.get_proof(index).unwrap());
        }
        loaded.validate().unwrap();
    }

    #[test]
    fn test_load_rejects_other_formats() {
        let mut dump = serde_json::to_value(allowlist_tree().dump()).unwrap();
        dump["format"] = json!("standard-v2");

        let dump: TreeDump = serde_json::from_value(dump).unwrap();
        assert!(matches!(
            StandardMerkleTree::load(dump),
            Err(MerkleError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_load_rejects_malformed_dumps() {
        let dump = serde_json::to_value(allowlist_tree().dump()).unwrap();

        let mut missing_node = dump.clone();
        missing_node["tree"].as_array_mut().unwrap().pop();

        let mut internal_index = dump.clone();
        internal_index["values"][0]["treeIndex"] = json!(1);

        let mut shared_index = dump.clone();
        shared_index["values"][1]["treeIndex"] = json!(4);

        let mut no_values = dump;
        no_values["values"] = json!([]);
        no_values["tree"] = json!([]);

        for malformed in [missing_node, internal_index, shared_index, no_values] {
            let dump: TreeDump = serde_json::from_value(malformed).unwrap();
            assert!(matches!(
                StandardMerkleTree::load(dump),
                Err(MerkleError::InvalidTree { .. })
            ));
        }
    }

    #[test]
    fn test_validate_detects_tampering() {
        let dump = serde_json::to_value(allowlist_tree().dump()).unwrap();

        let mut forged_node = dump.clone();
        forged_node["tree"][1] = json!(HashValue::new([0xab; 32]).to_hex());

        let mut swapped_value = dump;
        swapped_value["values"][0]["value"][0] =
            json!("0x5B38Da6a701c568545dCfcB03FcB875f56beddC4");

        for tampered in [forged_node, swapped_value] {
            let tree = StandardMerkleTree::load(serde_json::from_value(tampered).unwrap()).unwrap();
            assert!(matches!(
                tree.validate(),
                Err(MerkleError::InvalidTree { .. })
            ));
        }
    }

    #[test]
    fn test_multi_proof() {
        let tree = allowlist_tree();

        let multi_proof = tree.get_multi_proof(&[0, 2, 3]).unwrap();
        assert_eq!(multi_proof.leaves().len(), 3);
        assert!(tree.verify_multi_proof(&multi_proof).unwrap());

        // Leaves come out ordered by decreasing node index: 8, 6 then 4.
        assert_eq!(multi_proof.leaves()[0], tree.at(2).unwrap().to_vec());
        assert_eq!(multi_proof.leaves()[1], tree.at(3).unwrap().to_vec());
        assert_eq!(multi_proof.leaves()[2], tree.at(0).unwrap().to_vec());

        let json = serde_json::to_value(&multi_proof).unwrap();
        assert!(json.get("proofFlags").is_some());

        let mut leaves = multi_proof.leaves().clone();
        leaves[1] = vec![json!("0x5B38Da6a701c568545dCfcB03FcB875f56beddC4")];
        let forged = multi_proof.clone().with_leaves(leaves);
        assert!(!tree.verify_multi_proof(&forged).unwrap());

        assert!(matches!(
            tree.get_multi_proof(&[1, 1]),
            Err(MerkleError::InvalidMultiProof { .. })
        ));
        assert!(matches!(
            tree.get_multi_proof(&[7]),
            Err(MerkleError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn test_render() {
        let tree = allowlist_tree();
        let rendered = tree.render();

        assert_eq!(rendered.lines().count(), 9);
        assert_eq!(
            rendered.lines().next().unwrap(),
            format!("0) {}", HashValue::from_str(ALLOWLIST_ROOT).unwrap())
        );
    }

    /// A list of addresses together with a permutation of it.
    fn addresses_and_permutation() -> impl Strategy<Value = (Vec<[u8; 20]>, Vec<[u8; 20]>)> {
        proptest::collection::vec(any::<[u8; 20]>(), 1..24)
            .prop_flat_map(|addresses| (Just(addresses.clone()), Just(addresses).prop_shuffle()))
    }

    proptest! {
        #[test]
        fn test_root_independent_of_order((addresses, shuffled) in addresses_and_permutation()) {
            let to_leaves = |addresses: &[[u8; 20]]| -> Vec<LeafValue> {
                addresses
                    .iter()
                    .map(|address| vec![json!(format!("0x{}", hex::encode(address)))])
                    .collect()
            };
            let tree = StandardMerkleTree::of(to_leaves(&addresses), &["address"]).unwrap();
            let permuted = StandardMerkleTree::of(to_leaves(&shuffled), &["address"]).unwrap();

            prop_assert_eq!(tree.root(), permuted.root());
            for (index, leaf) in permuted.entries() {
                let proof = permuted.get_proof(index).unwrap();
                prop_assert!(tree.verify_leaf(leaf, &proof).unwrap());
            }
        }
    }
}
