// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! Hash-level algorithms over the heap-ordered node array.
//!
//! A tree over `n` leaves is an array of `2n - 1` digests. The root is at index `0`, the children
//! of node `i` are at `2i + 1` and `2i + 2`, and the leaves occupy the last `n` slots. Because the
//! array describes a complete binary tree there is no odd-node rule: when a level has an odd
//! number of nodes, the last leaf simply sits one level higher than the others.

use crate::crypto::hash::{hash_pair, HashValue};
use crate::merkle::error::MerkleError;
use crate::merkle::proof::MultiProof;
use std::collections::VecDeque;

/// Index of the left child of a node.
pub const fn left_child_index(index: usize) -> usize {
    2 * index + 1
}

/// Index of the right child of a node.
pub const fn right_child_index(index: usize) -> usize {
    2 * index + 2
}

/// Index of the parent of a node. Must not be called on the root.
pub const fn parent_index(index: usize) -> usize {
    (index - 1) / 2
}

/// Index of the sibling of a node. Must not be called on the root.
pub const fn sibling_index(index: usize) -> usize {
    if index % 2 == 1 {
        index + 1
    } else {
        index - 1
    }
}

/// Returns `true` if `index` is a leaf slot of a tree holding `tree_len` nodes.
pub const fn is_leaf_node(tree_len: usize, index: usize) -> bool {
    index < tree_len && left_child_index(index) >= tree_len
}

fn check_leaf_node(tree: &[HashValue], index: usize) -> Result<(), MerkleError> {
    if is_leaf_node(tree.len(), index) {
        Ok(())
    } else {
        Err(MerkleError::NotALeaf(index))
    }
}

/// Builds the node array of a tree over the given leaf hashes.
///
/// Leaves are laid out in reverse order at the end of the array, so `leaves[0]` lands at the last
/// slot.
///
/// # Arguments
///
/// * `leaves` - The leaf hashes, already sorted by the caller.
///
/// # Returns
///
/// The node array, root first.
///
/// # Errors
///
/// Returns `MerkleError::EmptyTree` if `leaves` is empty.
pub fn make_merkle_tree(leaves: &[HashValue]) -> Result<Vec<HashValue>, MerkleError> {
    if leaves.is_empty() {
        return Err(MerkleError::EmptyTree);
    }

    let tree_len = 2 * leaves.len() - 1;
    let mut tree = vec![HashValue::default(); tree_len];

    for (i, leaf) in leaves.iter().enumerate() {
        tree[tree_len - 1 - i] = *leaf;
    }
    for i in (0..tree_len - leaves.len()).rev() {
        tree[i] = hash_pair(&tree[left_child_index(i)], &tree[right_child_index(i)]);
    }

    Ok(tree)
}

/// Collects the siblings on the path from a leaf to the root.
///
/// # Arguments
///
/// * `tree` - The node array.
/// * `index` - The index of the leaf in the node array.
///
/// # Returns
///
/// The siblings, leaf level first.
pub fn get_proof(tree: &[HashValue], mut index: usize) -> Result<Vec<HashValue>, MerkleError> {
    check_leaf_node(tree, index)?;

    let mut proof = Vec::new();
    while index > 0 {
        proof.push(tree[sibling_index(index)]);
        index = parent_index(index);
    }

    Ok(proof)
}

/// Builds a multi-proof for the leaves at the given node indices.
///
/// # Arguments
///
/// * `tree` - The node array.
/// * `indices` - The indices of the leaves in the node array, in any order.
///
/// # Returns
///
/// A `MultiProof` whose leaves are the hashes of the requested nodes, ordered from the highest node
/// index to the lowest.
///
/// # Errors
///
/// Returns `MerkleError::EmptyTree` if `tree` is empty, and `MerkleError::NotALeaf` or
/// `MerkleError::InvalidMultiProof` for unusable indices.
pub fn get_multi_proof(
    tree: &[HashValue],
    indices: &[usize],
) -> Result<MultiProof<HashValue>, MerkleError> {
    if tree.is_empty() {
        return Err(MerkleError::EmptyTree);
    }
    for &index in indices {
        check_leaf_node(tree, index)?;
    }

    let mut sorted = indices.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(MerkleError::InvalidMultiProof {
            reason: "cannot prove duplicated index".into(),
        });
    }

    let mut stack: VecDeque<usize> = sorted.iter().copied().collect();
    let mut proof = Vec::new();
    let mut proof_flags = Vec::new();

    while let Some(&index) = stack.front() {
        if index == 0 {
            break;
        }
        stack.pop_front();

        let sibling = sibling_index(index);
        if stack.front() == Some(&sibling) {
            proof_flags.push(true);
            stack.pop_front();
        } else {
            proof_flags.push(false);
            proof.push(tree[sibling]);
        }
        stack.push_back(parent_index(index));
    }

    if sorted.is_empty() {
        proof.push(tree[0]);
    }

    Ok(MultiProof::new(
        sorted.iter().map(|&i| tree[i]).collect(),
        proof,
        proof_flags,
    ))
}

/// Recomputes the root committed to by a multi-proof.
///
/// # Arguments
///
/// * `multi_proof` - The multi-proof, with leaves given as hashes.
///
/// # Returns
///
/// The reconstructed root.
///
/// # Errors
///
/// Returns `MerkleError::InvalidMultiProof` if the number of leaves, hashes and flags are not
/// consistent with each other.
pub fn process_multi_proof(multi_proof: &MultiProof<HashValue>) -> Result<HashValue, MerkleError> {
    let invalid = |reason: &str| MerkleError::InvalidMultiProof {
        reason: reason.to_string(),
    };

    let flags = multi_proof.proof_flags();
    let unflagged = flags.iter().filter(|flag| !**flag).count();
    if multi_proof.proof().len() < unflagged {
        return Err(invalid("not enough proof hashes for the given flags"));
    }
    if multi_proof.leaves().len() + multi_proof.proof().len() != flags.len() + 1 {
        return Err(invalid(
            "leaves and proof hashes do not match the number of flags",
        ));
    }

    let mut stack: VecDeque<HashValue> = multi_proof.leaves().iter().copied().collect();
    let mut proof: VecDeque<HashValue> = multi_proof.proof().iter().copied().collect();

    for &flag in flags {
        let a = stack
            .pop_front()
            .ok_or_else(|| invalid("ran out of pending hashes"))?;
        let b = if flag {
            stack.pop_front()
        } else {
            proof.pop_front()
        }
        .ok_or_else(|| invalid("ran out of pending hashes"))?;
        stack.push_back(hash_pair(&a, &b));
    }

    if stack.len() + proof.len() != 1 {
        return Err(invalid("proof does not reduce to a single root"));
    }

    stack
        .pop_back()
        .or_else(|| proof.pop_front())
        .ok_or_else(|| invalid("proof does not reduce to a single root"))
}

/// Checks that every internal node of the array is the hash of its children.
pub fn is_valid_merkle_tree(tree: &[HashValue]) -> bool {
    if tree.is_empty() {
        return false;
    }

    tree.iter().enumerate().all(|(i, node)| {
        let left = left_child_index(i);
        let right = right_child_index(i);
        if right >= tree.len() {
            left >= tree.len()
        } else {
            *node == hash_pair(&tree[left], &tree[right])
        }
    })
}

/// Renders the node array as an indented tree, one node per line. An empty array renders as an
/// empty string.
pub fn render_merkle_tree(tree: &[HashValue]) -> String {
    if tree.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(tree.len());
    // Each entry carries, for every ancestor level, whether more siblings follow.
    let mut stack: Vec<(usize, Vec<bool>)> = vec![(0, Vec::new())];

    while let Some((index, path)) = stack.pop() {
        let mut line = String::new();
        if let Some((last, ancestors)) = path.split_last() {
            for &has_more in ancestors {
                line.push_str(if has_more { "│  " } else { "   " });
            }
            line.push_str(if *last { "├─ " } else { "└─ " });
        }
        line.push_str(&format!("{}) {}", index, tree[index]));
        lines.push(line);

        if right_child_index(index) < tree.len() {
            let mut right = path.clone();
            right.push(false);
            stack.push((right_child_index(index), right));

            let mut left = path;
            left.push(true);
            stack.push((left_child_index(index), left));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::crypto::hash::keccak256;

    fn leaves(n: u8) -> Vec<HashValue> {
        let mut leaves: Vec<_> = (0..n).map(|i| keccak256(&[i])).collect();
        leaves.sort();
        leaves
    }

    #[test]
    fn test_index_arithmetic() {
        assert_eq!(left_child_index(0), 1);
        assert_eq!(right_child_index(0), 2);
        assert_eq!(parent_index(1), 0);
        assert_eq!(parent_index(2), 0);
        assert_eq!(sibling_index(1), 2);
        assert_eq!(sibling_index(2), 1);
        assert!(is_leaf_node(9, 4));
        assert!(!is_leaf_node(9, 3));
        assert!(!is_leaf_node(9, 9));
    }

    #[test]
    fn test_make_merkle_tree() {
        assert!(matches!(make_merkle_tree(&[]), Err(MerkleError::EmptyTree)));

        let single = leaves(1);
        assert_eq!(make_merkle_tree(&single).unwrap(), single);

        let five = leaves(5);
        let tree = make_merkle_tree(&five).unwrap();
        assert_eq!(tree.len(), 9);
        assert_eq!(tree[8], five[0]);
        assert_eq!(tree[4], five[4]);
        assert_eq!(tree[0], hash_pair(&tree[1], &tree[2]));
        assert!(is_valid_merkle_tree(&tree));
    }

    #[test]
    fn test_single_proofs() {
        let tree = make_merkle_tree(&leaves(7)).unwrap();

        for index in tree.len() / 2..tree.len() {
            let proof = get_proof(&tree, index).unwrap();
            let root = proof
                .iter()
                .fold(tree[index], |acc, sibling| hash_pair(&acc, sibling));
            assert_eq!(root, tree[0]);
        }

        assert!(matches!(get_proof(&tree, 0), Err(MerkleError::NotALeaf(0))));
        assert!(matches!(get_proof(&tree, 13), Err(MerkleError::NotALeaf(13))));
    }

    #[test]
    fn test_multi_proofs() {
        let tree = make_merkle_tree(&leaves(6)).unwrap();

        let subsets = [
            vec![5],
            vec![5, 6],
            vec![10, 7, 5],
            vec![9, 8],
            vec![5, 6, 7, 8, 9, 10],
        ];
        for indices in subsets {
            let multi_proof = get_multi_proof(&tree, &indices).unwrap();
            assert_eq!(process_multi_proof(&multi_proof).unwrap(), tree[0]);
        }

        let empty = get_multi_proof(&tree, &[]).unwrap();
        assert_eq!(process_multi_proof(&empty).unwrap(), tree[0]);

        assert!(matches!(
            get_multi_proof(&tree, &[7, 7]),
            Err(MerkleError::InvalidMultiProof { .. })
        ));
        assert!(matches!(
            get_multi_proof(&tree, &[1]),
            Err(MerkleError::NotALeaf(1))
        ));
    }

    #[test]
    fn test_empty_node_array() {
        assert!(matches!(
            get_multi_proof(&[], &[]),
            Err(MerkleError::EmptyTree)
        ));
        assert!(matches!(
            get_multi_proof(&[], &[0]),
            Err(MerkleError::EmptyTree)
        ));
        assert!(matches!(get_proof(&[], 0), Err(MerkleError::NotALeaf(0))));
        assert_eq!(render_merkle_tree(&[]), "");
    }

    #[test]
    fn test_inconsistent_multi_proof() {
        let tree = make_merkle_tree(&leaves(4)).unwrap();
        let multi_proof = get_multi_proof(&tree, &[3, 5]).unwrap();

        let mut flags = multi_proof.proof_flags().clone();
        flags.push(false);
        let tampered = MultiProof::new(
            multi_proof.leaves().clone(),
            multi_proof.proof().clone(),
            flags,
        );
        assert!(matches!(
            process_multi_proof(&tampered),
            Err(MerkleError::InvalidMultiProof { .. })
        ));
    }

    #[test]
    fn test_invalid_tree_detection() {
        let mut tree = make_merkle_tree(&leaves(4)).unwrap();
        assert!(is_valid_merkle_tree(&tree));

        tree[5] = keccak256(b"forged");
        assert!(!is_valid_merkle_tree(&tree));
        assert!(!is_valid_merkle_tree(&[]));
    }

    #[test]
    fn test_render() {
        let tree = make_merkle_tree(&leaves(3)).unwrap();
        let rendered = render_merkle_tree(&tree);
        let lines: Vec<_> = rendered.lines().collect();

        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], format!("0) {}", tree[0]));
        assert_eq!(lines[1], format!("├─ 1) {}", tree[1]));
        assert_eq!(lines[2], format!("│  ├─ 3) {}", tree[3]));
        assert_eq!(lines[3], format!("│  └─ 4) {}", tree[4]));
        assert_eq!(lines[4], format!("└─ 2) {}", tree[2]));
    }
}
