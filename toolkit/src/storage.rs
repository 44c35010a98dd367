// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Storage
//!
//! Files are always read and written whole. Every error names the path it happened on.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use supply_chain_core::crypto::sig::SigningDomain;
use supply_chain_core::merkle::proof::MerkleProof;
use supply_chain_core::types::dump::TreeDump;
use supply_chain_core::types::LeafValue;
use thiserror::Error;

/// The error type for the `storage` module.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Could not (de)serialize the content of {path:?}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let content = std::fs::read_to_string(path).map_err(|err| StorageError::Io {
        path: path.to_path_buf(),
        source: err.into(),
    })?;

    serde_json::from_str(&content).map_err(|err| StorageError::Serialization {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let content = serde_json::to_string_pretty(value).map_err(|err| StorageError::Serialization {
        path: path.to_path_buf(),
        source: err.into(),
    })?;

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|err| StorageError::Io {
            path: parent.to_path_buf(),
            source: err.into(),
        })?;
    }

    std::fs::write(path, content).map_err(|err| StorageError::Io {
        path: path.to_path_buf(),
        source: err.into(),
    })
}

/// Reads an allow-list, a JSON array of leaf tuples such as `[["0x6CA6..."], ["0xf39F..."]]`.
pub fn read_allowlist(path: impl AsRef<Path>) -> Result<Vec<LeafValue>, StorageError> {
    read_json(path.as_ref())
}

/// Reads a tree dump.
pub fn read_dump(path: impl AsRef<Path>) -> Result<TreeDump, StorageError> {
    read_json(path.as_ref())
}

/// Writes a tree dump, creating its parent directories if needed.
pub fn write_dump(path: impl AsRef<Path>, dump: &TreeDump) -> Result<(), StorageError> {
    write_json(path.as_ref(), dump)
}

/// Writes a proof as a JSON array of hexadecimal digests.
pub fn write_proof(path: impl AsRef<Path>, proof: &MerkleProof) -> Result<(), StorageError> {
    write_json(path.as_ref(), proof)
}

/// Reads a signing domain, as `{ "name", "version", "chainId", "verifyingContract" }`.
pub fn read_signing_domain(path: impl AsRef<Path>) -> Result<SigningDomain, StorageError> {
    read_json(path.as_ref())
}
