// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Supply Chain Core
//!
//! This crate provides the core types and utilities used to commit to the allow-list of a supply
//! chain deployment and to authorize token transfers between its participants. It is divided into
//! several sub-modules, each with its own specific functionality.
//!
//! ## Sub-modules
//!
//! - `crypto`: This sub-module contains the hashing primitives and the EIP-712 transfer signatures.
//! - `merkle`: This sub-module contains the Merkle tree built over the allow-list, along with its
//!   single and multi-leaf proofs.
//! - `types`: This sub-module contains the leaf encoding rules and the persisted tree dump format.
//!
//! For more detailed information, users should refer to the specific documentation for each sub-module.

pub mod crypto;
pub mod merkle;
pub mod types;
