// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Cryptographic Utilities
//!
//! This module contains the cryptographic utilities used by the allow-list tree and the transfer
//! signatures. It is divided into several sub-modules, each with its own specific functionality.
//!
//! ## Sub-modules
//!
//! - `hash`: This sub-module contains the `HashValue` structure and the keccak-256 helpers.
//! - `sig`: This sub-module contains the EIP-712 signing domain, the `Transfer` message and the
//!   functions to sign and recover transfer signatures.
//! - `error`: This sub-module contains the `CryptoError` error type used throughout the `crypto` module.
//!
//! For more detailed information, users should refer to the specific documentation for each sub-module.

pub mod error;
pub mod hash;
pub mod sig;
