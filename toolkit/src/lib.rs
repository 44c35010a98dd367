// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Supply Chain Toolkit
//!
//! This crate provides the off-chain tooling around the allow-list commitment of a supply chain
//! deployment: building the tree once, serving membership proofs to the wallet front end, and
//! signing custody transfers.
//!
//! ## Binaries
//!
//! - `build_tree`: Builds the tree over an allow-list file and writes its dump.
//! - `get_proof`: Prints the inclusion proof of a single address from a dump.
//! - `sign_transfer`: Signs a `Transfer` message with EIP-712, or recovers the signer of one.
//! - `proof_server`: The backend called by the wallet front end, serving the root and proofs of
//!   a dump over HTTP.
//!
//! ## Library
//!
//! The library provides the building blocks of the binaries. It has the following modules:
//! - [`client`]: The HTTP client of the proof server.
//! - [`config`]: The signing domain configuration shared by the binaries.
//! - [`server`]: The routes of the proof server.
//! - [`service`]: The `ProofService`, answering queries over one loaded tree.
//! - [`storage`]: Reading and writing allow-lists, dumps and proofs on disk.
//! - [`types`]: The JSON bodies exchanged with the proof server.
//!
//! For more detailed information, users should refer to the specific documentation for each
//! sub-module.

pub mod client;
pub mod config;
pub mod server;
pub mod service;
pub mod storage;
pub mod types;
