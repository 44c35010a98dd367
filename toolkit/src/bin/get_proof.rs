// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Error, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use supply_chain_core::merkle::error::MerkleError;
use supply_chain_toolkit::service::ProofService;
use supply_chain_toolkit::storage::write_proof;

/// Prints the inclusion proof of an allow-listed address.
#[derive(Parser)]
struct Cli {
    /// The tree dump written by `build_tree`.
    #[arg(short, long, default_value = "tree.json")]
    tree: PathBuf,

    /// The address to prove.
    #[arg(short, long, conflicts_with = "index")]
    address: Option<String>,

    /// Index of the leaf to prove, in allow-list order.
    #[arg(short, long)]
    index: Option<usize>,

    /// Also write the proof, as a JSON array, to this file.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let Cli {
        tree,
        address,
        index,
        output,
    } = Cli::parse();

    env_logger::init();

    let service = ProofService::from_file(&tree)?;

    let proof = match (address, index) {
        (Some(address), _) => service
            .prove_address(&address)?
            .ok_or(MerkleError::NotFound { value: address })?,
        (None, Some(index)) => service.prove_index(index)?,
        (None, None) => {
            return Err(Error::msg("Either an address or a leaf index is required"));
        }
    };

    info!(
        "Proof of leaf {} has {} siblings",
        proof.index(),
        proof.proof().len()
    );

    if let Some(output) = output {
        write_proof(&output, proof.proof())?;
        info!("Proof written to {:?}", output);
    }

    println!("Merkle Root: {}", service.root());
    println!("{}", serde_json::to_string_pretty(&proof)?);

    Ok(())
}
