// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use supply_chain_core::merkle::tree::StandardMerkleTree;
use supply_chain_toolkit::storage::{read_allowlist, write_dump};

/// Builds the Merkle tree of an allow-list and writes its dump.
#[derive(Parser)]
struct Cli {
    /// JSON file holding the allow-list, e.g. [["0x6CA6..."], ["0xf39F..."]]
    #[arg(short, long)]
    input: PathBuf,

    /// Where to write the tree dump.
    #[arg(short, long, default_value = "tree.json")]
    output: PathBuf,

    /// Comma-separated type tags of the leaf fields.
    #[arg(short, long, value_delimiter = ',', default_value = "address")]
    encoding: Vec<String>,

    /// Print the node array of the tree once built.
    #[arg(short, long)]
    render: bool,
}

fn main() -> Result<()> {
    let Cli {
        input,
        output,
        encoding,
        render,
    } = Cli::parse();

    env_logger::init();

    let leaves = read_allowlist(&input)?;
    info!("Read {} leaves from {:?}", leaves.len(), input);

    let tree = StandardMerkleTree::of(leaves, &encoding)?;
    write_dump(&output, &tree.dump())?;
    info!("Tree dump written to {:?}", output);

    if render {
        println!("{}", tree.render());
    }
    println!("Merkle Root: {}", tree.root());

    Ok(())
}
