// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::sync::Arc;
use supply_chain_toolkit::server::serve;
use supply_chain_toolkit::service::ProofService;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Cli {
    /// Address of this server. E.g. 127.0.0.1:1234
    #[arg(short, long)]
    addr: String,

    /// The tree dump to serve proofs from.
    #[arg(short, long, default_value = "tree.json")]
    tree: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli { addr, tree } = Cli::parse();

    env_logger::init();

    let service = Arc::new(ProofService::from_file(&tree)?);
    info!("Serving proofs for root {}", service.root());

    let listener = TcpListener::bind(addr).await?;
    serve(listener, service).await?;

    Ok(())
}
