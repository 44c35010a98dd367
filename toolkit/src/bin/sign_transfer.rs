// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use anyhow::{Error, Result};
use clap::{Parser, Subcommand};
use ethers_core::types::{Address, U256};
use log::{info, warn};
use supply_chain_core::crypto::sig::{
    manufacturer_to_distributor, recover_transfer_signer, sign_transfer, signer_address,
    signing_key_from_hex, transfer_digest, SignedTransfer, Transfer,
};
use supply_chain_toolkit::config::DomainArgs;

/// Signs custody transfers with EIP-712, or recovers their signer.
#[derive(Parser)]
struct Cli {
    #[command(flatten)]
    domain: DomainArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign the transfer of a token to the next participant.
    Sign {
        /// Private key of the current holder of the token.
        #[arg(short, long, env = "SIGNER_PRIVATE_KEY", hide_env_values = true)]
        private_key: String,

        /// Address of the recipient.
        #[arg(short, long)]
        to: Address,

        /// The token being transferred.
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,

        /// Unix timestamp of the transfer. Defaults to now.
        #[arg(long, value_parser = parse_u256)]
        timestamp: Option<U256>,
    },
    /// Recover the signer of a transfer and check it against the sender.
    Recover {
        /// Address of the sender.
        #[arg(short, long)]
        from: Address,

        /// Address of the recipient.
        #[arg(short, long)]
        to: Address,

        /// The token being transferred.
        #[arg(long, value_parser = parse_u256)]
        token_id: U256,

        /// Unix timestamp of the transfer.
        #[arg(long, value_parser = parse_u256)]
        timestamp: U256,

        /// The 65 bytes signature, hex encoded.
        #[arg(short, long)]
        signature: String,
    },
}

/// Parses a decimal integer, or a hexadecimal one when prefixed with `0x`.
fn parse_u256(value: &str) -> Result<U256> {
    match value.strip_prefix("0x") {
        Some(hex) => U256::from_str_radix(hex, 16).map_err(Error::msg),
        None => U256::from_dec_str(value).map_err(Error::msg),
    }
}

fn main() -> Result<()> {
    let Cli { domain, command } = Cli::parse();

    env_logger::init();

    let domain = domain.signing_domain()?;
    info!(
        "Using domain {} v{} on chain {}, contract {:?}",
        domain.name(),
        domain.version(),
        domain.chain_id(),
        domain.verifying_contract()
    );

    match command {
        Command::Sign {
            private_key,
            to,
            token_id,
            timestamp,
        } => {
            let key = signing_key_from_hex(&private_key)?;
            let signed = match timestamp {
                Some(timestamp) => {
                    let transfer = Transfer::new(signer_address(&key), to, token_id, timestamp);
                    let signature = sign_transfer(&domain, &transfer, &key)?;
                    SignedTransfer::new(transfer, signature)
                }
                None => manufacturer_to_distributor(&domain, &key, to, token_id)?,
            };

            println!("{}", serde_json::to_string_pretty(&signed)?);
        }
        Command::Recover {
            from,
            to,
            token_id,
            timestamp,
            signature,
        } => {
            let transfer = Transfer::new(from, to, token_id, timestamp);
            let signature = hex::decode(signature.strip_prefix("0x").unwrap_or(&signature))?;

            let digest = transfer_digest(&domain, &transfer)?;
            let signer = recover_transfer_signer(&domain, &transfer, &signature)?;
            info!("Digest: {}", digest);

            println!("Recovered signer: {:?}", signer);
            if signer != from {
                warn!("Signer {:?} is not the sender {:?}", signer, from);
                return Err(Error::msg("Signature was not made by the sender"));
            }
            println!("Signature is valid");
        }
    }

    Ok(())
}
