// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Configuration
//!
//! The signing domain of a deployment is given either as a JSON file or through command line
//! flags, each flag falling back on an environment variable. The chain ID and the verifying
//! contract have no default: signing for a domain that does not match the deployment would
//! produce signatures the contract rejects.

use crate::storage::{read_signing_domain, StorageError};
use clap::Args;
use ethers_core::types::Address;
use std::path::PathBuf;
use supply_chain_core::crypto::sig::{SigningDomain, DEFAULT_DOMAIN_NAME, DEFAULT_DOMAIN_VERSION};
use thiserror::Error;

/// The error type for the `config` module.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing signing domain parameter \"{0}\", set it or provide a domain file")]
    MissingParameter(&'static str),
    #[error("Could not read the signing domain file: {source}")]
    File {
        #[source]
        source: StorageError,
    },
}

/// Command line arguments describing the EIP-712 signing domain.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct DomainArgs {
    /// JSON file holding the whole signing domain. Takes precedence over the other domain flags.
    #[arg(long, env = "SIGNING_DOMAIN_FILE")]
    pub domain_file: Option<PathBuf>,

    /// Name of the signing domain.
    #[arg(long, env = "SIGNING_DOMAIN_NAME", default_value = DEFAULT_DOMAIN_NAME)]
    pub domain_name: String,

    /// Version of the signing domain.
    #[arg(long, env = "SIGNING_DOMAIN_VERSION", default_value = DEFAULT_DOMAIN_VERSION)]
    pub domain_version: String,

    /// Chain ID of the deployment. E.g. 31337 for a local Anvil node
    #[arg(long, env = "SIGNING_CHAIN_ID")]
    pub chain_id: Option<u64>,

    /// Address of the contract checking the signatures.
    #[arg(long, env = "SIGNING_VERIFYING_CONTRACT")]
    pub verifying_contract: Option<Address>,
}

impl DomainArgs {
    /// Resolves the signing domain.
    ///
    /// # Returns
    ///
    /// The domain read from `domain_file` if set, otherwise the one described by the flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the domain file cannot be read, or if the chain ID or the verifying
    /// contract is missing.
    pub fn signing_domain(&self) -> Result<SigningDomain, ConfigError> {
        if let Some(path) = &self.domain_file {
            return read_signing_domain(path).map_err(|source| ConfigError::File { source });
        }

        let chain_id = self
            .chain_id
            .ok_or(ConfigError::MissingParameter("chain-id"))?;
        let verifying_contract = self
            .verifying_contract
            .ok_or(ConfigError::MissingParameter("verifying-contract"))?;

        Ok(SigningDomain::new(
            self.domain_name.clone(),
            self.domain_version.clone(),
            chain_id,
            verifying_contract,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use clap::Parser;
    use std::str::FromStr;

    const CONTRACT: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        domain: DomainArgs,
    }

    fn parse(args: &[&str]) -> DomainArgs {
        Cli::try_parse_from(std::iter::once("test").chain(args.iter().copied()))
            .unwrap()
            .domain
    }

    #[test]
    fn test_domain_from_flags() {
        let domain = parse(&["--chain-id", "31337", "--verifying-contract", CONTRACT])
            .signing_domain()
            .unwrap();

        assert_eq!(domain.name(), DEFAULT_DOMAIN_NAME);
        assert_eq!(domain.version(), DEFAULT_DOMAIN_VERSION);
        assert_eq!(domain.chain_id(), 31337);
        assert_eq!(
            domain.verifying_contract(),
            Address::from_str(CONTRACT).unwrap()
        );
    }

    #[test]
    fn test_domain_requires_deployment() {
        assert!(matches!(
            parse(&["--verifying-contract", CONTRACT]).signing_domain(),
            Err(ConfigError::MissingParameter("chain-id"))
        ));
        assert!(matches!(
            parse(&["--chain-id", "1"]).signing_domain(),
            Err(ConfigError::MissingParameter("verifying-contract"))
        ));
    }

    #[test]
    fn test_domain_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain.json");
        std::fs::write(
            &path,
            serde_json::json!({
                "name": "MedicineSupplyChain",
                "version": "2.0",
                "chainId": 11155111,
                "verifyingContract": CONTRACT,
            })
            .to_string(),
        )
        .unwrap();

        let domain = parse(&["--domain-file", path.to_str().unwrap(), "--chain-id", "1"])
            .signing_domain()
            .unwrap();
        assert_eq!(domain.version(), "2.0");
        assert_eq!(domain.chain_id(), 11155111);

        assert!(matches!(
            parse(&["--domain-file", "/nonexistent/domain.json"]).signing_domain(),
            Err(ConfigError::File { .. })
        ));
    }
}
