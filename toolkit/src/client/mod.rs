// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

//! # Proof Server client module
//!
//! This module contains the client used by the wallet backend and the tooling to query a running
//! proof server over HTTP.
//!
//! ## Sub-modules
//!
//! - `error`: This sub-module contains the `ClientError` error type.

use crate::client::error::ClientError;
use crate::types::{LeafProof, RootResponse, VerifyRequest, VerifyResponse};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use supply_chain_core::crypto::hash::HashValue;
use supply_chain_core::merkle::proof::MerkleProof;
use supply_chain_core::types::LeafValue;

pub mod error;

/// Number of attempts made by [`ProofServerClient::test_endpoint`].
const CONNECTION_RETRIES: usize = 10;

/// Delay between two connection attempts.
const RETRY_DELAY: Duration = Duration::from_millis(500);

/// A client to handle communication with a proof server.
#[derive(Debug, Clone)]
pub struct ProofServerClient {
    /// The base URL of the proof server, e.g. `http://127.0.0.1:3000`.
    address: String,
    /// The inner HTTP client.
    inner: Client,
}

impl ProofServerClient {
    /// Create a new client with the given address.
    ///
    /// # Arguments
    ///
    /// * `proof_server_address` - The address of the proof server. The `http://` scheme is added
    ///   when missing.
    ///
    /// # Returns
    ///
    /// A new `ProofServerClient`.
    pub fn new(proof_server_address: &str) -> Self {
        let address = if proof_server_address.starts_with("http://")
            || proof_server_address.starts_with("https://")
        {
            proof_server_address.trim_end_matches('/').to_string()
        } else {
            format!("http://{}", proof_server_address.trim_end_matches('/'))
        };

        Self {
            address,
            inner: Client::new(),
        }
    }

    /// Waits for the proof server to answer its health check.
    ///
    /// # Returns
    ///
    /// A result indicating whether the connection was successful.
    pub async fn test_endpoint(&self) -> Result<(), ClientError> {
        let url = format!("{}/health", self.address);

        for _ in 0..CONNECTION_RETRIES {
            match self.inner.get(&url).send().await {
                Ok(response) if response.status().is_success() => return Ok(()),
                _ => tokio::time::sleep(RETRY_DELAY).await,
            }
        }

        Err(ClientError::Connection {
            address: self.address.clone(),
        })
    }

    /// Checks whether the proof server is idle.
    pub async fn is_ready(&self) -> Result<bool, ClientError> {
        let url = format!("{}/ready", self.address);
        let response = self
            .inner
            .get(&url)
            .send()
            .await
            .map_err(|err| ClientError::Request {
                endpoint: url.clone(),
                source: Box::new(err),
            })?;

        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::CONFLICT => Ok(false),
            status => Err(ClientError::Response {
                endpoint: url,
                source: format!("Unexpected HTTP code {}", status.as_str()).into(),
            }),
        }
    }

    /// Fetches the root of the served tree.
    pub async fn root(&self) -> Result<HashValue, ClientError> {
        let url = format!("{}/root", self.address);
        let response = self.get(&url).await?;

        Self::json::<RootResponse>(&url, response)
            .await
            .map(|response| response.root())
    }

    /// `proof` fetches the inclusion proof of an address.
    ///
    /// # Arguments
    ///
    /// * `address` - The address to prove.
    ///
    /// # Returns
    ///
    /// The proof, or `None` if the address is not part of the allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, if the address is rejected as malformed or if the
    /// response is not properly formatted.
    pub async fn proof(&self, address: &str) -> Result<Option<LeafProof>, ClientError> {
        let url = format!("{}/proof/{}", self.address, address);
        let response = self.get(&url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        Self::json(&url, response).await.map(Some)
    }

    /// Asks the proof server to check a proof.
    ///
    /// # Arguments
    ///
    /// * `root` - The root to check against. The server uses the root of its tree when `None`.
    /// * `value` - The proven leaf.
    /// * `proof` - The inclusion proof.
    ///
    /// # Returns
    ///
    /// Whether the proof is valid.
    pub async fn verify(
        &self,
        root: Option<HashValue>,
        value: LeafValue,
        proof: MerkleProof,
    ) -> Result<bool, ClientError> {
        let url = format!("{}/verify", self.address);
        let response = self
            .inner
            .post(&url)
            .header(ACCEPT, "application/json")
            .json(&VerifyRequest::new(root, value, proof))
            .send()
            .await
            .map_err(|err| ClientError::Request {
                endpoint: url.clone(),
                source: Box::new(err),
            })?;

        Self::json::<VerifyResponse>(&url, response)
            .await
            .map(|response| response.valid())
    }

    async fn get(&self, url: &str) -> Result<Response, ClientError> {
        self.inner
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| ClientError::Request {
                endpoint: url.to_string(),
                source: Box::new(err),
            })
    }

    async fn json<T: serde::de::DeserializeOwned>(
        url: &str,
        response: Response,
    ) -> Result<T, ClientError> {
        if !response.status().is_success() {
            return Err(ClientError::Request {
                endpoint: url.to_string(),
                source: format!(
                    "Request not successful, got HTTP code {}",
                    response.status().as_str()
                )
                .into(),
            });
        }

        response.json().await.map_err(|err| ClientError::Response {
            endpoint: url.to_string(),
            source: Box::new(err),
        })
    }
}
