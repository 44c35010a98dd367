// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// The error type for the `crypto` module.
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Invalid private key: {source}")]
    InvalidKey {
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Error while signing typed data: {source}")]
    Signing {
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Error while recovering the signer of typed data: {source}")]
    Recovery {
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
    #[error("Internal error occurred: {source}")]
    Internal {
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
}
