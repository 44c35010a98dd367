// Copyright (c) Argument Computer Corporation
// SPDX-License-Identifier: Apache-2.0

use thiserror::Error;

/// Errors possible while parsing type tags and encoding leaf values.
#[derive(Debug, Error)]
pub enum TypesError {
    #[error("Unsupported leaf type: \"{0}\"")]
    UnsupportedType(String),
    #[error("Received a leaf of invalid arity. Expected {expected} values, got {actual}.")]
    ArityMismatch { expected: usize, actual: usize },
    #[error("Invalid value {value} for type {leaf_type}: {reason}")]
    InvalidValue {
        leaf_type: String,
        value: String,
        reason: String,
    },
    #[error("Error while decoding hexadecimal value for type {leaf_type}: {source}")]
    InvalidHexadecimal {
        leaf_type: String,
        #[source]
        source: Box<dyn std::error::Error + Sync + Send>,
    },
}

/// Macro to create a `TypesError::InvalidValue` with the given type, value and reason.
#[macro_export]
macro_rules! invalid_value {
    ($leaf_type:expr, $value:expr, $reason:expr) => {
        TypesError::InvalidValue {
            leaf_type: $leaf_type.to_string(),
            value: $value.to_string(),
            reason: String::from($reason),
        }
    };
}
