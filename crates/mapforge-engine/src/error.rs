//! Engine error types.
//!
//! Unresolvable mappings, duplicates and ambiguity are diagnostics, not
//! errors. `EngineError` covers cancellation and broken invariants only.

use crate::mapping::MappingId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("mapper build was cancelled")]
    Cancelled,

    #[error("unknown mapping {0:?}")]
    UnknownMapping(MappingId),

    #[error("mapping {id:?} has no {expected} body slot")]
    BodyKindMismatch { id: MappingId, expected: &'static str },

    #[error("{operation} requires an inline expression context")]
    NotInlineContext { operation: &'static str },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid mapper configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {message}")]
    InvalidValue {
        field: &'static str,
        message: String,
    },
}
