//! Error types for record processing
//!
//! Only these two failures cross the processor boundary. Species lookups, single
//! move fetches and every cache fault are absorbed where they happen.

use thiserror::Error;

use crate::data::UpstreamError;

/// Terminal failure of a record request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProcessError {
    /// The upstream has no Pokemon by this name
    #[error("Pokemon \"{0}\" not found")]
    NotFound(String),

    /// The upstream failed or answered with something unusable
    #[error("Upstream error: {message}")]
    Upstream {
        /// Upstream HTTP status, when it answered at all
        status: Option<u16>,
        message: String,
    },
}

impl ProcessError {
    /// Wraps an upstream failure while fetching `what`
    pub fn upstream(what: &str, err: &UpstreamError) -> Self {
        ProcessError::Upstream {
            status: err.status(),
            message: format!("failed fetching {}: {}", what, err),
        }
    }

    /// HTTP status an entry point should report for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ProcessError::NotFound(_) => 404,
            ProcessError::Upstream {
                status: Some(status),
                ..
            } => *status,
            ProcessError::Upstream { status: None, .. } => 500,
        }
    }
}

/// Convenience Result type for record processing.
pub type Result<T> = std::result::Result<T, ProcessError>;
