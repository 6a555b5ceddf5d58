//! Error taxonomy for the aggregation layer.
//!
//! Transport failures are retried inside the executor; everything that leaves
//! a repository is a [`RepoError`], which the list controller turns into a
//! user-facing message.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::Store;

/// Failure of a single HTTP exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Connection(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}")]
    Status { status: u16 },
    /// The request could not be built at all; retrying cannot help.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    pub fn is_transient(&self) -> bool {
        !matches!(self, TransportError::InvalidRequest(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExecError {
    #[error("network error after {attempts} attempt(s): {message}")]
    Network { attempts: u32, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("request error: {0}")]
    Request(String),
}

/// Broad class of a [`RepoError`], used for display and tests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Parse,
    Business,
    Unsupported,
    NoDownloadSource,
    InvalidArgument,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    #[error("network error after {attempts} attempt(s): {message}")]
    Network { attempts: u32, message: String },
    #[error("response parse error: {0}")]
    Parse(String),
    #[error("{store} rejected the request (code {code}): {msg}")]
    Business { store: Store, code: i64, msg: String },
    #[error("{operation} is not supported for store {store}")]
    Unsupported {
        store: Store,
        operation: &'static str,
    },
    #[error("no download source available")]
    NoDownloadSource,
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl RepoError {
    pub fn unsupported(store: Store, operation: &'static str) -> Self {
        RepoError::Unsupported { store, operation }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            RepoError::Network { .. } => ErrorKind::Network,
            RepoError::Parse(_) => ErrorKind::Parse,
            RepoError::Business { .. } => ErrorKind::Business,
            RepoError::Unsupported { .. } => ErrorKind::Unsupported,
            RepoError::NoDownloadSource => ErrorKind::NoDownloadSource,
            RepoError::InvalidArgument(_) => ErrorKind::InvalidArgument,
        }
    }

    /// Text shown to the user when a load fails.
    pub fn user_message(&self) -> String {
        match self {
            RepoError::Network { .. } => {
                "Network error. Check your connection and try again.".to_string()
            }
            RepoError::Parse(_) => {
                "The store sent a response this version cannot read.".to_string()
            }
            RepoError::Business { msg, code, .. } => {
                if msg.trim().is_empty() {
                    format!("The store rejected the request (code {}).", code)
                } else {
                    msg.clone()
                }
            }
            RepoError::Unsupported { store, operation } => format!(
                "{} does not support {}.",
                store.display_name(),
                operation
            ),
            RepoError::NoDownloadSource => "No download source is available.".to_string(),
            RepoError::InvalidArgument(msg) => msg.clone(),
        }
    }
}

impl From<ExecError> for RepoError {
    fn from(err: ExecError) -> Self {
        match err {
            ExecError::Network { attempts, message } => RepoError::Network { attempts, message },
            ExecError::Parse(msg) => RepoError::Parse(msg),
            // A request that cannot be built is a caller bug, not a network condition.
            ExecError::Request(msg) => RepoError::InvalidArgument(msg),
        }
    }
}
