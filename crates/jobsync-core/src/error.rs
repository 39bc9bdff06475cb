//! Error types for jobsync.
//!
//! A single error type with explicit variants for transport, protocol,
//! storage and input validation failures. Item-level failures are expected
//! to be absorbed by the caller; only store and configuration errors are
//! meant to reach the process boundary.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for jobsync operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, HTTP).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Protocol errors (non-success status, undecodable body).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Local store errors.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors (URL, key, configuration).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Protocol-level errors from the remote source.
#[derive(Debug)]
pub struct ProtocolError {
    /// HTTP status code, if a response was received.
    pub status: Option<u16>,
    /// Error message from the server or the decoder.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}", status)?,
            None => write!(f, "malformed response")?,
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create an error for a non-success HTTP status.
    pub fn status(status: u16, message: Option<String>) -> Self {
        Self {
            status: Some(status),
            message,
        }
    }

    /// Create an error for a body that could not be decoded.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: Some(message.into()),
        }
    }

    /// Check if the server rejected the API key.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status, Some(401) | Some(403))
    }
}

/// Errors raised by the local record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem error on a specific path.
    #[error("IO error on {}: {message}", path.display())]
    Io { path: PathBuf, message: String },

    /// The tabular file could not be read or written.
    #[error("CSV error in {}: {message}", path.display())]
    Csv { path: PathBuf, message: String },

    /// The existing store has no column for the natural key.
    #[error("store {} has no '{column}' column", path.display())]
    MissingKeyColumn { path: PathBuf, column: String },

    /// The existing store was written with different columns.
    #[error("store {} header does not match the schema", path.display())]
    SchemaMismatch { path: PathBuf },

    /// Another run holds the store lock.
    #[error("store {} is locked by another run", path.display())]
    Locked { path: PathBuf },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid natural key.
    #[error("invalid natural key '{value}': {reason}")]
    NaturalKey { value: String, reason: String },

    /// Invalid API key.
    #[error("invalid API key: {reason}")]
    ApiKey { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
