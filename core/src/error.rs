//! Error types for the CodeClimate API client.
//!
//! # Design
//! Every failure is returned as a value, never panicked. Callers match on the
//! variant to decide handling: `Validation` means the request was rejected
//! before any network traffic, `Http` carries the unexpected status code with
//! a fixed human-readable message, and `Decode` is kept distinct from `Http`
//! so a bad body on a successful status is not confused with a server error.

use std::fmt;

/// Errors returned by `CodeClimateClient` operations.
#[derive(Debug)]
pub enum ApiError {
    /// A required argument was missing or malformed. No network call was made.
    Validation(String),

    /// The server answered with a status other than the one the operation
    /// expects. The body is not parsed in this case.
    Http { status: u16, message: String },

    /// The response status was as expected but the body was not valid JSON.
    Decode(String),

    /// The round-trip failed before a status code existed (connection, DNS,
    /// TLS, interrupted body).
    Transport(String),
}

impl ApiError {
    /// Build an `Http` error with the canonical message for `status`.
    pub(crate) fn http(status: u16) -> Self {
        ApiError::Http {
            status,
            message: status_message(status).to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(msg) => write!(f, "validation failed: {msg}"),
            ApiError::Http { status, message } => write!(f, "HTTP {status}: {message}"),
            ApiError::Decode(msg) => write!(f, "response decoding failed: {msg}"),
            ApiError::Transport(msg) => write!(f, "transport failed: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Fixed message lookup for response codes the API is known to return.
pub fn status_message(status: u16) -> &'static str {
    match status {
        200 => "Ok",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown response code",
    }
}
