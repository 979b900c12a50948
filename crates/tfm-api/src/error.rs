//! API error types.
//!
//! Each variant is one HTTP status class the migration steps react to
//! differently; see [`ApiError::is_fatal`].

use thiserror::Error;

/// Errors that can occur when talking to a Terraform Cloud/Enterprise API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// 404: the resource does not exist (often means "needs creation").
    #[error("not found: {message}")]
    NotFound {
        /// Error detail from the response body.
        message: String,
    },

    /// 400/422: the payload failed validation.
    #[error("bad request ({status}): {message}")]
    BadRequest {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// 409: conflicting state, e.g. the workspace is already locked.
    #[error("conflict: {message}")]
    Conflict {
        /// Error detail from the response body.
        message: String,
    },

    /// 5xx: the server failed to handle the request.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// 401/403: the token is missing, invalid or lacks permission.
    #[error("unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code.
        status: u16,
        /// Error detail from the response body.
        message: String,
    },

    /// 429 Too Many Requests.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Any other non-success status.
    #[error("unexpected response ({status}): {message}")]
    Unclassified {
        /// HTTP status code.
        status: u16,
        /// Error detail or response body.
        message: String,
    },

    /// Failed to parse a response body.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether this error means the resource is absent.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether this error means the resource is locked or otherwise in conflict.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Whether this error is a validation failure.
    #[must_use]
    pub const fn is_bad_request(&self) -> bool {
        matches!(self, Self::BadRequest { .. })
    }

    /// Errors that abort the whole run instead of skipping one item.
    ///
    /// Authentication failures and unclassified responses (typically a proxy
    /// answering instead of the API) will not go away by moving on to the
    /// next item.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::Unclassified { .. })
    }

    /// HTTP status behind this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::RateLimited { .. } => Some(429),
            Self::BadRequest { status, .. }
            | Self::Server { status, .. }
            | Self::Unauthorized { status, .. }
            | Self::Unclassified { status, .. } => Some(*status),
            Self::Http(error) => error.status().map(|s| s.as_u16()),
            Self::Parse(_) => None,
        }
    }
}
