//! Error types for catalog loading

use thiserror::Error;

/// Catalog client error
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-success status
    #[error("server error {status}: {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Response body, if any
        message: String,
    },

    /// Response body is neither a page envelope nor an array
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Base URL could not be combined with the catalog path
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Configuration rejected
    #[error("configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// Whether the failure came from the transport or server rather than the payload
    #[inline]
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Server { .. })
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_error_display() {
        let err = CatalogError::Server {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(err.to_string(), "server error 502: bad gateway");
        assert!(err.is_transport());

        let err = CatalogError::InvalidResponse("string body".to_string());
        assert!(!err.is_transport());
    }
}
