//! Error taxonomy for the remote validation API boundary.
//!
//! Every failure a caller can see is one of three shapes: the transport
//! failed, the server answered with a non-2xx status, or the body was not
//! the JSON we expected. Callers catch at the call site and render an inline
//! error — nothing from this module is allowed to escape as a panic.

use thiserror::Error;

/// Failure from a single API call. No retries are attempted anywhere, so an
/// error always describes exactly one request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The server responded with a non-2xx status.
    #[error("HTTP {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// The response body was not valid JSON (or not the expected shape).
    #[error("invalid response body: {0}")]
    Parse(String),
}

impl ApiError {
    /// The numeric status for HTTP errors, `None` otherwise. Used by
    /// renderers that must show the code inline.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ureq::Error> for ApiError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => Self::Http {
                status,
                status_text: response.status_text().to_string(),
            },
            other => Self::Network(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_display_contains_status_code() {
        let err = ApiError::Http {
            status: 500,
            status_text: "Internal Server Error".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("Internal Server Error"));
        assert_eq!(err.status(), Some(500));
    }

    #[test]
    fn network_error_has_no_status() {
        let err = ApiError::Network("connection refused".to_string());
        assert_eq!(err.status(), None);
    }
}
