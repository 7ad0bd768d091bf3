use crate::retry::Retryable;

/// Failures surfaced by the explorer clients.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{0}")]
    Validation(String),
    #[error("Resource not found: {endpoint}")]
    NotFound { endpoint: String },
    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,
    #[error("Server error. Please try again later. (status {status})")]
    Server { status: u16, body: String },
    #[error("HTTP error! status: {status}, message: {body}")]
    Http { status: u16, body: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid request url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl FetchError {
    pub fn validation(msg: impl Into<String>) -> Self {
        FetchError::Validation(msg.into())
    }

    /// Maps a non-2xx response to its error.
    pub fn from_status(status: u16, endpoint: &str, body: String) -> Self {
        match status {
            404 => FetchError::NotFound {
                endpoint: endpoint.to_string(),
            },
            429 => FetchError::RateLimited,
            s if s >= 500 => FetchError::Server { status: s, body },
            s => FetchError::Http { status: s, body },
        }
    }

    /// HTTP status of the failed response, if the failure had one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::NotFound { .. } => Some(404),
            FetchError::RateLimited => Some(429),
            FetchError::Server { status, .. } | FetchError::Http { status, .. } => Some(*status),
            FetchError::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl Retryable for FetchError {
    /// Transport failures (refused connections, DNS, timeouts) and server errors.
    fn is_retryable(&self) -> bool {
        match self {
            FetchError::Server { .. } => true,
            FetchError::Network(err) => !err.is_decode() && !err.is_builder(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping_uses_specialised_messages() {
        let err = FetchError::from_status(404, "/blocks/7", String::new());
        assert_eq!(err.to_string(), "Resource not found: /blocks/7");
        assert!(!err.is_retryable());

        let err = FetchError::from_status(429, "/blocks", String::new());
        assert_eq!(err.to_string(), "Rate limit exceeded. Please try again later.");
        assert!(!err.is_retryable());

        let err = FetchError::from_status(503, "/blocks", "down".into());
        assert!(err.to_string().starts_with("Server error"));
        assert_eq!(err.status(), Some(503));
        assert!(err.is_retryable());

        let err = FetchError::from_status(400, "/blocks", "bad limit".into());
        assert_eq!(err.to_string(), "HTTP error! status: 400, message: bad limit");
        assert!(!err.is_retryable());
    }

    #[test]
    fn semantic_and_validation_errors_are_not_retried() {
        assert!(!FetchError::Api("NOTOK".into()).is_retryable());
        assert!(!FetchError::validation("Etherscan API key is required").is_retryable());
    }
}
