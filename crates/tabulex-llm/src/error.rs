//! Error taxonomy for the LLM boundary.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// Credentials absent or rejected. Fatal for the whole run.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Rate limit, server fault, or network hiccup. Retryable.
    #[error("transient provider fault: {0}")]
    Transient(String),

    /// Any other per-call provider failure. Not retryable.
    #[error("provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("HTTP request failed: {0}")]
    Http(reqwest::Error),

    #[error("response decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ModelError {
    /// Only `Transient` faults qualify for retry; content-level defects
    /// never do.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ModelError::Transient(_))
    }
}

impl From<reqwest::Error> for ModelError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            ModelError::Transient(err.to_string())
        } else {
            ModelError::Http(err)
        }
    }
}

/// Map a non-success HTTP status onto the taxonomy.
pub(crate) fn classify_status(status: StatusCode, body: String) -> ModelError {
    match status.as_u16() {
        401 | 403 => ModelError::Auth(format!("{status}: {body}")),
        429 => ModelError::Transient(format!("rate limited: {body}")),
        s if s >= 500 => ModelError::Transient(format!("{status}: {body}")),
        s => ModelError::Provider { status: s, body },
    }
}

/// Read an API key from the environment, mapping absence to `Auth`.
pub(crate) fn key_from_env(var: &str) -> Result<String, ModelError> {
    std::env::var(var).map_err(|_| ModelError::Auth(format!("{var} is not set")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(
            classify_status(StatusCode::UNAUTHORIZED, String::new()),
            ModelError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::FORBIDDEN, String::new()),
            ModelError::Auth(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            ModelError::Transient(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_GATEWAY, String::new()),
            ModelError::Transient(_)
        ));
        assert!(matches!(
            classify_status(StatusCode::BAD_REQUEST, "bad".into()),
            ModelError::Provider { status: 400, .. }
        ));
    }

    #[test]
    fn only_transient_is_retryable() {
        assert!(ModelError::Transient("x".into()).is_retryable());
        assert!(!ModelError::Auth("x".into()).is_retryable());
        assert!(
            !ModelError::Provider {
                status: 400,
                body: String::new()
            }
            .is_retryable()
        );
    }
}
