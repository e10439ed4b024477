use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out")]
    Timeout,

    /// The backend rejected the bearer token. The caller reloads the session
    /// after `reload_after` instead of retrying the request.
    #[error("Session expired, reload in {reload_after:?}")]
    SessionExpired { reload_after: Duration },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("HTTP {status}: {detail}")]
    Http { status: StatusCode, detail: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("No session token")]
    NotAuthenticated,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl ApiError {
    /// Message suitable for an alert: the backend detail when there is one.
    pub fn detail(&self) -> String {
        match self {
            ApiError::Forbidden(detail) | ApiError::Http { detail, .. } => detail.clone(),
            ApiError::SessionExpired { .. } => "Oturum süresi doldu".to_string(),
            ApiError::NotAuthenticated => "Oturum açılmadı".to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_prefers_the_backend_message() {
        let err = ApiError::Http {
            status: StatusCode::CONFLICT,
            detail: "3/2024 dönemi için kayıt zaten mevcut".to_string(),
        };
        assert_eq!(err.detail(), "3/2024 dönemi için kayıt zaten mevcut");
        assert_eq!(
            err.to_string(),
            "HTTP 409 Conflict: 3/2024 dönemi için kayıt zaten mevcut"
        );
    }
}
