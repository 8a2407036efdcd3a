use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntelError {
    #[error("Invalid request body: {0}")]
    MalformedInvalidationRequest(String),

    #[error("No target IP: request named none and the requester IP is unknown")]
    MissingTargetIp,

    #[error("Invalid registry base URL: {0}")]
    InvalidRegistryUrl(String),

    #[error("HTTP client setup failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Cache operation failed: {0}")]
    Cache(String),
}

impl IntelError {
    /// True for errors caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            IntelError::MalformedInvalidationRequest(_) | IntelError::MissingTargetIp
        )
    }
}

pub type Result<T> = std::result::Result<T, IntelError>;
