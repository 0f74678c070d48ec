//! Weather lookup error types.
//!
//! All variants are `Clone` so a single outcome can be handed to every caller
//! waiting on a coalesced fetch.

use thiserror::Error;

/// Top-level error returned by [`crate::WeatherClient::fetch_weather`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    /// The city name cannot form a valid request. Terminal: the user must
    /// edit the input.
    #[error("Invalid city name: {0}")]
    Encoding(String),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

impl WeatherError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Encoding(_) => "Please enter a valid city name.",
            Self::Network(e) => e.user_message(),
            Self::Decode(_) => "Received unexpected weather data. Please try again later.",
        }
    }

    /// Whether re-invoking the whole lookup might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Encoding(_) | Self::Decode(_) => false,
            Self::Network(e) => e.is_retryable(),
        }
    }
}

/// Transport and HTTP failures. Timeouts are their own variant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    Status { status: u16, message: String },

    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::Status { status: 401, .. } => {
                "Weather API key is invalid. Check settings."
            }
            NetworkError::Status { status: 404, .. } => {
                "City not found. Check the spelling and try again."
            }
            NetworkError::Status { status: 429, .. } => {
                "Too many weather requests. Please wait and try again."
            }
            NetworkError::Status { status, .. } if *status >= 500 => {
                "The weather service is experiencing issues. Please try again later."
            }
            NetworkError::Status { .. } => "The weather request failed. Please try again.",
            NetworkError::Body(_) => "The connection was interrupted. Please try again.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionFailed(_) | NetworkError::Timeout | NetworkError::Body(_) => {
                true
            }
            NetworkError::Status { status, .. } => *status >= 500 || *status == 429,
        }
    }
}

/// The provider response did not have the expected shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("Malformed weather payload: {0}")]
    Malformed(String),

    #[error("Weather payload has no condition entries")]
    EmptyConditions,
}

/// Extension trait for converting reqwest errors to our error types.
pub(crate) trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        // The request URL carries the API key; keep it out of the message.
        let err = self.without_url();
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_body() || err.is_decode() {
            NetworkError::Body(err.to_string())
        } else if let Some(status) = err.status() {
            NetworkError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(err.to_string())
        }
    }
}
