use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;

use crate::{config::ConfigError, platform::PlatformError};

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    ConfigError(#[from] ConfigError),

    /// Carries the platform's own message.
    #[error("{0}")]
    PlatformError(#[from] PlatformError),

    #[error("Io Error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Form Rejection Error: {0}")]
    AxumFormRejection(#[from] axum::extract::rejection::FormRejection),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid group id")]
    InvalidGroupId,

    #[error("Both email and password are required.")]
    MissingCredentials,

    #[error("Invalid login rate limit configuration")]
    RateLimitConfig,

    // ! Auth
    #[error("{0}")]
    Unauthenticated(&'static str),
}

impl IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            Error::ConfigError(error) => {
                error!("Config Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::PlatformError(error) => {
                error!("Platform Error:{:#?}", error);
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            Error::IoError(error) => {
                error!("Io  Error:{:#?}", error);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
            Error::AxumFormRejection(error) => (StatusCode::BAD_REQUEST, error.to_string()),
            error @ (Error::MissingField(_) | Error::InvalidGroupId | Error::MissingCredentials) => {
                (StatusCode::BAD_REQUEST, error.to_string())
            }
            Error::Unauthenticated(message) => (StatusCode::UNAUTHORIZED, message.to_string()),
            Error::RateLimitConfig => {
                error!("Rate limit configuration rejected");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Error".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}
