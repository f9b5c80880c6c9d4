use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::modules::credential::CredentialError;

const GENERIC_INTERNAL_MESSAGE: &str = "Internal server error";

/// Gate-level reason for a 401
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnauthorizedReason {
    #[error("Missing authentication token")]
    Missing,
    #[error("Invalid token")]
    Invalid,
}

impl From<CredentialError> for UnauthorizedReason {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => Self::Missing,
            CredentialError::Invalid => Self::Invalid,
        }
    }
}

#[derive(Error, Debug)]
pub enum PortalError {
    /// Login without a token
    #[error("Token is required")]
    MissingCredential,

    /// Login with the wrong token
    #[error("Invalid authentication token")]
    InvalidCredential,

    /// Data request refused by the auth gate
    #[error("Unauthorized: {0}")]
    Unauthorized(UnauthorizedReason),

    #[error("External API error: {status}")]
    UpstreamError { status: u16 },

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl PortalError {
    /// Login-surface mapping of a credential failure
    pub fn from_login(err: CredentialError) -> Self {
        match err {
            CredentialError::Missing => Self::MissingCredential,
            CredentialError::Invalid => Self::InvalidCredential,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::MissingCredential => StatusCode::BAD_REQUEST,
            PortalError::InvalidCredential | PortalError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            PortalError::UpstreamError { .. } | PortalError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Upstream and internal details stay in the server log
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            GENERIC_INTERNAL_MESSAGE.to_string()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
