use serde_json::json;

use crate::backend::FetchError;

use super::ApiResponse;

/// Failure of a dashboard route, mapped onto an HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Missing or empty `X-User-ID`.
    #[error("{0}")]
    Unauthorized(String),
    /// Missing or invalid request input.
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
    /// The backend answered with a non-success status; relayed as-is.
    #[error("{message} (HTTP {status})")]
    Upstream {
        status: u16,
        message: String,
        details: String,
    },
    /// Anything unexpected. The detail is logged, never sent to the client.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ProxyError {
    /// Classify a backend failure: upstream statuses are relayed, everything
    /// else is internal.
    pub fn from_backend(err: anyhow::Error, message: &str) -> Self {
        match err.downcast_ref::<FetchError>() {
            Some(FetchError::Status { status, body }) => Self::Upstream {
                status: *status,
                message: message.to_string(),
                details: body.clone(),
            },
            _ => Self::Internal(err),
        }
    }

    pub fn status(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::BadRequest(_) => 400,
            Self::NotFound(_) => 404,
            Self::Upstream { status, .. } => *status,
            Self::Internal(_) => 500,
        }
    }

    /// Render the JSON error body.
    pub fn into_response(self) -> ApiResponse {
        let status = self.status();
        let body = match self {
            Self::Upstream {
                message, details, ..
            } => json!({ "error": message, "details": details }),
            Self::Internal(e) => {
                log::error!("internal error: {e:#}");
                json!({ "error": "Internal server error" })
            }
            other => json!({ "error": other.to_string() }),
        };
        ApiResponse::json_value(status, &body)
    }
}
