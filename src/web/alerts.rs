//! `GET /api/v1/monitoring/alerts`: same-origin proxy to the backend.

use anyhow::Context;
use serde_json::Value;

use crate::backend::FetchError;

use super::error::ProxyError;
use super::{ApiResponse, AppContext, IncomingRequest};

const UPSTREAM_PATH: &str = "monitoring/alerts";

/// Forward the caller's alert request to the backend.
///
/// The user header is checked before any upstream call. Upstream non-success
/// statuses are relayed with the upstream body as `details`.
pub fn get_alerts(ctx: &AppContext, req: &IncomingRequest) -> Result<ApiResponse, ProxyError> {
    let user_id = req.user_id()?;

    let body = ctx
        .client
        .get_text(UPSTREAM_PATH, user_id)
        .map_err(|e| match e {
            FetchError::Status { status, body } => ProxyError::Upstream {
                status,
                message: "Failed to fetch alerts".to_string(),
                details: body,
            },
            transport @ FetchError::Transport(_) => {
                ProxyError::Internal(anyhow::Error::new(transport))
            }
        })?;

    let alerts: Value =
        serde_json::from_str(&body).context("backend returned invalid JSON for alerts")?;
    Ok(ApiResponse::json_value(200, &alerts))
}
