//! JSON API handlers for the dashboard that are not plain proxies.
//!
//! Each handler corresponds to an API endpoint and returns an
//! [`ApiResponse`] with JSON content, or a [`ProxyError`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::analytics::logger;
use crate::analytics::reporter::{self, TrendEntry};
use crate::config::{self, schema::ExtractionStrategy};
use crate::insights::{self, AlertDigest, CompetitorSummary, PlatformSummary};
use crate::recommendations::{self, Recommendation};

use super::error::ProxyError;
use super::{ApiResponse, AppContext, IncomingRequest};

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of `POST /api/recommendations/extract`.
#[derive(Debug, Deserialize)]
struct ExtractRequest {
    text: String,
    #[serde(default)]
    strategy: Option<String>,
}

#[derive(Debug, Serialize)]
struct ExtractResponse {
    count: usize,
    recommendations: Vec<Recommendation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    competitive_analysis: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct CompetitorsSummaryResponse {
    competitors: Vec<CompetitorSummary>,
    platforms: Vec<PlatformSummary>,
    /// Active competitors with no monitored posts.
    quiet_competitors: Vec<String>,
    alerts: AlertDigest,
}

#[derive(Debug, Serialize)]
struct TrendResponse {
    days: u32,
    entries: Vec<TrendEntry>,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    backend_url: String,
    backend_reachable: bool,
    download_dir: String,
    download_dir_exists: bool,
    config_exists: bool,
    request_log_exists: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `POST /api/recommendations/extract` — structure an AI response.
pub fn post_extract(ctx: &AppContext, body: Option<&str>) -> Result<ApiResponse, ProxyError> {
    let req: ExtractRequest = serde_json::from_str(body.unwrap_or_default())
        .map_err(|e| ProxyError::BadRequest(format!("invalid extract request: {e}")))?;

    let mut extractor = ctx.config.extractor.clone();
    if let Some(name) = req.strategy.as_deref() {
        extractor.strategy = ExtractionStrategy::parse(name)
            .ok_or_else(|| ProxyError::BadRequest(format!("unknown strategy: '{name}'")))?;
    }

    let extraction = recommendations::extract(&req.text, &extractor);
    Ok(ApiResponse::json(
        200,
        &ExtractResponse {
            count: extraction.recommendations.len(),
            recommendations: extraction.recommendations,
            competitive_analysis: extraction.competitive_analysis,
        },
    ))
}

/// `GET /api/v1/competitors/summary` — posts and alerts aggregated for the
/// dashboard cards.
pub fn get_competitors_summary(
    ctx: &AppContext,
    req: &IncomingRequest,
) -> Result<ApiResponse, ProxyError> {
    let user_id = req.user_id()?;

    let competitors = ctx
        .client
        .fetch_competitors(user_id)
        .map_err(|e| ProxyError::from_backend(e, "Failed to fetch competitors"))?;
    let posts = ctx
        .client
        .fetch_posts(user_id)
        .map_err(|e| ProxyError::from_backend(e, "Failed to fetch posts"))?;
    let alerts = ctx
        .client
        .fetch_alerts(user_id)
        .map_err(|e| ProxyError::from_backend(e, "Failed to fetch alerts"))?;

    Ok(ApiResponse::json(
        200,
        &CompetitorsSummaryResponse {
            competitors: insights::summarize_by_competitor(&posts),
            platforms: insights::summarize_by_platform(&posts),
            quiet_competitors: insights::quiet_competitors(&competitors, &posts),
            alerts: insights::digest_alerts(&alerts),
        },
    ))
}

/// `GET /api/stats?days=N` — request statistics from the request log.
pub fn get_stats(ctx: &AppContext, req: &IncomingRequest) -> Result<ApiResponse, ProxyError> {
    let days = req.query_param("days").and_then(|d| d.parse().ok());
    let stats = reporter::compute_stats(&logger::request_log_path(&ctx.config.logging), days);
    Ok(ApiResponse::json(200, &stats))
}

/// `GET /api/trends?days=N` — requests and errors per day (default 30 days).
pub fn get_trends(ctx: &AppContext, req: &IncomingRequest) -> Result<ApiResponse, ProxyError> {
    let days = req
        .query_param("days")
        .and_then(|d| d.parse().ok())
        .unwrap_or(30);
    let entries = reporter::compute_trends(&logger::request_log_path(&ctx.config.logging), days);
    Ok(ApiResponse::json(200, &TrendResponse { days, entries }))
}

/// `GET /api/health` — backend reachability and local file checks.
pub fn get_health(ctx: &AppContext) -> Result<ApiResponse, ProxyError> {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        backend_url: ctx.client.base_url().to_string(),
        backend_reachable: ctx.client.is_healthy(),
        download_dir: ctx.config.download.root_dir.clone(),
        download_dir_exists: Path::new(&ctx.config.download.root_dir).is_dir(),
        config_exists,
        request_log_exists: logger::request_log_path(&ctx.config.logging).exists(),
    };

    Ok(ApiResponse::json(200, &resp))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
