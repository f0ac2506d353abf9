//! Embedded web dashboard for marketscope.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard (alerts, competitor summary, AI recommendations)
//! - Same-origin proxy routes for monitoring alerts and report downloads
//! - JSON API endpoints for extraction, competitor summaries, stats, health
//!
//! Launched via `marketscope serve` (default: `http://127.0.0.1:9750`).
//!
//! Routing works on [`IncomingRequest`] / [`ApiResponse`] so handlers can be
//! exercised without a socket; only [`serve`] touches `tiny_http` types.

pub mod alerts;
pub mod api;
pub mod download;
pub mod error;
mod frontend;

use std::io::Read;
use std::time::Instant;

use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Response, Server, StatusCode};

pub use tiny_http::Method;

use crate::analytics::logger;
use crate::backend::{BackendClient, USER_ID_HEADER};
use crate::config::MarketscopeConfig;

use error::ProxyError;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A request as seen by the router.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    /// Path plus query string.
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl IncomingRequest {
    pub fn new(method: Method, url: &str) -> Self {
        Self {
            method,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = Some(body.to_string());
        self
    }

    /// Path without the query string.
    pub fn path(&self) -> &str {
        self.url.split('?').next().unwrap_or(&self.url)
    }

    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Percent-decoded query parameter; the first occurrence wins.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let (_, query) = self.url.split_once('?')?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }

    /// The trimmed `X-User-ID` header, or 401.
    pub fn user_id(&self) -> Result<&str, ProxyError> {
        self.header(USER_ID_HEADER)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ProxyError::Unauthorized("User ID is required".to_string()))
    }
}

/// A response produced by the router.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: String,
    /// Extra headers besides `Content-Type`.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Serialize `data` as the JSON body.
    pub fn json<T: Serialize>(status: u16, data: &T) -> Self {
        match serde_json::to_vec(data) {
            Ok(body) => Self::raw(status, "application/json; charset=utf-8", body),
            Err(e) => ProxyError::Internal(
                anyhow::Error::new(e).context("failed to serialize JSON response"),
            )
            .into_response(),
        }
    }

    pub fn json_value(status: u16, value: &serde_json::Value) -> Self {
        Self::raw(
            status,
            "application/json; charset=utf-8",
            value.to_string().into_bytes(),
        )
    }

    fn raw(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            content_type: content_type.to_string(),
            headers: Vec::new(),
            body,
        }
    }

    /// Header value by case-insensitive name, including `Content-Type`.
    pub fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("content-type") {
            return Some(&self.content_type);
        }
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn into_tiny_http(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut resp = Response::from_data(self.body).with_status_code(StatusCode(self.status));
        let headers = std::iter::once(("Content-Type".to_string(), self.content_type))
            .chain(self.headers);
        for (name, value) in headers {
            match Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                Ok(header) => resp = resp.with_header(header),
                Err(()) => log::warn!("dropping invalid response header {name}: {value}"),
            }
        }
        resp
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Shared state handed to every route.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: MarketscopeConfig,
    pub client: BackendClient,
}

impl AppContext {
    pub fn new(config: MarketscopeConfig) -> Self {
        let client = BackendClient::from_config(&config.backend);
        Self { config, client }
    }
}

/// Start the dashboard server on `config.server.addr`.
///
/// Blocks the current thread. Handles requests sequentially (sufficient for
/// a local single-user dashboard). Errors are handled per request without
/// stopping the server.
pub fn serve(config: MarketscopeConfig) -> Result<()> {
    let addr = config.server.addr.clone();
    let server = Server::http(&addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;
    let ctx = AppContext::new(config);

    println!("marketscope dashboard running at http://{addr}");
    println!("Proxying backend at {}", ctx.client.base_url());
    println!("Press Ctrl+C to stop.\n");

    if ctx.config.server.open_browser
        && let Err(e) = open_browser(&format!("http://{addr}"))
    {
        log::warn!("{e:#}");
    }

    for mut request in server.incoming_requests() {
        let started = Instant::now();

        // Read body up-front for methods that carry one
        let body = if matches!(request.method(), Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            match request.as_reader().read_to_string(&mut buf) {
                Ok(_) => Some(buf),
                Err(e) => {
                    log::warn!("failed to read request body: {e}");
                    None
                }
            }
        } else {
            None
        };

        let incoming = IncomingRequest {
            method: request.method().clone(),
            url: request.url().to_string(),
            headers: request
                .headers()
                .iter()
                .map(|h| (h.field.to_string(), h.value.to_string()))
                .collect(),
            body,
        };

        let response = dispatch(&ctx, &incoming);
        let status = response.status;
        if let Err(e) = request.respond(response.into_tiny_http()) {
            log::warn!("failed to send response: {e}");
        }

        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        log::info!("{} {} {status} {latency_ms}ms", incoming.method, incoming.path());
        logger::log_request(
            &ctx.config.logging,
            &incoming.method.to_string(),
            &incoming.url,
            status,
            latency_ms,
            incoming.user_id().is_ok(),
        );
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch a request to the matching handler. Never fails: route errors
/// become JSON error responses.
pub fn dispatch(ctx: &AppContext, req: &IncomingRequest) -> ApiResponse {
    let result = match (&req.method, req.path()) {
        // Frontend
        (Method::Get, "/") | (Method::Get, "/index.html") => Ok(serve_frontend()),

        // Proxies
        (Method::Get, "/api/v1/monitoring/alerts") => alerts::get_alerts(ctx, req),
        (Method::Get, "/api/download") => download::get_download(&ctx.config.download, req),

        // API
        (Method::Post, "/api/recommendations/extract") => {
            api::post_extract(ctx, req.body.as_deref())
        }
        (Method::Get, "/api/v1/competitors/summary") => api::get_competitors_summary(ctx, req),
        (Method::Get, "/api/stats") => api::get_stats(ctx, req),
        (Method::Get, "/api/trends") => api::get_trends(ctx, req),
        (Method::Get, "/api/health") => api::get_health(ctx),

        _ => Err(ProxyError::NotFound("not found".to_string())),
    };

    result.unwrap_or_else(ProxyError::into_response)
}

fn serve_frontend() -> ApiResponse {
    ApiResponse::raw(
        200,
        "text/html; charset=utf-8",
        frontend::INDEX_HTML.as_bytes().to_vec(),
    )
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
