//! `GET /api/download?file=NAME`: serve a report file from the backend
//! directory.
//!
//! Names are checked in order: present, no traversal, allowed extension.
//! Only then is the file system touched.

use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::config::schema::DownloadConfig;

use super::error::ProxyError;
use super::{ApiResponse, IncomingRequest};

/// Content types by lowercase extension.
const CONTENT_TYPES: &[(&str, &str)] = &[
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("pdf", "application/pdf"),
    ("json", "application/json"),
];

pub fn get_download(
    download: &DownloadConfig,
    req: &IncomingRequest,
) -> Result<ApiResponse, ProxyError> {
    let name = req
        .query_param("file")
        .filter(|f| !f.trim().is_empty())
        .ok_or_else(|| ProxyError::BadRequest("File parameter is required".to_string()))?;

    if is_traversal(&name) {
        return Err(ProxyError::BadRequest("Invalid file path".to_string()));
    }

    let extension = extension_of(&name)
        .filter(|ext| {
            download
                .allowed_extensions
                .iter()
                .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
        })
        .ok_or_else(|| ProxyError::BadRequest("File type not allowed".to_string()))?;

    let path = Path::new(&download.root_dir).join(&name);
    if !path.is_file() {
        return Err(ProxyError::NotFound("File not found".to_string()));
    }

    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    log::debug!("serving download {} ({} bytes)", path.display(), bytes.len());

    Ok(ApiResponse {
        status: 200,
        content_type: content_type_for(&extension).to_string(),
        headers: vec![("Content-Disposition".to_string(), content_disposition(&name))],
        body: bytes,
    })
}

/// `attachment` disposition for `name`. Names outside printable ASCII get an
/// ASCII `filename` fallback plus an RFC 5987 `filename*` with the UTF-8 name.
fn content_disposition(name: &str) -> String {
    let plain = |c: char| (c.is_ascii_graphic() || c == ' ') && c != '"';
    if name.chars().all(plain) {
        return format!("attachment; filename=\"{name}\"");
    }

    let fallback: String = name.chars().map(|c| if plain(c) { c } else { '_' }).collect();
    // form encoding writes spaces as '+' and escapes a literal '+'
    let encoded = url::form_urlencoded::byte_serialize(name.as_bytes())
        .collect::<String>()
        .replace('+', "%20");
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

fn is_traversal(name: &str) -> bool {
    name.contains("..") || name.contains('/') || name.contains('\\')
}

/// Lowercase extension without the dot. `None` for names without one.
fn extension_of(name: &str) -> Option<String> {
    let (stem, ext) = name.rsplit_once('.')?;
    (!stem.is_empty() && !ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

/// Unknown extensions fall back to `application/octet-stream`.
pub fn content_type_for(extension: &str) -> &'static str {
    CONTENT_TYPES
        .iter()
        .find(|(ext, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, ct)| *ct)
        .unwrap_or("application/octet-stream")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
