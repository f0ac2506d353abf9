/// Configuration schema and defaults for marketscope.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[backend]`, `[server]`, `[download]`, `[extractor]`, and `[logging]`.
///
/// Every field has a sensible built-in default. Users only need to set the
/// values they want to override.
use serde::{Deserialize, Serialize};

/// Backend base URL used when neither config nor environment sets one.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api/v1";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level marketscope configuration.
///
/// Maps directly to the `~/.marketscope/config.toml` and `.marketscope.toml`
/// file schemas. All sections and fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketscopeConfig {
    pub backend: BackendConfig,
    pub server: ServerConfig,
    pub download: DownloadConfig,
    pub extractor: ExtractorConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [backend]
// ---------------------------------------------------------------------------

/// External REST backend that the proxy routes forward to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL; `/monitoring/alerts` etc. are appended to it.
    pub api_url: String,
    /// Request timeout for upstream calls (milliseconds).
    pub timeout_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: 15_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [server]
// ---------------------------------------------------------------------------

/// Dashboard HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub addr: String,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9750".to_string(),
            open_browser: false,
        }
    }
}

// ---------------------------------------------------------------------------
// [download]
// ---------------------------------------------------------------------------

/// File download proxy settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Directory that download names are resolved against.
    pub root_dir: String,
    /// Allowed file extensions, without the dot. Compared case-insensitively.
    pub allowed_extensions: Vec<String>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            root_dir: "../backend".to_string(),
            allowed_extensions: ["txt", "html", "pdf", "json"]
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// [extractor]
// ---------------------------------------------------------------------------

/// How AI responses are turned into recommendations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractionStrategy {
    /// JSON block first; heuristic text sections when JSON yields nothing.
    #[default]
    JsonThenText,
    /// JSON block only.
    JsonOnly,
    /// Heuristic text sections only.
    TextOnly,
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::JsonThenText => write!(f, "json-then-text"),
            Self::JsonOnly => write!(f, "json-only"),
            Self::TextOnly => write!(f, "text-only"),
        }
    }
}

impl ExtractionStrategy {
    /// Parse a strategy name, accepting `-` or `_` separators.
    pub fn parse(val: &str) -> Option<Self> {
        match val.to_ascii_lowercase().replace('_', "-").as_str() {
            "json-then-text" | "auto" => Some(Self::JsonThenText),
            "json-only" | "json" => Some(Self::JsonOnly),
            "text-only" | "text" => Some(Self::TextOnly),
            _ => None,
        }
    }
}

/// Recommendation extractor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub strategy: ExtractionStrategy,
    /// Maximum recommendations returned per response.
    pub max_recommendations: usize,
    /// Responses shorter than this (chars) are not parsed at all.
    pub min_input_chars: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            strategy: ExtractionStrategy::default(),
            max_recommendations: 8,
            min_input_chars: 50,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether served requests are appended to the request log.
    pub enabled: bool,
    /// Request log path (JSONL). `~` expands to the home directory.
    pub path: String,
    /// Diagnostic log level when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.marketscope/requests.jsonl".to_string(),
            level: "info".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl MarketscopeConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `marketscope config init` to create a starting config file
    /// with all settings documented.
    pub fn default_toml() -> String {
        r#"# marketscope Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (MARKETSCOPE_*, NEXT_PUBLIC_API_URL)
#   2. Project config (.marketscope.toml in current directory)
#   3. User global config (~/.marketscope/config.toml)
#   4. Built-in defaults

[backend]
api_url = "http://127.0.0.1:8000/api/v1"
timeout_ms = 15000

[server]
addr = "127.0.0.1:9750"
open_browser = false

[download]
root_dir = "../backend"                          # Sibling backend directory
allowed_extensions = ["txt", "html", "pdf", "json"]

[extractor]
strategy = "json-then-text"   # json-then-text | json-only | text-only
max_recommendations = 8
min_input_chars = 50

[logging]
enabled = true
path = "~/.marketscope/requests.jsonl"
level = "info"                # used when RUST_LOG is unset
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = MarketscopeConfig::default();
        assert_eq!(config.backend.api_url, DEFAULT_API_URL);
        assert_eq!(config.server.addr, "127.0.0.1:9750");
        assert_eq!(config.download.root_dir, "../backend");
        assert_eq!(
            config.download.allowed_extensions,
            vec!["txt", "html", "pdf", "json"]
        );
        assert_eq!(config.extractor.strategy, ExtractionStrategy::JsonThenText);
        assert_eq!(config.extractor.max_recommendations, 8);
        assert!(config.logging.enabled);
    }

    #[test]
    fn deserialize_minimal_toml() {
        let toml_str = r#"
[backend]
api_url = "https://backend.example.test/api/v1"
"#;
        let config: MarketscopeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.api_url, "https://backend.example.test/api/v1");
        // Everything else falls back to defaults
        assert_eq!(config.backend.timeout_ms, 15_000);
        assert_eq!(config.extractor.min_input_chars, 50);
    }

    #[test]
    fn deserialize_full_toml() {
        let toml_str = r#"
[backend]
api_url = "http://backend:8000"
timeout_ms = 2000

[server]
addr = "0.0.0.0:8080"
open_browser = true

[download]
root_dir = "/srv/reports"
allowed_extensions = ["txt"]

[extractor]
strategy = "text-only"
max_recommendations = 5
min_input_chars = 100

[logging]
enabled = false
path = "/tmp/marketscope.jsonl"
level = "debug"
"#;
        let config: MarketscopeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.backend.timeout_ms, 2000);
        assert!(config.server.open_browser);
        assert_eq!(config.download.allowed_extensions, vec!["txt"]);
        assert_eq!(config.extractor.strategy, ExtractionStrategy::TextOnly);
        assert_eq!(config.extractor.max_recommendations, 5);
        assert!(!config.logging.enabled);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn empty_toml_produces_defaults() {
        let config: MarketscopeConfig = toml::from_str("").unwrap();
        assert_eq!(config.backend.api_url, DEFAULT_API_URL);
        assert_eq!(config.extractor.strategy, ExtractionStrategy::JsonThenText);
    }

    #[test]
    fn default_toml_parses_back() {
        let config: MarketscopeConfig = toml::from_str(&MarketscopeConfig::default_toml()).unwrap();
        assert_eq!(config.backend.api_url, DEFAULT_API_URL);
        assert_eq!(config.extractor.max_recommendations, 8);
    }

    #[test]
    fn strategy_parse_and_display() {
        assert_eq!(
            ExtractionStrategy::parse("json_only"),
            Some(ExtractionStrategy::JsonOnly)
        );
        assert_eq!(
            ExtractionStrategy::parse("TEXT"),
            Some(ExtractionStrategy::TextOnly)
        );
        assert_eq!(ExtractionStrategy::parse("magic"), None);
        assert_eq!(ExtractionStrategy::JsonThenText.to_string(), "json-then-text");
    }
}
