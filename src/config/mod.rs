/// Configuration system for marketscope.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::MarketscopeConfig::default()`]
/// 2. **User global config** — `~/.marketscope/config.toml`
/// 3. **Project local config** — `.marketscope.toml` in the current working directory
/// 4. **Environment variables** — `MARKETSCOPE_*` overrides (highest precedence)
///
/// `NEXT_PUBLIC_API_URL` is honoured as a lower-precedence alias of
/// `MARKETSCOPE_API_URL` so existing deployments keep their backend URL.
///
/// # Usage
///
/// ```rust,ignore
/// use marketscope::config;
///
/// let cfg = config::load();
/// let client = BackendClient::from_config(&cfg.backend);
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::MarketscopeConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Never fails; unreadable layers are skipped.
pub fn load() -> MarketscopeConfig {
    let mut merged = toml::Value::Table(toml::map::Map::new());

    // Layer 2: user global config (~/.marketscope/config.toml)
    if let Some(global) = load_toml_file(global_config_path()) {
        merge_toml(&mut merged, global);
    }

    // Layer 3: project local config (.marketscope.toml)
    if let Some(project) = load_toml_file(project_config_path()) {
        merge_toml(&mut merged, project);
    }

    // Layer 1 fills whatever the files leave unset via `serde(default)`.
    let mut config: MarketscopeConfig = match merged.try_into() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("ignoring config files with invalid values: {e}");
            MarketscopeConfig::default()
        }
    };

    // Layer 4: environment variable overrides
    apply_env_overrides(&mut config);

    config
}

/// Load a TOML config file from the given path (if it exists).
///
/// Returns `None` if the path is `None`, the file doesn't exist, or the
/// content is malformed.
fn load_toml_file(path: Option<PathBuf>) -> Option<toml::Value> {
    let path = path?;
    let content = fs::read_to_string(&path).ok()?;
    match toml::from_str(&content) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

/// Deep-merge `overlay` into `base`: tables merge key by key, any other
/// value in the overlay replaces the base value.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.marketscope/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".marketscope").join("config.toml"))
}

/// Path to the project local config: `.marketscope.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".marketscope.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~/` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(path)
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `MARKETSCOPE_API_URL` — backend base URL (wins over `NEXT_PUBLIC_API_URL`)
/// - `NEXT_PUBLIC_API_URL` — backend base URL
/// - `MARKETSCOPE_ADDR` — dashboard listen address
/// - `MARKETSCOPE_DOWNLOAD_DIR` — download root directory
/// - `MARKETSCOPE_EXTRACTOR` — extraction strategy
/// - `MARKETSCOPE_LOGGING` — request log enabled (`1`/`true`/`yes`/`on`)
/// - `MARKETSCOPE_LOG_LEVEL` — diagnostic log level
fn apply_env_overrides(config: &mut MarketscopeConfig) {
    // Backend
    if let Some(url) =
        non_empty_var("MARKETSCOPE_API_URL").or_else(|| non_empty_var("NEXT_PUBLIC_API_URL"))
    {
        config.backend.api_url = url;
    }

    // Server / download
    if let Some(addr) = non_empty_var("MARKETSCOPE_ADDR") {
        config.server.addr = addr;
    }
    if let Some(dir) = non_empty_var("MARKETSCOPE_DOWNLOAD_DIR") {
        config.download.root_dir = dir;
    }

    // Extractor
    if let Some(val) = non_empty_var("MARKETSCOPE_EXTRACTOR")
        && let Some(strategy) = schema::ExtractionStrategy::parse(&val)
    {
        config.extractor.strategy = strategy;
    }

    // Logging
    if let Ok(val) = std::env::var("MARKETSCOPE_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }
    if let Some(level) = non_empty_var("MARKETSCOPE_LOG_LEVEL") {
        config.logging.level = level;
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.marketscope/config.toml`.
///
/// Creates the directory if it doesn't exist. Returns an error if the file
/// already exists (use `force = true` to overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.marketscope/ directory")?;
    }

    fs::write(&path, MarketscopeConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Reads the current global config (or defaults), updates the specified key,
/// and writes the result back. Supports dotted keys like `backend.api_url`.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&MarketscopeConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that no longer deserialize into the schema.
    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    toml::from_str::<MarketscopeConfig>(&output)
        .with_context(|| format!("invalid value for '{key}': '{value}'"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    // Navigate to the parent table
    let mut current = root;
    for &part in sections {
        current = current
            .get_mut(part)
            .with_context(|| format!("config key not found: section '{part}' in '{key}'"))?;
    }

    let table = current.as_table_mut().with_context(|| {
        format!(
            "expected table at '{}'",
            key.rsplit_once('.').map(|(s, _)| s).unwrap_or("")
        )
    })?;

    let new_value = match table.get(*leaf) {
        Some(toml::Value::Boolean(_)) => toml::Value::Boolean(is_truthy(raw_value)),
        Some(toml::Value::Integer(_)) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        Some(toml::Value::Array(_)) => {
            // Comma-separated list
            let items: Vec<toml::Value> = raw_value
                .split(',')
                .map(|s| toml::Value::String(s.trim().to_string()))
                .filter(|v| v.as_str().is_some_and(|s| !s.is_empty()))
                .collect();
            toml::Value::Array(items)
        }
        Some(_) => toml::Value::String(raw_value.to_string()),
        None => anyhow::bail!("unknown config key: '{key}'"),
    };

    table.insert((*leaf).to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("true"));
        assert!(is_truthy("YES"));
        assert!(is_truthy("on"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn expand_home_leaves_absolute_paths() {
        assert_eq!(expand_home("/var/log/x.jsonl"), PathBuf::from("/var/log/x.jsonl"));
    }

    #[test]
    fn expand_home_resolves_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/a/b.jsonl"), home.join("a").join("b.jsonl"));
        }
    }

    #[test]
    fn merge_toml_keeps_keys_from_lower_layers() {
        let mut base: toml::Value =
            toml::from_str("[backend]\napi_url = \"http://a\"\ntimeout_ms = 5\n").unwrap();
        let overlay: toml::Value =
            toml::from_str("[backend]\ntimeout_ms = 9\n[server]\naddr = \"0.0.0.0:1\"\n")
                .unwrap();
        merge_toml(&mut base, overlay);

        let config: MarketscopeConfig = base.try_into().unwrap();
        assert_eq!(config.backend.api_url, "http://a");
        assert_eq!(config.backend.timeout_ms, 9);
        assert_eq!(config.server.addr, "0.0.0.0:1");
        assert_eq!(config.extractor.max_recommendations, 8);
    }

    #[test]
    fn set_toml_value_updates_string() {
        let mut root: toml::Value = toml::from_str("[backend]\napi_url = \"http://a\"\n").unwrap();
        set_toml_value(&mut root, "backend.api_url", "http://b").unwrap();
        assert_eq!(root["backend"]["api_url"].as_str(), Some("http://b"));
    }

    #[test]
    fn set_toml_value_updates_bool_and_integer() {
        let mut root: toml::Value =
            toml::from_str("[logging]\nenabled = true\n[backend]\ntimeout_ms = 100\n").unwrap();
        set_toml_value(&mut root, "logging.enabled", "off").unwrap();
        set_toml_value(&mut root, "backend.timeout_ms", "2500").unwrap();
        assert_eq!(root["logging"]["enabled"].as_bool(), Some(false));
        assert_eq!(root["backend"]["timeout_ms"].as_integer(), Some(2500));
    }

    #[test]
    fn set_toml_value_splits_arrays() {
        let mut root: toml::Value =
            toml::from_str("[download]\nallowed_extensions = [\"txt\"]\n").unwrap();
        set_toml_value(&mut root, "download.allowed_extensions", "txt, csv,").unwrap();
        let items: Vec<&str> = root["download"]["allowed_extensions"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert_eq!(items, vec!["txt", "csv"]);
    }

    #[test]
    fn set_toml_value_rejects_unknown_keys() {
        let mut root: toml::Value = toml::from_str("[backend]\napi_url = \"x\"\n").unwrap();
        assert!(set_toml_value(&mut root, "nonexistent.key", "v").is_err());
        assert!(set_toml_value(&mut root, "backend.nope", "v").is_err());
        assert!(set_toml_value(&mut root, "", "v").is_err());
    }

    #[test]
    fn set_toml_value_rejects_bad_integer() {
        let mut root: toml::Value = toml::from_str("[backend]\ntimeout_ms = 1\n").unwrap();
        assert!(set_toml_value(&mut root, "backend.timeout_ms", "soon").is_err());
    }
}
