//! CLI command implementations for marketscope.
//!
//! Provides subcommand handlers for:
//! - `marketscope extract [FILE]` — structure an AI response into recommendations
//! - `marketscope alerts --user ID` — list monitoring alerts
//! - `marketscope competitors --user ID` — per-competitor / per-platform summary
//! - `marketscope settings --user ID` — preferences and the next wizard step
//! - `marketscope stats` — dashboard request statistics
//! - `marketscope trends` — requests and errors per day
//! - `marketscope health` — backend, download directory, config, request log
//! - `marketscope config show|init|set|reset` — configuration management

use std::fs;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::analytics::logger;
use crate::analytics::reporter::{self, Stats, TrendEntry};
use crate::backend::BackendClient;
use crate::config::{self, MarketscopeConfig, schema::ExtractionStrategy};
use crate::insights::{self, CompetitorSummary};
use crate::recommendations::{self, Extraction, Priority};

/// Output format for listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

// ---------------------------------------------------------------------------
// marketscope extract
// ---------------------------------------------------------------------------

/// Extract recommendations from a file, or stdin when no file is given.
pub fn run_extract(
    cfg: &MarketscopeConfig,
    file: Option<&Path>,
    strategy: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let text = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let mut extractor = cfg.extractor.clone();
    if let Some(name) = strategy {
        extractor.strategy = ExtractionStrategy::parse(name).with_context(|| {
            format!("unknown strategy '{name}' (json-then-text | json-only | text-only)")
        })?;
    }

    let extraction = recommendations::extract(&text, &extractor);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&extraction)?),
        OutputFormat::Csv => print_extraction_csv(&extraction),
        OutputFormat::Table => print_extraction_table(&extraction),
    }
    Ok(())
}

fn print_extraction_table(extraction: &Extraction) {
    if extraction.recommendations.is_empty() {
        println!("{}", "No recommendations found.".yellow());
        return;
    }

    println!(
        "{} {}",
        "Recommendations".bold().cyan(),
        format!("({:?} parser)", extraction.source).dimmed()
    );
    println!("{}", "=".repeat(60));

    for rec in &extraction.recommendations {
        println!();
        println!("  {} {}", colorize_priority(rec.priority), rec.title.bold());
        if let Some(campaign) = &rec.campaign {
            println!("    {} {}", "Campaign:".dimmed(), campaign);
        }
        if let Some(competitor) = &rec.competitor {
            println!("    {} {}", "Competitor:".dimmed(), competitor);
        }
        println!(
            "    {} {} · impact {} · effort {} · {}",
            "Type:".dimmed(),
            rec.action_type,
            rec.impact,
            rec.effort,
            rec.estimated_time
        );
        println!("    {}", rec.description);
    }
}

fn print_extraction_csv(extraction: &Extraction) {
    println!("priority,action_type,title,campaign,description");
    for rec in &extraction.recommendations {
        println!(
            "{},{},{},{},{}",
            rec.priority,
            rec.action_type,
            csv_field(&rec.title),
            csv_field(rec.campaign.as_deref().unwrap_or("")),
            csv_field(&rec.description),
        );
    }
}

// ---------------------------------------------------------------------------
// marketscope alerts / competitors / settings
// ---------------------------------------------------------------------------

/// List the user's monitoring alerts.
pub fn run_alerts(cfg: &MarketscopeConfig, user: &str, format: OutputFormat) -> Result<()> {
    let client = BackendClient::from_config(&cfg.backend);
    let alerts = client.fetch_alerts(user)?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }
    if alerts.is_empty() {
        println!("{}", "No alerts.".yellow());
        return Ok(());
    }

    let digest = insights::digest_alerts(&alerts);
    println!("{}", "Monitoring Alerts".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {} {}   {} {}",
        "Total:".bold(),
        digest.total,
        "Unread:".bold(),
        digest.unread
    );
    println!();

    for alert in &alerts {
        let severity = alert.severity.as_deref().unwrap_or("-");
        let marker = if alert.is_read { " " } else { "•" };
        println!(
            "  {} {:<8} {:<20} {}",
            marker.cyan(),
            colorize_severity(severity),
            truncate(alert.competitor_name.as_deref().unwrap_or("-"), 20),
            alert.title.as_deref().unwrap_or(&alert.message)
        );
    }
    Ok(())
}

/// Show per-competitor and per-platform aggregates of monitored posts.
pub fn run_competitors(cfg: &MarketscopeConfig, user: &str, format: OutputFormat) -> Result<()> {
    let client = BackendClient::from_config(&cfg.backend);
    let competitors = client.fetch_competitors(user)?;
    let posts = client.fetch_posts(user)?;
    let summaries = insights::summarize_by_competitor(&posts);
    let quiet = insights::quiet_competitors(&competitors, &posts);

    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "competitors": summaries,
                "platforms": insights::summarize_by_platform(&posts),
                "quiet_competitors": quiet,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Csv => print_competitors_csv(&summaries),
        OutputFormat::Table => print_competitors_table(&summaries, &quiet),
    }
    Ok(())
}

fn print_competitors_table(summaries: &[CompetitorSummary], quiet: &[String]) {
    if summaries.is_empty() && quiet.is_empty() {
        println!("{}", "No data available.".yellow());
        return;
    }

    println!("{}", "Competitor Activity".bold().cyan());
    println!("{}", "=".repeat(60));
    println!(
        "  {:<20} {:>6} {:>10} {:>12}  Top platform",
        "Competitor", "Posts", "Sentiment", "Engagement"
    );
    println!("  {}", "-".repeat(58));

    for (i, s) in summaries.iter().enumerate() {
        let line = format!(
            "  {:<20} {:>6} {:>10} {:>12.1}  {}",
            truncate(&s.competitor, 20),
            s.post_count,
            s.sentiment_label.unwrap_or("n/a"),
            s.avg_engagement,
            s.platforms.first().map(|p| p.platform.as_str()).unwrap_or("-"),
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }

    if !quiet.is_empty() {
        println!();
        println!("  {} {}", "No recent posts:".bold(), quiet.join(", ").dimmed());
    }
}

fn print_competitors_csv(summaries: &[CompetitorSummary]) {
    println!("competitor,posts,avg_sentiment,avg_engagement,total_views");
    for s in summaries {
        println!(
            "{},{},{},{:.1},{}",
            csv_field(&s.competitor),
            s.post_count,
            s.avg_sentiment.map(|v| format!("{v:.3}")).unwrap_or_default(),
            s.avg_engagement,
            s.total_views,
        );
    }
}

/// Show the user's preferences and where the settings wizard would resume.
pub fn run_settings(cfg: &MarketscopeConfig, user: &str) -> Result<()> {
    let client = BackendClient::from_config(&cfg.backend);
    let prefs = client.fetch_preferences(user)?;

    let unset = || "not set".dimmed().to_string();

    println!("{}", "Marketing Preferences".bold().cyan());
    println!("{}", "=".repeat(40));
    println!(
        "  {:<16} {}",
        "Industry".bold(),
        prefs.industry.clone().unwrap_or_else(unset)
    );
    println!(
        "  {:<16} {}",
        "Company size".bold(),
        prefs
            .company_size
            .map(|s| format!("{s:?}").to_lowercase())
            .unwrap_or_else(unset)
    );
    println!(
        "  {:<16} {}",
        "Monthly budget".bold(),
        prefs
            .monthly_budget
            .map(|b| format!("${b:.0}"))
            .unwrap_or_else(unset)
    );
    println!(
        "  {:<16} {}",
        "Goals".bold(),
        if prefs.goals.is_empty() {
            unset()
        } else {
            prefs.goals.join(", ")
        }
    );
    println!(
        "  {:<16} {}",
        "Competitors".bold(),
        if prefs.competitors.is_empty() {
            unset()
        } else {
            prefs.competitors.join(", ")
        }
    );
    println!();

    if prefs.is_complete() {
        println!("{} Preferences complete", "✓".green().bold());
    } else {
        println!(
            "{} Missing: {} (wizard resumes at {:?})",
            "✗".red().bold(),
            prefs.missing_fields().join(", "),
            prefs.next_step()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// marketscope stats
// ---------------------------------------------------------------------------

/// Show request statistics for the dashboard server.
pub fn run_stats(cfg: &MarketscopeConfig, format: OutputFormat, days: Option<u32>) -> Result<()> {
    let stats = reporter::compute_stats(&logger::request_log_path(&cfg.logging), days);

    if stats.total_requests == 0 {
        println!(
            "{}",
            "No data yet. Serve the dashboard to collect request stats.".yellow()
        );
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Csv => print_stats_csv(&stats),
        OutputFormat::Table => print_stats_table(&stats),
    }
    Ok(())
}

/// Show requests and errors per day.
pub fn run_trends(cfg: &MarketscopeConfig, format: OutputFormat, days: u32) -> Result<()> {
    let trends = reporter::compute_trends(&logger::request_log_path(&cfg.logging), days);

    if trends.is_empty() {
        println!("{}", format!("No data in the last {days} days.").yellow());
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&trends)?),
        OutputFormat::Csv => print_trends_csv(&trends),
        OutputFormat::Table => print_trends_table(&trends, days),
    }
    Ok(())
}

fn print_trends_table(trends: &[TrendEntry], days: u32) {
    println!("{}", format!("Request Trends, Last {days} Days").bold().cyan());
    println!("{}", "=".repeat(40));
    println!("  {:<12} {:>9} {:>8} {:>8}", "Date", "Requests", "Errors", "Err %");
    println!("  {}", "-".repeat(38));

    for t in trends {
        let pct = if t.requests == 0 {
            0.0
        } else {
            t.errors as f64 / t.requests as f64 * 100.0
        };
        let line = format!(
            "  {:<12} {:>9} {:>8} {:>7.1}%",
            t.date, t.requests, t.errors, pct
        );
        if t.errors > 0 {
            println!("{}", line.yellow());
        } else {
            println!("{line}");
        }
    }
}

fn print_trends_csv(trends: &[TrendEntry]) {
    println!("date,requests,errors");
    for t in trends {
        println!("{},{},{}", t.date, t.requests, t.errors);
    }
}

fn print_stats_table(stats: &Stats) {
    println!("{}", "marketscope Request Report".bold().cyan());
    println!("{}", "=".repeat(60));
    println!();

    println!("  {} {}", "Total requests:".bold(), stats.total_requests);
    println!("  {} {:.1} ms", "Avg latency:   ".bold(), stats.avg_latency_ms);
    println!();

    let dist = &stats.status_distribution;
    println!("  {}", "Status Distribution".bold());
    println!(
        "    {} {:>5} ({:.1}%)",
        "2xx/3xx".green(),
        dist.success,
        dist.pct(dist.success)
    );
    println!(
        "    {} {:>5} ({:.1}%)",
        "4xx    ".yellow(),
        dist.client_error,
        dist.pct(dist.client_error)
    );
    println!(
        "    {} {:>5} ({:.1}%)",
        "5xx    ".red(),
        dist.server_error,
        dist.pct(dist.server_error)
    );
    println!();

    println!("  {}", "Routes".bold());
    println!(
        "  {:<34} {:>6} {:>7} {:>10}",
        "Route", "Count", "Errors", "Latency"
    );
    println!("  {}", "-".repeat(58));
    for (i, route) in stats.route_stats.iter().take(15).enumerate() {
        let line = format!(
            "  {:<34} {:>6} {:>7} {:>8.1}ms",
            truncate(&route.route, 34),
            route.count,
            route.error_count,
            route.avg_latency_ms,
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_stats_csv(stats: &Stats) {
    println!("route,count,errors,avg_latency_ms");
    for route in &stats.route_stats {
        println!(
            "{},{},{},{:.1}",
            route.route, route.count, route.error_count, route.avg_latency_ms
        );
    }
}

// ---------------------------------------------------------------------------
// marketscope health
// ---------------------------------------------------------------------------

pub fn run_health(cfg: &MarketscopeConfig) -> Result<()> {
    println!("{}", "marketscope Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.marketscope/config.toml found"
        } else {
            "not found (run `marketscope config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".marketscope.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = BackendClient::from_config(&cfg.backend);
    let backend_ok = client.is_healthy();
    let backend_detail = if backend_ok {
        format!("reachable at {}", client.base_url())
    } else {
        format!("not reachable at {}", client.base_url())
    };
    print_health_item("Backend", backend_ok, &backend_detail);

    let download_ok = Path::new(&cfg.download.root_dir).is_dir();
    print_health_item(
        "Download directory",
        download_ok,
        &if download_ok {
            cfg.download.root_dir.clone()
        } else {
            format!("{} (missing)", cfg.download.root_dir)
        },
    );

    print_health_item(
        "Extractor",
        true,
        &format!(
            "{} (max {})",
            cfg.extractor.strategy, cfg.extractor.max_recommendations
        ),
    );

    let log_path = logger::request_log_path(&cfg.logging);
    let log_exists = log_path.exists();
    print_health_item(
        "Request log",
        log_exists,
        &if !cfg.logging.enabled {
            "disabled".to_string()
        } else if log_exists {
            format!("{} entries", logger::read_all_entries(&log_path).len())
        } else {
            "no log file yet".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<25} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// marketscope config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective marketscope Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.marketscope/config.toml", global_exists);
    print_source(".marketscope.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "MARKETSCOPE_* / NEXT_PUBLIC_API_URL environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.marketscope/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field when it contains separators or quotes.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn colorize_priority(priority: Priority) -> colored::ColoredString {
    let label = format!("[{priority}]");
    match priority {
        Priority::High => label.red().bold(),
        Priority::Medium => label.yellow(),
        Priority::Low => label.green(),
    }
}

fn colorize_severity(severity: &str) -> colored::ColoredString {
    match severity.to_ascii_lowercase().as_str() {
        "high" | "critical" => severity.red(),
        "medium" => severity.yellow(),
        "low" => severity.green(),
        _ => severity.normal(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parsing() {
        assert_eq!(OutputFormat::from_str_opt(Some("json")), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str_opt(Some("csv")), OutputFormat::Csv);
        assert_eq!(OutputFormat::from_str_opt(Some("xml")), OutputFormat::Table);
        assert_eq!(OutputFormat::from_str_opt(None), OutputFormat::Table);
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Acme Corporation International", 10), "Acme Corp…");
        assert_eq!(truncate("ééééé", 3), "éé…");
    }

    #[test]
    fn csv_field_quoting() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("a, b"), "\"a, b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }
}
