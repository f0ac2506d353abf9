use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use marketscope::cli::{self, OutputFormat};
use marketscope::{config, web};

#[derive(Debug, Parser)]
#[command(name = "marketscope")]
#[command(about = "Competitor monitoring dashboard and AI recommendation extractor")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the dashboard server (alerts and download proxies, JSON API)
    Serve {
        /// Listen address, overrides `server.addr`
        #[arg(long)]
        addr: Option<String>,
        /// Open the dashboard in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Extract structured recommendations from an AI response (file or stdin)
    Extract {
        /// File holding the AI response; reads stdin when omitted
        file: Option<PathBuf>,
        /// json-then-text (default), json-only, text-only
        #[arg(long)]
        strategy: Option<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List monitoring alerts for a user
    Alerts {
        /// Value sent as the X-User-ID header
        #[arg(long)]
        user: String,
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Summarize monitored competitor posts for a user
    Competitors {
        /// Value sent as the X-User-ID header
        #[arg(long)]
        user: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Show a user's marketing preferences and missing settings
    Settings {
        /// Value sent as the X-User-ID header
        #[arg(long)]
        user: String,
    },
    /// Show dashboard request statistics
    Stats {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Only include the last N days of data
        #[arg(long)]
        days: Option<u32>,
    },
    /// Show requests and errors per day
    Trends {
        /// Number of days to include
        #[arg(long, default_value_t = 7)]
        days: u32,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Check backend reachability, download directory, config, request log
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.marketscope/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set a dotted key, e.g. `backend.api_url`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();
    let mut cfg = config::load();

    // RUST_LOG wins over the configured level.
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cfg.logging.level.as_str()),
    )
    .init();

    match app.command {
        Commands::Serve { addr, open } => {
            if let Some(addr) = addr {
                cfg.server.addr = addr;
            }
            cfg.server.open_browser |= open;
            web::serve(cfg)
        }
        Commands::Extract {
            file,
            strategy,
            format,
        } => cli::run_extract(
            &cfg,
            file.as_deref(),
            strategy.as_deref(),
            OutputFormat::from_str_opt(Some(&format)),
        ),
        Commands::Alerts { user, format } => {
            cli::run_alerts(&cfg, &user, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Competitors { user, format } => {
            cli::run_competitors(&cfg, &user, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Settings { user } => cli::run_settings(&cfg, &user),
        Commands::Stats { format, days } => {
            cli::run_stats(&cfg, OutputFormat::from_str_opt(Some(&format)), days)
        }
        Commands::Trends { days, format } => {
            cli::run_trends(&cfg, OutputFormat::from_str_opt(Some(&format)), days)
        }
        Commands::Health => cli::run_health(&cfg),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
