use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use attest::cli;

#[derive(Debug, Parser)]
#[command(name = "attest")]
#[command(about = "Compliance evidence validation, page scanning, and dashboard")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scan a page (URL or file) for compliance questions and annotate it
    Scan {
        /// Page URL (http/https) or local HTML file path
        target: String,
        /// Output path for the annotated report (default: attest-report.html)
        #[arg(long, short)]
        out: Option<PathBuf>,
        /// Keep re-scanning the target on an interval
        #[arg(long)]
        watch: bool,
        /// Re-scan interval in milliseconds (with --watch)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Validate one control's evidence against the backend
    Validate {
        /// Checklist/control identifier
        #[arg(long)]
        control_id: Option<String>,
        /// The control requirement text
        #[arg(long)]
        control_text: Option<String>,
        /// Evidence as inline text
        #[arg(long)]
        evidence_text: Option<String>,
        /// Evidence as a file upload
        #[arg(long)]
        evidence_file: Option<PathBuf>,
        /// Scrape a page (URL or file) and submit its visible text as evidence
        #[arg(long)]
        evidence_page: Option<String>,
    },
    /// Ask the compliance assistant a question
    Chat {
        /// The question to ask
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
        /// Include the most recent validation result as context
        #[arg(long)]
        context: bool,
    },
    /// Show stored validation results
    Results {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Launch the local dashboard
    Dash {
        /// Listen address (default from config, 127.0.0.1:9610)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the browser automatically
        #[arg(long)]
        no_open: bool,
    },
    /// Check backend, config, and store health
    Health,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective merged configuration
    Show,
    /// Write a default config file to ~/.attest/config.toml
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
    /// Set a single config value (e.g. api.base_url)
    Set { key: String, value: String },
    /// Reset the config file to built-in defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Scan {
            target,
            out,
            watch,
            interval_ms,
        } => cli::run_scan(&target, out, watch, interval_ms),
        Commands::Validate {
            control_id,
            control_text,
            evidence_text,
            evidence_file,
            evidence_page,
        } => cli::run_validate(
            control_id,
            control_text,
            evidence_text,
            evidence_file,
            evidence_page,
        ),
        Commands::Chat { message, context } => {
            let message = message.join(" ");
            cli::run_chat(&message, context)
        }
        Commands::Results { format } => {
            let fmt = cli::OutputFormat::from_str_opt(Some(&format));
            cli::run_results(fmt)
        }
        Commands::Dash { addr, no_open } => cli::run_dash(addr, no_open),
        Commands::Health => cli::run_health(),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
