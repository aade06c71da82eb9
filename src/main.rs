mod app;
mod config;
mod extract;
mod gemini;
mod links;
mod render;
mod repl;

pub const USER_AGENT: &str = concat!("smart-search/", env!("CARGO_PKG_VERSION"));

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tracing::info;

use app::{SmartSearch, Submission};
use config::{Config, Overrides};
use gemini::GeminiClient;
use render::{OutputFormat, render};

/// TCP connection establishment timeout. The per-request timeout comes from `Config`.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const IDLE_HINT: &str = "Your results will appear here once you submit a query.";

/// The AI-powered lead finder: describe your ideal company in plain English and
/// get its profile plus ready-to-open Google, LinkedIn and Crunchbase searches.
///
/// Configuration via environment variables (or a `.env` file):
/// - `GEMINI_API_KEY` / `GOOGLE_API_KEY`: required
/// - `GEMINI_MODEL`, `SMART_SEARCH_TIMEOUT_SECS`, `GEMINI_API_BASE`: optional
#[derive(Parser, Debug)]
#[command(name = "smart-search", version)]
struct Cli {
    /// Company description, e.g. "Seed-stage AI healthcare companies in Boston".
    /// Omit to read one query per line from stdin.
    query: Vec<String>,

    /// Read queries from stdin even when one is given on the command line
    #[arg(short, long)]
    interactive: bool,

    /// Print JSON instead of Markdown
    #[arg(long)]
    json: bool,

    /// Gemini model name (overrides GEMINI_MODEL)
    #[arg(long, value_name = "NAME")]
    model: Option<String>,

    /// Request timeout in seconds (overrides SMART_SEARCH_TIMEOUT_SECS)
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Log progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "smart_search=info"
    } else {
        "smart_search=warn"
    };
    let filter = match directive.parse() {
        Ok(d) => tracing_subscriber::EnvFilter::from_default_env().add_directive(d),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    config::load_env_file(cli.env_file.as_deref())?;
    let config = Config::from_env(&Overrides {
        model: cli.model,
        timeout_secs: cli.timeout,
    })?;

    let http = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
    let app = SmartSearch::new(GeminiClient::new(http, &config));
    info!(model = %config.model, timeout_secs = config.timeout.as_secs(), "smart-search ready");

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Markdown
    };

    if cli.interactive || cli.query.is_empty() {
        repl::run_repl_loop(&app, format).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let query = cli.query.join(" ");
    match repl::with_thinking_indicator(app.submit(&query)).await {
        Submission::Idle => {
            println!("{IDLE_HINT}");
            Ok(ExitCode::SUCCESS)
        }
        Submission::Completed(report) => {
            print!("{}", render(&report, format)?);
            if report.extraction.error().is_some() {
                Ok(ExitCode::FAILURE)
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
