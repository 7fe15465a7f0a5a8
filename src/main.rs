//! gscholar-profile - Google Scholar profile scraper
//!
//! Fetches one or more profiles (URLs or bare user IDs, comma-separated) and writes one CSV
//! per profile into `google-scholar-search-results/`.
//!
//! ## Usage
//!
//! ```bash
//! gscholar-profile fetch "https://scholar.google.com/citations?user=dnbO4DgAAAAJ&hl=en, qc6CJjYAAAAJ"
//! gscholar-profile cookies import < cookies.json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gscholar_profile::batch::{self, BatchOutcome};
use gscholar_profile::cookies::CookieManager;
use gscholar_profile::export::OUTPUT_DIR;
use gscholar_profile::profile::{MetricPair, ProfileRecord};
use gscholar_profile::{
    FetchConfig, MalformedRowPolicy, ProfileFetcher, ReqwestPageSource, ScholarPageParser,
    TokioSleeper,
};
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Google Scholar profile scraper
#[derive(Parser)]
#[command(name = "gscholar-profile")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch profiles and save one CSV per profile
    Fetch {
        /// Profile URLs or user IDs; each argument may hold several, separated by commas
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory
        #[arg(short, long, default_value = OUTPUT_DIR)]
        output: PathBuf,

        /// Seconds to wait after a rate-limit (HTTP 429) response
        #[arg(long, default_value = "60")]
        delay: u64,

        /// Maximum requests per page while rate limited
        #[arg(long, default_value = "5")]
        retries: u32,

        /// Publications requested per page (1-100; Scholar serves at most 100)
        #[arg(long, default_value = "100", value_parser = clap::value_parser!(u16).range(1..=100))]
        page_size: u16,

        /// Scholar base URL (mirror sites)
        #[arg(long, default_value = gscholar_profile::config::DEFAULT_SCHOLAR_URL)]
        base_url: String,

        /// Interface language
        #[arg(long, default_value = "en")]
        lang: String,

        /// Proxy URL (e.g., http://127.0.0.1:7890)
        #[arg(long)]
        proxy: Option<String>,

        /// Request timeout in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,

        /// Skip malformed publication rows instead of failing the page
        #[arg(long)]
        skip_malformed: bool,

        /// Save every fetched page's raw HTML into this directory
        #[arg(long)]
        dump_html: Option<PathBuf>,

        /// Cookie file (default: ~/.gscholar_cookies.json)
        #[arg(long)]
        cookies: Option<PathBuf>,

        /// Print each profile as JSON instead of the text summary
        #[arg(long)]
        json: bool,
    },

    /// Manage cookies
    Cookies {
        #[command(subcommand)]
        action: CookieAction,
    },
}

#[derive(Subcommand)]
enum CookieAction {
    /// Clear stored cookies
    Clear,
    /// Show cookie file path
    Path,
    /// Read a JSON cookie array from stdin and store it
    Import,
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    if cli.json_logs {
        fmt().json().with_env_filter(filter).with_target(true).init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_thread_ids(false)
            .init();
    }

    match cli.command {
        Commands::Fetch {
            inputs,
            output,
            delay,
            retries,
            page_size,
            base_url,
            lang,
            proxy,
            timeout,
            skip_malformed,
            dump_html,
            cookies,
            json,
        } => {
            let config = FetchConfig {
                base_url,
                language: lang,
                page_size: usize::from(page_size),
                max_attempts: retries,
                rate_limit_delay: Duration::from_secs(delay),
                timeout: Duration::from_secs(timeout),
                proxy,
                dump_html_dir: dump_html,
                ..Default::default()
            };
            let policy = if skip_malformed {
                MalformedRowPolicy::Skip
            } else {
                MalformedRowPolicy::Abort
            };
            run_fetch(&inputs.join(","), config, policy, cookies, output, json).await
        }
        Commands::Cookies { action } => handle_cookies(action),
    }
}

// ============================================================================
// Fetch
// ============================================================================

async fn run_fetch(
    raw_inputs: &str,
    config: FetchConfig,
    policy: MalformedRowPolicy,
    cookie_path: Option<PathBuf>,
    output_dir: PathBuf,
    json: bool,
) -> Result<()> {
    let cookie_manager = match cookie_path {
        Some(path) => CookieManager::with_path(path),
        None => CookieManager::new()?,
    };
    let cookies = cookie_manager.load();
    if cookies.is_empty() {
        info!("No cookies loaded; requests are anonymous");
    }

    let source = ReqwestPageSource::new(&config, &cookies)?;
    let fetcher = ProfileFetcher::new(source, ScholarPageParser::new(policy), TokioSleeper, config)
        .context("Invalid fetch settings")?;

    let outcomes = batch::run_batch(&fetcher, raw_inputs, &output_dir).await;
    if outcomes.is_empty() {
        anyhow::bail!("Please enter at least one Google Scholar profile URL or user ID.");
    }

    for outcome in &outcomes {
        match outcome {
            BatchOutcome::Saved { id, profile, path } => {
                if json {
                    println!("{}", serde_json::to_string_pretty(profile)?);
                } else {
                    print_summary(id.as_str(), profile);
                }
                println!("Saved data to {}\n", path.display());
            }
            BatchOutcome::Unparseable { error, .. } => {
                println!("{}\n", error);
            }
            BatchOutcome::Failed { id, error } => {
                println!("Failed to fetch profile data for user ID: {} ({})\n", id, error);
            }
        }
    }

    let saved = outcomes.iter().filter(|o| o.is_saved()).count();
    println!("Done: {} of {} profile(s) saved.", saved, outcomes.len());
    Ok(())
}

fn print_summary(id: &str, profile: &ProfileRecord) {
    let or_na = |value: Option<&str>| value.unwrap_or("N/A").to_string();
    let metric = |pair: Option<&MetricPair>, recent: bool| {
        or_na(pair.map(|p| if recent { p.recent.as_str() } else { p.all_time.as_str() }))
    };
    let metrics = profile.metrics.as_ref();

    println!("--- Results for User ID: {} ---", id);
    println!("Name: {}", or_na(profile.name.as_deref()));
    println!("Affiliation: {}", or_na(profile.affiliation.as_deref()));
    if profile.interests.is_empty() {
        println!("Interests: N/A");
    } else {
        println!("Interests: {}", profile.interests.join(", "));
    }
    for (label, pair) in [
        ("Citations", metrics.map(|m| &m.citations)),
        ("h-index", metrics.map(|m| &m.h_index)),
        ("i10-index", metrics.map(|m| &m.i10_index)),
    ] {
        println!("{} (All): {}", label, metric(pair, false));
        println!("{} (Recent): {}", label, metric(pair, true));
    }
    println!("Publications Count: {}", profile.publication_count);
}

// ============================================================================
// Cookie Management
// ============================================================================

fn handle_cookies(action: CookieAction) -> Result<()> {
    let manager = CookieManager::new()?;

    match action {
        CookieAction::Clear => {
            manager.clear()?;
            println!("Cookies cleared.");
        }
        CookieAction::Path => {
            println!("Cookie file: {}", manager.path().display());
        }
        CookieAction::Import => {
            eprintln!("Paste cookies as JSON, e.g. [{{\"name\":\"NID\",\"value\":\"xxx\",\"domain\":\".google.com\"}}]");
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("Failed to read cookies from stdin")?;
            let saved = manager
                .import_json(&input)
                .context("Failed to parse cookies; expected a JSON array")?;
            println!("Successfully saved {} cookies to {}", saved, manager.path().display());
        }
    }

    Ok(())
}
