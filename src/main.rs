//! dexcache - Look up processed Pokemon records through a local cache
//!
//! Prints a single record or the full catalog as JSON on stdout. Logs go to
//! stderr and are controlled with `RUST_LOG`.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use dexcache::cache::CacheStore;
use dexcache::cli::{Cli, Command};
use dexcache::config::Config;
use dexcache::data::PokeApiClient;
use dexcache::error::ProcessError;
use dexcache::processor::DataProcessor;

/// Exit status for a Pokemon the upstream does not know
const EXIT_NOT_FOUND: u8 = 2;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dexcache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Opens the configured cache, or the XDG default when none is configured
fn open_cache(cli: &Cli, config: &Config) -> Option<CacheStore> {
    if cli.no_cache {
        return None;
    }
    match &config.cache_dir {
        Some(dir) => Some(CacheStore::with_dir(dir.clone())),
        None => CacheStore::new(),
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: failed to encode output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn report(err: ProcessError) -> ExitCode {
    eprintln!("Error ({}): {}", err.status_code(), err);
    match err {
        ProcessError::NotFound(_) => ExitCode::from(EXIT_NOT_FOUND),
        ProcessError::Upstream { .. } => ExitCode::FAILURE,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let command = match Command::from_cli(&cli) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let config = cli.apply_to(Config::from_env());
    debug!(?config, "configuration loaded");

    let cache = open_cache(&cli, &config);
    if let Some(cache) = &cache {
        debug!(dir = %cache.dir().display(), "cache store opened");
    }

    let client = match PokeApiClient::with_timeout(config.request_timeout) {
        Ok(client) => client,
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let processor = DataProcessor::new(client, cache, &config);

    match command {
        Command::Record(name) => match processor.get_entity_record(&name).await {
            Ok(record) => print_json(&record),
            Err(e) => report(e),
        },
        Command::Catalog => match processor.get_catalog().await {
            Ok(catalog) => print_json(&catalog),
            Err(e) => report(e),
        },
        Command::Evict(name) => {
            processor.invalidate(&name);
            ExitCode::SUCCESS
        }
    }
}
