//! Command-line interface parsing for dexcache
//!
//! This module handles parsing of CLI arguments using clap and turns them into a
//! single `Command` plus overrides on top of the environment configuration.

use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::config::Config;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// Neither a name nor a mode flag was given
    #[error("Nothing to do: pass a Pokemon NAME, --catalog, or --evict <NAME>")]
    MissingCommand,
}

/// dexcache - Cached Pokemon records with version-group move lists
#[derive(Parser, Debug)]
#[command(name = "dexcache")]
#[command(about = "Fetch processed Pokemon records from PokeAPI through a local cache")]
#[command(version)]
pub struct Cli {
    /// Pokemon name or national dex number to look up
    ///
    /// Examples:
    ///   dexcache pikachu
    ///   dexcache Mr-Mime
    ///   dexcache 25
    #[arg(value_name = "NAME")]
    pub name: Option<String>,

    /// Print the full catalog instead of a single record
    #[arg(long, conflicts_with = "name")]
    pub catalog: bool,

    /// Remove the cached record for NAME and exit
    #[arg(long, value_name = "NAME", conflicts_with_all = ["name", "catalog", "no_cache"])]
    pub evict: Option<String>,

    /// Bypass the cache entirely: neither read nor write it
    #[arg(long)]
    pub no_cache: bool,

    /// Directory holding cache files (overrides DEXCACHE_CACHE_DIR)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// PokeAPI root URL (overrides DEXCACHE_BASE_URL)
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,
}

/// What the binary was asked to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the processed record for a Pokemon
    Record(String),
    /// Print the full catalog
    Catalog,
    /// Drop a cached record
    Evict(String),
}

impl Command {
    /// Derives the command from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(Command)` for a name, `--catalog` or `--evict`
    /// * `Err(CliError::MissingCommand)` if none was given
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        if let Some(name) = &cli.evict {
            return Ok(Command::Evict(name.clone()));
        }
        if cli.catalog {
            return Ok(Command::Catalog);
        }
        match &cli.name {
            Some(name) => Ok(Command::Record(name.clone())),
            None => Err(CliError::MissingCommand),
        }
    }
}

impl Cli {
    /// Applies command-line overrides on top of `config`
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url);
        }
        config
    }
}
