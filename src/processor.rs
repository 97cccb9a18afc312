//! Record processing
//!
//! `DataProcessor` is the single entry point used by every caller: it consults
//! the cache, fetches from the upstream on a miss, runs move reconciliation and
//! stores the assembled record. Only `ProcessError` escapes; species lookups,
//! individual moves and cache faults degrade the result instead of failing it.

use std::collections::BTreeSet;

use futures::stream::{self, StreamExt};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use crate::cache::CacheStore;
use crate::config::Config;
use crate::data::api::{ListResponse, NamedResource, PokemonResponse, SpeciesResponse};
use crate::data::display::{
    generation_for_id, generation_ordinal, spaced, stat_label, tenths, title_case, type_color,
    DEFAULT_TYPE_COLOR, PLACEHOLDER_SPRITE, UNKNOWN_GENERATION,
};
use crate::data::{
    Ability, Catalog, CatalogEntry, ProcessedEntityRecord, Stat, Upstream, UpstreamError,
};
use crate::error::{ProcessError, Result};
use crate::moves::{MoveBuckets, MoveReconciler, VersionGroupSelector};

/// Cache key of the full catalog
pub const CATALOG_CACHE_KEY: &str = "all_pokemon";

/// Description used when the species record has no English text
pub const NO_DESCRIPTION: &str = "No description available.";

/// Orchestrates cache, upstream client and move reconciliation
pub struct DataProcessor<U> {
    upstream: U,
    cache: Option<CacheStore>,
    selector: VersionGroupSelector,
    base_url: String,
    freshness: chrono::Duration,
    catalog_limit: u32,
    catalog_concurrency: usize,
}

impl<U: Upstream> DataProcessor<U> {
    /// Creates a processor over `upstream`
    ///
    /// Pass `None` as `cache` to always fetch fresh data.
    pub fn new(upstream: U, cache: Option<CacheStore>, config: &Config) -> Self {
        let freshness = chrono::Duration::from_std(config.cache_ttl)
            .unwrap_or_else(|_| chrono::Duration::days(36_500));
        Self {
            upstream,
            cache,
            selector: VersionGroupSelector::default(),
            base_url: config.base_url.clone(),
            freshness,
            catalog_limit: config.catalog_limit,
            catalog_concurrency: config.catalog_concurrency.max(1),
        }
    }

    /// Replaces the version group preference list
    pub fn with_selector(mut self, selector: VersionGroupSelector) -> Self {
        self.selector = selector;
        self
    }

    /// Returns the complete record for `name`, from cache when fresh
    ///
    /// # Returns
    /// * `Ok(ProcessedEntityRecord)` - cached or freshly assembled record
    /// * `Err(ProcessError::NotFound)` - the upstream has no such Pokemon
    /// * `Err(ProcessError::Upstream)` - the upstream failed; nothing is cached
    pub async fn get_entity_record(&self, name: &str) -> Result<ProcessedEntityRecord> {
        let name = normalize_name(name);
        if !is_valid_name(&name) {
            return Err(ProcessError::NotFound(name));
        }

        if let Some(record) = self.cached::<ProcessedEntityRecord>(&name, |_| true) {
            debug!(name = %name, "returning cached record");
            return Ok(record);
        }

        info!(name = %name, "cache miss, fetching from upstream");
        let record = self.build_entity_record(&name).await?;
        self.store(&name, &record);
        Ok(record)
    }

    /// Returns the full catalog, from cache when fresh
    ///
    /// Each listed Pokemon is resolved through the same primary fetch as
    /// `get_entity_record`, without move reconciliation. Entries that fail are
    /// left out; an empty result is returned but never cached.
    pub async fn get_catalog(&self) -> Result<Catalog> {
        if let Some(catalog) =
            self.cached::<Catalog>(CATALOG_CACHE_KEY, |catalog| !catalog.all_pokemon.is_empty())
        {
            debug!("returning cached catalog");
            return Ok(catalog);
        }

        let url = format!("{}pokemon?limit={}&offset=0", self.base_url, self.catalog_limit);
        let body = self
            .upstream
            .fetch_json(&url)
            .await
            .map_err(|e| ProcessError::upstream("Pokemon list", &e))?;
        let list: ListResponse =
            serde_json::from_value(body).map_err(|e| ProcessError::Upstream {
                status: None,
                message: format!("unexpected Pokemon list document: {}", e),
            })?;

        let entries: Vec<Option<CatalogEntry>> = stream::iter(&list.results)
            .map(|resource| self.fetch_catalog_entry(resource))
            .buffer_unordered(self.catalog_concurrency)
            .collect()
            .await;
        let entries: Vec<CatalogEntry> = entries.into_iter().flatten().collect();

        if entries.is_empty() && !list.results.is_empty() {
            warn!(listed = list.results.len(), "fetched list but failed to get any details");
        } else {
            info!(listed = list.results.len(), resolved = entries.len(), "catalog fetched");
        }

        let catalog = build_catalog(entries);
        if !catalog.all_pokemon.is_empty() {
            self.store(CATALOG_CACHE_KEY, &catalog);
        }
        Ok(catalog)
    }

    /// Removes the cached record for `name`, if any
    ///
    /// Names that `get_entity_record` would reject are ignored, so other cache
    /// entries (such as the catalog) cannot be removed through here.
    pub fn invalidate(&self, name: &str) {
        let name = normalize_name(name);
        if !is_valid_name(&name) {
            warn!(name = %name, "not a valid Pokemon name, nothing to evict");
            return;
        }
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.delete(&name) {
                warn!(key = %name, error = %e, "failed to clear cache entry");
            }
        }
    }

    /// Reads and validates a cached payload; anything unusable counts as a miss
    fn cached<T>(&self, key: &str, is_complete: impl Fn(&T) -> bool) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let cache = self.cache.as_ref()?;
        let value = match cache.get(key, self.freshness) {
            Ok(value) => value?,
            Err(e) => {
                warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };

        match serde_json::from_value::<T>(value) {
            Ok(payload) if is_complete(&payload) => Some(payload),
            _ => {
                warn!(key, "cached payload is incomplete or outdated, clearing it");
                if let Err(e) = cache.delete(key) {
                    warn!(key, error = %e, "failed to clear cache entry");
                }
                None
            }
        }
    }

    /// Writes to the cache; a failure is logged and otherwise ignored
    fn store<T: Serialize>(&self, key: &str, value: &T) {
        if let Some(cache) = &self.cache {
            if let Err(e) = cache.set(key, value) {
                warn!(key, error = %e, "failed to save cache entry");
            }
        }
    }

    async fn build_entity_record(&self, name: &str) -> Result<ProcessedEntityRecord> {
        let url = format!("{}pokemon/{}", self.base_url, name);
        let pokemon = self.fetch_pokemon(&url, name).await?;
        let species = self.fetch_species(&pokemon).await;

        let selection = self.selector.select(&pokemon.moves);
        let buckets = match &selection.version_group {
            Some(group) => {
                info!(
                    name,
                    version_group = %group,
                    moves = selection.moves.len(),
                    "using best available version group"
                );
                MoveReconciler::new(&self.upstream)
                    .reconcile(&selection.moves)
                    .await
            }
            None => {
                warn!(name, "no move data in any preferred version group");
                MoveBuckets::default()
            }
        };

        Ok(assemble_record(
            pokemon,
            &species,
            selection.version_group,
            buckets,
        ))
    }

    /// Fetches a primary Pokemon document; 404 maps to `NotFound`
    async fn fetch_pokemon(&self, url: &str, name: &str) -> Result<PokemonResponse> {
        let body = self.upstream.fetch_json(url).await.map_err(|e| {
            if e.is_not_found() {
                ProcessError::NotFound(name.to_string())
            } else {
                ProcessError::upstream("main data", &e)
            }
        })?;

        serde_json::from_value(body).map_err(|e| ProcessError::Upstream {
            status: None,
            message: format!("unexpected main data document for {}: {}", name, e),
        })
    }

    /// Fetches the species document; any failure degrades to an empty one
    async fn fetch_species(&self, pokemon: &PokemonResponse) -> SpeciesResponse {
        let Some(species) = pokemon.species.as_ref().filter(|s| !s.url.is_empty()) else {
            return SpeciesResponse::default();
        };

        let result: std::result::Result<SpeciesResponse, UpstreamError> = self
            .upstream
            .fetch_json(&species.url)
            .await
            .and_then(|body| {
                serde_json::from_value(body).map_err(|e| UpstreamError::Decode(e.to_string()))
            });

        result.unwrap_or_else(|e| {
            warn!(name = %pokemon.name, error = %e, "failed to fetch species data");
            SpeciesResponse::default()
        })
    }

    async fn fetch_catalog_entry(&self, resource: &NamedResource) -> Option<CatalogEntry> {
        match self.fetch_pokemon(&resource.url, &resource.name).await {
            Ok(pokemon) => Some(catalog_entry(pokemon)),
            Err(e) => {
                warn!(name = %resource.name, error = %e, "failed to fetch details");
                None
            }
        }
    }
}

/// Lowercases and trims a requested name
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Upstream names and ids only use ASCII letters, digits and hyphens
fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

/// Builds the returned record from upstream data and reconciled moves
fn assemble_record(
    pokemon: PokemonResponse,
    species: &SpeciesResponse,
    version_group: Option<String>,
    buckets: MoveBuckets,
) -> ProcessedEntityRecord {
    let types: Vec<String> = pokemon.types.into_iter().map(|t| t.kind.name).collect();
    let primary_type = types.first().cloned().unwrap_or_else(|| "normal".to_string());
    let primary_color = type_color(&primary_type).unwrap_or(DEFAULT_TYPE_COLOR);

    ProcessedEntityRecord {
        id: pokemon.id,
        name: pokemon.name,
        sprite: pokemon
            .sprites
            .artwork()
            .unwrap_or_else(|| PLACEHOLDER_SPRITE.to_string()),
        sprite_shiny: pokemon.sprites.artwork_shiny(),
        sprite_home: pokemon.sprites.home(),
        primary_color: primary_color.to_string(),
        primary_type,
        types,
        height: tenths(pokemon.height),
        weight: tenths(pokemon.weight),
        abilities: pokemon
            .abilities
            .into_iter()
            .map(|a| Ability {
                name: spaced(&a.ability.name),
                is_hidden: a.is_hidden,
            })
            .collect(),
        stats: pokemon
            .stats
            .into_iter()
            .map(|s| Stat {
                name: title_case(&s.stat.name),
                base_stat: s.base_stat,
            })
            .collect(),
        flavor_text: species
            .english_flavor_text()
            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
        genus: species.english_genus().unwrap_or_default(),
        level_up_moves: buckets.level_up,
        tm_moves: buckets.machine,
        egg_moves: buckets.egg,
        tutor_moves: buckets.tutor,
        moves_version_group: version_group,
    }
}

fn catalog_entry(pokemon: PokemonResponse) -> CatalogEntry {
    let sprite = pokemon
        .sprites
        .animated()
        .unwrap_or_else(|| PLACEHOLDER_SPRITE.to_string());
    CatalogEntry {
        id: pokemon.id,
        generation: generation_for_id(pokemon.id).to_string(),
        name: pokemon.name,
        types: pokemon.types.into_iter().map(|t| t.kind.name).collect(),
        stats: pokemon
            .stats
            .into_iter()
            .filter_map(|s| {
                stat_label(&s.stat.name).map(|label| Stat {
                    name: label.to_string(),
                    base_stat: s.base_stat,
                })
            })
            .collect(),
        sprite,
    }
}

/// Sorts entries by id and derives the generation and type indexes
fn build_catalog(mut entries: Vec<CatalogEntry>) -> Catalog {
    entries.sort_by_key(|entry| entry.id);

    let mut generations: Vec<String> = entries
        .iter()
        .map(|entry| entry.generation.as_str())
        .filter(|generation| *generation != UNKNOWN_GENERATION)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect();
    generations.sort_by_key(|generation| generation_ordinal(generation));

    let types = entries
        .iter()
        .flat_map(|entry| entry.types.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    Catalog {
        all_pokemon: entries,
        generations,
        types,
    }
}
