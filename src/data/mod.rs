//! Core data models for dexcache
//!
//! This module contains the records returned to callers (and stored in the
//! cache), together with the upstream schema and HTTP client they are built from.

pub mod api;
pub mod client;
pub mod display;

pub use client::{PokeApiClient, Upstream, UpstreamError, POKEAPI_BASE_URL};

use serde::{Deserialize, Serialize};

/// A fully processed Pokemon, as returned to callers and stored in the cache
///
/// Every field is required on deserialization, including the optional ones
/// (which must be present, possibly as `null`): a cached payload missing any of
/// them (for example one written before move lists existed) fails to decode and
/// is treated as a cache miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEntityRecord {
    /// National dex id
    pub id: u32,
    /// Upstream name, e.g. "mr-mime"
    pub name: String,
    /// Main artwork URL (placeholder path when the upstream has none)
    pub sprite: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub sprite_shiny: Option<String>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub sprite_home: Option<String>,
    /// Type names in slot order
    pub types: Vec<String>,
    pub primary_type: String,
    /// Hex colour of the primary type
    pub primary_color: String,
    /// Height in metres, one decimal
    pub height: String,
    /// Weight in kilograms, one decimal
    pub weight: String,
    pub abilities: Vec<Ability>,
    pub stats: Vec<Stat>,
    pub flavor_text: String,
    pub genus: String,
    pub level_up_moves: Vec<MoveEntry>,
    pub tm_moves: Vec<MoveEntry>,
    pub egg_moves: Vec<MoveEntry>,
    pub tutor_moves: Vec<MoveEntry>,
    /// Version group the move lists were taken from, if any matched
    #[serde(deserialize_with = "Option::deserialize")]
    pub moves_version_group: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    pub is_hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base_stat: u32,
}

/// A move as it appears in one of the learn-method lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveEntry {
    pub id: u32,
    /// Display name, hyphens replaced with spaces
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: String,
    /// Damage class: physical, special or status
    pub category: String,
    #[serde(deserialize_with = "Option::deserialize")]
    pub power: Option<u32>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub accuracy: Option<u32>,
    #[serde(deserialize_with = "Option::deserialize")]
    pub pp: Option<u32>,
    /// Level the move is learned at; only set in the level-up list
    #[serde(deserialize_with = "Option::deserialize")]
    pub level: Option<u32>,
}

/// Summary of a Pokemon used by the full catalog listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: u32,
    pub name: String,
    pub types: Vec<String>,
    /// The six standard stats with short labels ("HP", "Sp. Atk", ...)
    pub stats: Vec<Stat>,
    pub sprite: String,
    /// Generation derived from the dex id, or "unknown"
    pub generation: String,
}

/// The full catalog, cached as a single entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    /// Entries sorted by id
    pub all_pokemon: Vec<CatalogEntry>,
    /// Distinct known generations in release order
    pub generations: Vec<String>,
    /// Distinct type names, sorted
    pub types: Vec<String>,
}
