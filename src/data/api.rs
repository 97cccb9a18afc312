//! PokeAPI response structures
//!
//! Only the fields the processor reads are modelled; everything else in the
//! upstream documents is ignored during deserialization.

use serde::Deserialize;
use serde_json::Value;

/// A `{ name, url }` reference to another resource
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedResource {
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// `GET pokemon/{name}`
#[derive(Debug, Clone, Deserialize)]
pub struct PokemonResponse {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub weight: u32,
    #[serde(default)]
    pub sprites: Sprites,
    #[serde(default)]
    pub types: Vec<TypeSlot>,
    #[serde(default)]
    pub abilities: Vec<AbilitySlot>,
    #[serde(default)]
    pub stats: Vec<StatSlot>,
    #[serde(default)]
    pub moves: Vec<MoveSlot>,
    pub species: Option<NamedResource>,
}

/// Sprite URLs; the deeply nested variants are kept as raw JSON and read by pointer
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub front_shiny: Option<String>,
    pub other: Option<Value>,
    pub versions: Option<Value>,
}

impl Sprites {
    /// Official artwork, falling back to the default front sprite
    pub fn artwork(&self) -> Option<String> {
        string_at(&self.other, "/official-artwork/front_default").or_else(|| self.front_default.clone())
    }

    /// Shiny official artwork, falling back to the default shiny sprite
    pub fn artwork_shiny(&self) -> Option<String> {
        string_at(&self.other, "/official-artwork/front_shiny").or_else(|| self.front_shiny.clone())
    }

    /// Pokemon HOME render
    pub fn home(&self) -> Option<String> {
        string_at(&self.other, "/home/front_default")
    }

    /// Generation V animated sprite, falling back to the default front sprite
    pub fn animated(&self) -> Option<String> {
        string_at(&self.versions, "/generation-v/black-white/animated/front_default")
            .or_else(|| self.front_default.clone())
    }
}

fn string_at(value: &Option<Value>, pointer: &str) -> Option<String> {
    value
        .as_ref()?
        .pointer(pointer)?
        .as_str()
        .map(str::to_string)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TypeSlot {
    #[serde(rename = "type")]
    pub kind: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AbilitySlot {
    pub ability: NamedResource,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatSlot {
    pub base_stat: u32,
    pub stat: NamedResource,
}

/// One move in a Pokemon's learnset, with per-version-group learn details
#[derive(Debug, Clone, Deserialize)]
pub struct MoveSlot {
    #[serde(rename = "move")]
    pub move_ref: NamedResource,
    #[serde(default)]
    pub version_group_details: Vec<VersionGroupDetail>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VersionGroupDetail {
    #[serde(default)]
    pub level_learned_at: u32,
    pub move_learn_method: NamedResource,
    pub version_group: NamedResource,
}

/// `GET pokemon-species/{id}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpeciesResponse {
    #[serde(default)]
    pub flavor_text_entries: Vec<FlavorTextEntry>,
    #[serde(default)]
    pub genera: Vec<GenusEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlavorTextEntry {
    pub flavor_text: String,
    pub language: NamedResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenusEntry {
    pub genus: String,
    pub language: NamedResource,
}

impl SpeciesResponse {
    /// First English flavor text with line and page breaks flattened to spaces
    pub fn english_flavor_text(&self) -> Option<String> {
        self.flavor_text_entries
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.flavor_text.replace(['\n', '\u{c}'], " "))
            .filter(|text| !text.is_empty())
    }

    /// First English genus, e.g. "Mouse Pokémon"
    pub fn english_genus(&self) -> Option<String> {
        self.genera
            .iter()
            .find(|entry| entry.language.name == "en")
            .map(|entry| entry.genus.clone())
    }
}

/// `GET move/{id}`
#[derive(Debug, Clone, Deserialize)]
pub struct MoveResponse {
    pub id: u32,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: NamedResource,
    pub damage_class: NamedResource,
    pub power: Option<u32>,
    pub accuracy: Option<u32>,
    pub pp: Option<u32>,
}

/// `GET pokemon?limit=..&offset=..`
#[derive(Debug, Clone, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub results: Vec<NamedResource>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pokemon_subset() {
        let raw = json!({
            "id": 4,
            "name": "charmander",
            "height": 6,
            "weight": 85,
            "base_experience": 62,
            "sprites": {
                "front_default": "https://img/4.png",
                "front_shiny": null,
                "other": {
                    "official-artwork": { "front_default": "https://art/4.png", "front_shiny": "https://art/shiny/4.png" },
                    "home": { "front_default": "https://home/4.png" }
                }
            },
            "types": [{ "slot": 1, "type": { "name": "fire", "url": "https://t/10/" } }],
            "abilities": [{ "ability": { "name": "solar-power", "url": "" }, "is_hidden": true, "slot": 3 }],
            "stats": [{ "base_stat": 39, "effort": 0, "stat": { "name": "hp", "url": "" } }],
            "moves": [{
                "move": { "name": "scratch", "url": "https://m/10/" },
                "version_group_details": [{
                    "level_learned_at": 1,
                    "move_learn_method": { "name": "level-up", "url": "" },
                    "version_group": { "name": "scarlet-violet", "url": "" }
                }]
            }],
            "species": { "name": "charmander", "url": "https://s/4/" }
        });

        let pokemon: PokemonResponse = serde_json::from_value(raw).expect("Should parse");

        assert_eq!(pokemon.id, 4);
        assert_eq!(pokemon.types[0].kind.name, "fire");
        assert!(pokemon.abilities[0].is_hidden);
        assert_eq!(pokemon.moves[0].move_ref.url, "https://m/10/");
        assert_eq!(pokemon.moves[0].version_group_details[0].level_learned_at, 1);
        assert_eq!(pokemon.sprites.artwork().as_deref(), Some("https://art/4.png"));
        assert_eq!(pokemon.sprites.artwork_shiny().as_deref(), Some("https://art/shiny/4.png"));
        assert_eq!(pokemon.sprites.home().as_deref(), Some("https://home/4.png"));
    }

    #[test]
    fn test_sprite_fallbacks() {
        let sprites: Sprites = serde_json::from_value(json!({
            "front_default": "https://img/1.png",
            "front_shiny": "https://img/shiny/1.png",
            "other": { "official-artwork": { "front_default": null } }
        }))
        .expect("Should parse");

        assert_eq!(sprites.artwork().as_deref(), Some("https://img/1.png"));
        assert_eq!(sprites.artwork_shiny().as_deref(), Some("https://img/shiny/1.png"));
        assert_eq!(sprites.home(), None);
        assert_eq!(sprites.animated().as_deref(), Some("https://img/1.png"));
    }

    #[test]
    fn test_animated_sprite_preferred_for_catalog() {
        let sprites: Sprites = serde_json::from_value(json!({
            "front_default": "https://img/1.png",
            "versions": {
                "generation-v": { "black-white": { "animated": { "front_default": "https://anim/1.gif" } } }
            }
        }))
        .expect("Should parse");

        assert_eq!(sprites.animated().as_deref(), Some("https://anim/1.gif"));
    }

    #[test]
    fn test_species_english_text() {
        let species: SpeciesResponse = serde_json::from_value(json!({
            "flavor_text_entries": [
                { "flavor_text": "Texte", "language": { "name": "fr", "url": "" } },
                { "flavor_text": "Obviously prefers\nhot places.\u{c}When it rains", "language": { "name": "en", "url": "" } }
            ],
            "genera": [{ "genus": "Lizard Pokémon", "language": { "name": "en", "url": "" } }]
        }))
        .expect("Should parse");

        assert_eq!(
            species.english_flavor_text().as_deref(),
            Some("Obviously prefers hot places. When it rains")
        );
        assert_eq!(species.english_genus().as_deref(), Some("Lizard Pokémon"));
    }

    #[test]
    fn test_species_without_english_entries() {
        let species = SpeciesResponse::default();
        assert!(species.english_flavor_text().is_none());
        assert!(species.english_genus().is_none());
    }

    #[test]
    fn test_move_requires_damage_class() {
        let result = serde_json::from_value::<MoveResponse>(json!({
            "id": 1, "name": "pound", "type": { "name": "normal", "url": "" },
            "power": 40, "accuracy": 100, "pp": 35
        }));
        assert!(result.is_err());
    }
}
