//! Display helpers shared by the entity and catalog records
//!
//! Type colours, generation lookup by national dex id, and the small string
//! transformations applied to upstream names before they are shown.

/// Colour used when a type has no entry in the table
pub const DEFAULT_TYPE_COLOR: &str = "#A8A77A";

/// Sprite used when the upstream record has none
pub const PLACEHOLDER_SPRITE: &str = "/placeholder.png";

/// National dex id ranges for each generation (inclusive)
const GENERATION_RANGES: [(&str, u32, u32); 9] = [
    ("generation-i", 1, 151),
    ("generation-ii", 152, 251),
    ("generation-iii", 252, 386),
    ("generation-iv", 387, 493),
    ("generation-v", 494, 649),
    ("generation-vi", 650, 721),
    ("generation-vii", 722, 809),
    ("generation-viii", 810, 905),
    ("generation-ix", 906, 1025),
];

/// Name reported for ids outside every known range (alternate forms, future releases)
pub const UNKNOWN_GENERATION: &str = "unknown";

/// Returns the hex colour associated with a type name
pub fn type_color(type_name: &str) -> Option<&'static str> {
    let color = match type_name {
        "normal" => "#A8A77A",
        "fire" => "#EE8130",
        "water" => "#6390F0",
        "electric" => "#F7D02C",
        "grass" => "#7AC74C",
        "ice" => "#96D9D6",
        "fighting" => "#C22E28",
        "poison" => "#A33EA1",
        "ground" => "#E2BF65",
        "flying" => "#A98FF3",
        "psychic" => "#F95587",
        "bug" => "#A6B91A",
        "rock" => "#B6A136",
        "ghost" => "#735797",
        "dragon" => "#6F35FC",
        "dark" => "#705746",
        "steel" => "#B7B7CE",
        "fairy" => "#D685AD",
        _ => return None,
    };
    Some(color)
}

/// Returns the generation name for a national dex id
pub fn generation_for_id(id: u32) -> &'static str {
    GENERATION_RANGES
        .iter()
        .find(|(_, start, end)| (*start..=*end).contains(&id))
        .map(|(name, _, _)| *name)
        .unwrap_or(UNKNOWN_GENERATION)
}

/// Ordinal of a generation name, used to sort them in release order
pub fn generation_ordinal(name: &str) -> Option<usize> {
    GENERATION_RANGES.iter().position(|(generation, _, _)| *generation == name)
}

/// Short display label for one of the six standard stats
pub fn stat_label(stat_name: &str) -> Option<&'static str> {
    match stat_name {
        "hp" => Some("HP"),
        "attack" => Some("Attack"),
        "defense" => Some("Defense"),
        "special-attack" => Some("Sp. Atk"),
        "special-defense" => Some("Sp. Def"),
        "speed" => Some("Speed"),
        _ => None,
    }
}

/// Replaces hyphens with spaces: `"thunder-punch"` becomes `"thunder punch"`
pub fn spaced(name: &str) -> String {
    name.replace('-', " ")
}

/// Spaced and title-cased: `"special-attack"` becomes `"Special Attack"`
pub fn title_case(name: &str) -> String {
    name.split(['-', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Formats a value stored in tenths (decimetres, hectograms) with one decimal
pub fn tenths(value: u32) -> String {
    format!("{:.1}", f64::from(value) / 10.0)
}
