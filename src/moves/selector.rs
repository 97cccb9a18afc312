//! Version group selection
//!
//! Walks a ranked list of version groups and keeps the first one the Pokemon has
//! any move data for. Only that group's learn details are carried forward.

use std::collections::HashMap;

use crate::data::api::MoveSlot;

/// Version groups to try, most recent release first
pub const PREFERRED_VERSION_GROUPS: [&str; 7] = [
    "scarlet-violet",
    "legends-arceus",
    "brilliant-diamond-shining-pearl",
    "sword-shield",
    "lets-go-pikachu-lets-go-eevee",
    "ultra-sun-ultra-moon",
    "sun-moon",
];

/// How a move is acquired
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LearnMethod {
    LevelUp,
    /// TM or TR
    Machine,
    Egg,
    Tutor,
    /// Any other upstream method (e.g. "form-change"); ignored when bucketing
    Other(String),
}

impl LearnMethod {
    /// Parses an upstream `move_learn_method` name
    pub fn from_api(name: &str) -> Self {
        match name {
            "level-up" => LearnMethod::LevelUp,
            "machine" => LearnMethod::Machine,
            "egg" => LearnMethod::Egg,
            "tutor" => LearnMethod::Tutor,
            other => LearnMethod::Other(other.to_string()),
        }
    }
}

/// One learn-method/level pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearnDetail {
    pub method: LearnMethod,
    /// Set for level-up entries only
    pub level: Option<u32>,
}

/// Every way a single move is learned within the selected version group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveLearnRecord {
    pub move_name: String,
    /// Upstream URL of the move resource; used to fetch its details
    pub move_url: String,
    pub learn_methods: Vec<LearnDetail>,
}

/// Result of version group selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    /// The chosen version group, or `None` if no preferred group had data
    pub version_group: Option<String>,
    /// One record per distinct move, in learnset order
    pub moves: Vec<MoveLearnRecord>,
}

/// Picks the most preferred version group present in a learnset
#[derive(Debug, Clone)]
pub struct VersionGroupSelector {
    preferences: Vec<String>,
}

impl Default for VersionGroupSelector {
    fn default() -> Self {
        Self::new(PREFERRED_VERSION_GROUPS)
    }
}

impl VersionGroupSelector {
    /// Creates a selector over a custom preference list, most preferred first
    pub fn new<I, S>(preferences: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferences: preferences.into_iter().map(Into::into).collect(),
        }
    }

    /// The preference list, most preferred first
    pub fn preferences(&self) -> &[String] {
        &self.preferences
    }

    /// Selects a version group for `history` and collects its learn details
    ///
    /// Selection is strictly first match in preference order: move counts never
    /// matter and groups are never merged.
    pub fn select(&self, history: &[MoveSlot]) -> Selection {
        let selected = self.preferences.iter().find(|group| {
            history.iter().any(|slot| {
                slot.version_group_details
                    .iter()
                    .any(|detail| detail.version_group.name == group.as_str())
            })
        });

        match selected {
            Some(group) => Selection {
                version_group: Some(group.clone()),
                moves: collect_for_group(history, group),
            },
            None => Selection::default(),
        }
    }
}

/// Gathers every learn detail declared for `group`, merging repeated moves
fn collect_for_group(history: &[MoveSlot], group: &str) -> Vec<MoveLearnRecord> {
    let mut records: Vec<MoveLearnRecord> = Vec::new();
    let mut index_by_url: HashMap<&str, usize> = HashMap::new();

    for slot in history {
        let details = slot
            .version_group_details
            .iter()
            .filter(|detail| detail.version_group.name == group);

        for detail in details {
            let method = LearnMethod::from_api(&detail.move_learn_method.name);
            let level = (method == LearnMethod::LevelUp).then_some(detail.level_learned_at);

            let index = *index_by_url
                .entry(slot.move_ref.url.as_str())
                .or_insert_with(|| {
                    records.push(MoveLearnRecord {
                        move_name: slot.move_ref.name.clone(),
                        move_url: slot.move_ref.url.clone(),
                        learn_methods: Vec::new(),
                    });
                    records.len() - 1
                });
            records[index].learn_methods.push(LearnDetail { method, level });
        }
    }

    records
}
