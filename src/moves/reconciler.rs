//! Move detail reconciliation
//!
//! Fetches the details of every move gathered by the selector, then files each
//! learn method into one of four lists: level-up, machine (TM/TR), egg and tutor.

use std::collections::HashSet;

use futures::future::join_all;
use tracing::{debug, warn};

use super::selector::{LearnMethod, MoveLearnRecord};
use crate::data::api::MoveResponse;
use crate::data::display::spaced;
use crate::data::{MoveEntry, Upstream};

/// Moves of one version group partitioned by learn method
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MoveBuckets {
    /// Sorted by level, then name
    pub level_up: Vec<MoveEntry>,
    /// TMs and TRs, sorted by name
    pub machine: Vec<MoveEntry>,
    pub egg: Vec<MoveEntry>,
    pub tutor: Vec<MoveEntry>,
}

impl MoveBuckets {
    /// Files fetched moves into buckets, deduplicating by move id and sorting
    pub fn from_fetched<'a, I>(fetched: I) -> Self
    where
        I: IntoIterator<Item = (&'a MoveLearnRecord, MoveResponse)>,
    {
        let mut buckets = MoveBuckets::default();
        let mut seen: [HashSet<u32>; 4] = Default::default();

        for (record, detail) in fetched {
            let base = MoveEntry {
                id: detail.id,
                name: spaced(&detail.name),
                move_type: detail.kind.name,
                category: detail.damage_class.name,
                power: detail.power,
                accuracy: detail.accuracy,
                pp: detail.pp,
                level: None,
            };

            for learn in &record.learn_methods {
                let (slot, bucket) = match learn.method {
                    LearnMethod::LevelUp => (0, &mut buckets.level_up),
                    LearnMethod::Machine => (1, &mut buckets.machine),
                    LearnMethod::Egg => (2, &mut buckets.egg),
                    LearnMethod::Tutor => (3, &mut buckets.tutor),
                    LearnMethod::Other(_) => continue,
                };
                if seen[slot].insert(base.id) {
                    bucket.push(MoveEntry {
                        level: learn.level,
                        ..base.clone()
                    });
                }
            }
        }

        buckets.sort();
        buckets
    }

    fn sort(&mut self) {
        self.level_up
            .sort_by(|a, b| a.level.cmp(&b.level).then_with(|| a.name.cmp(&b.name)));
        for bucket in [&mut self.machine, &mut self.egg, &mut self.tutor] {
            bucket.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }

    /// Total number of entries across all four lists
    pub fn len(&self) -> usize {
        self.level_up.len() + self.machine.len() + self.egg.len() + self.tutor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Fetches move details concurrently and buckets them
pub struct MoveReconciler<'a, U: ?Sized> {
    upstream: &'a U,
}

impl<'a, U: Upstream + ?Sized> MoveReconciler<'a, U> {
    pub fn new(upstream: &'a U) -> Self {
        Self { upstream }
    }

    /// Fetches every record's move and returns the sorted buckets
    ///
    /// All fetches run concurrently and are joined before bucketing. A move whose
    /// fetch or decode fails is logged and left out; the others are unaffected.
    pub async fn reconcile(&self, records: &[MoveLearnRecord]) -> MoveBuckets {
        let details = join_all(records.iter().map(|record| self.fetch_move(record))).await;

        let fetched: Vec<_> = records
            .iter()
            .zip(details)
            .filter_map(|(record, detail)| detail.map(|detail| (record, detail)))
            .collect();
        debug!(
            requested = records.len(),
            fetched = fetched.len(),
            "move details fetched"
        );

        MoveBuckets::from_fetched(fetched)
    }

    async fn fetch_move(&self, record: &MoveLearnRecord) -> Option<MoveResponse> {
        let body = match self.upstream.fetch_json(&record.move_url).await {
            Ok(body) => body,
            Err(e) => {
                warn!(move_name = %record.move_name, url = %record.move_url, error = %e, "failed move fetch");
                return None;
            }
        };

        match serde_json::from_value::<MoveResponse>(body) {
            Ok(detail) => Some(detail),
            Err(e) => {
                warn!(move_name = %record.move_name, error = %e, "unexpected move document");
                None
            }
        }
    }
}
