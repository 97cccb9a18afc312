//! Move-data reconciliation
//!
//! A Pokemon's learnset spans every game it appeared in. `selector` picks the
//! single most relevant version group and gathers the learn methods declared for
//! it; `reconciler` fetches move details and sorts them into per-method lists.

pub mod reconciler;
pub mod selector;

pub use reconciler::{MoveBuckets, MoveReconciler};
pub use selector::{
    LearnDetail, LearnMethod, MoveLearnRecord, Selection, VersionGroupSelector,
    PREFERRED_VERSION_GROUPS,
};
