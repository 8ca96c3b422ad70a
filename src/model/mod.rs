//! Record kinds and the contract a store needs from them.

mod item;
mod patch;
mod task;

pub use item::{Item, ItemChanges, ItemDraft, ItemFilter, ItemPatch, NewItem};
pub use patch::Patch;
pub use task::{
    parse_status_filter, NewTask, Task, TaskChanges, TaskDraft, TaskFilter, TaskPatch, TaskStatus,
};

use chrono::{DateTime, Utc};

/// A record kind held by a [`ResourceStore`](crate::store::ResourceStore).
///
/// `Create` and `Patch` are already-validated payloads; stores apply them
/// without further checks.
pub trait Resource: Clone + Send + Sync + 'static {
    /// Human-readable kind, used in `NotFound` messages.
    const KIND: &'static str;
    /// Page size when a list query names none; `None` lists every match.
    const DEFAULT_LIMIT: Option<usize>;

    type Create: Send + 'static;
    type Patch: Send + 'static;
    /// One field paired with the value it must equal.
    type Filter: Send + Sync + 'static;

    fn id(&self) -> i64;

    /// Build the record for a freshly allocated id.
    fn build(id: i64, fields: Self::Create, now: DateTime<Utc>) -> Self;

    /// Merge the supplied fields; untouched fields keep their values.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    fn matches(&self, filter: &Self::Filter) -> bool;
}
