//! Pending-deletion ledger
//!
//! Tracks ids deleted locally that the remote has not yet confirmed gone.
//! The ledger is append-only between syncs and cleared as a whole once a
//! sync succeeds; persistence is handled by the owning store.

use std::collections::BTreeSet;

use uuid::Uuid;

/// The set of item ids awaiting remote deletion
///
/// Backed by a `BTreeSet` so iteration order is stable, which keeps the
/// remote delete sequence deterministic across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionLedger {
    ids: BTreeSet<Uuid>,
}

impl DeletionLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted ids
    pub fn from_ids(ids: impl IntoIterator<Item = Uuid>) -> Self {
        Self {
            ids: ids.into_iter().collect(),
        }
    }

    /// Enroll an id for remote deletion
    ///
    /// Idempotent. Returns `true` if the id was newly added.
    pub fn add(&mut self, id: Uuid) -> bool {
        self.ids.insert(id)
    }

    /// Whether an id is awaiting deletion
    pub fn contains(&self, id: &Uuid) -> bool {
        self.ids.contains(id)
    }

    /// The ids in stable order
    pub fn ids(&self) -> impl Iterator<Item = &Uuid> {
        self.ids.iter()
    }

    /// Snapshot the ids for persistence
    pub fn to_vec(&self) -> Vec<Uuid> {
        self.ids.iter().copied().collect()
    }

    /// Drop all entries
    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Number of pending deletions
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the ledger is empty
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
