//! Unified storage interface
//!
//! The `TodoStore` owns the in-memory item list, the pending-deletion
//! ledger, and the last-sync timestamp, and keeps all three persisted
//! through `LocalStore`. Every mutation saves before returning, so the
//! on-disk state always matches what callers have observed.
//!
//! ## Usage
//!
//! ```ignore
//! let mut store = TodoStore::open()?;  // Creates or loads existing
//!
//! let todo = store.add("buy milk")?;
//! store.toggle(todo.id)?;
//!
//! // Query items (sorted by position)
//! let items = store.items();
//! ```

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::ledger::DeletionLedger;
use crate::models::{validate_text, Todo, ValidationError, MAX_ITEMS};
use crate::storage::{LocalStore, StorageError};

/// Errors surfaced by store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// User input was rejected
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A data file could not be written
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// No item with the given id
    #[error("No todo found with id {id}")]
    NotFound { id: Uuid },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[source] anyhow::Error),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Unified storage interface for tudo
///
/// Items are held sorted by `(order, id)` so listing is deterministic
/// across devices that applied the same sync result.
pub struct TodoStore {
    /// The item list, sorted by position
    items: Vec<Todo>,
    /// Ids deleted locally, awaiting remote confirmation
    ledger: DeletionLedger,
    /// Timestamp of the last successful sync
    last_sync: Option<DateTime<Utc>>,
    /// File persistence
    local: LocalStore,
    /// Configuration
    config: Config,
}

impl TodoStore {
    /// Open the store, loading persisted state if present
    pub fn open() -> StoreResult<Self> {
        let config = Config::load().map_err(StoreError::Config)?;
        Self::open_with_config(config)
    }

    /// Open the store with a specific configuration
    ///
    /// Missing or corrupt data files load as empty, so this only fails
    /// when the configuration itself is unusable.
    pub fn open_with_config(config: Config) -> StoreResult<Self> {
        let local = LocalStore::new(config.clone());

        let mut items = local.load_items();
        items.sort_by_key(Todo::sort_key);
        let ledger = DeletionLedger::from_ids(local.load_pending_deletes());
        let last_sync = local.load_last_sync();

        debug!(
            items = items.len(),
            pending_deletes = ledger.len(),
            "opened todo store"
        );

        Ok(Self {
            items,
            ledger,
            last_sync,
            local,
            config,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    // ==================== Item Operations ====================

    /// Add a new todo from user input
    ///
    /// The text is validated and trimmed; the new item goes to the end of
    /// the list.
    pub fn add(&mut self, text: &str) -> StoreResult<Todo> {
        let text = validate_text(text)?;
        if self.items.len() >= MAX_ITEMS {
            return Err(ValidationError::TooManyItems { max: MAX_ITEMS }.into());
        }

        let order = self
            .items
            .iter()
            .map(|t| t.order)
            .max()
            .map_or(0, |max| max + 1);
        let todo = Todo::new(text, order);

        self.items.push(todo.clone());
        self.items.sort_by_key(Todo::sort_key);
        self.local.save_items(&self.items)?;
        Ok(todo)
    }

    /// Flip an item's completion state
    pub fn toggle(&mut self, id: Uuid) -> StoreResult<Todo> {
        let item = self
            .items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        item.toggle();
        let updated = item.clone();
        self.local.save_items(&self.items)?;
        Ok(updated)
    }

    /// Replace an item's text
    pub fn edit(&mut self, id: Uuid, text: &str) -> StoreResult<Todo> {
        let text = validate_text(text)?;
        let item = self
            .items
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        item.set_text(text);
        let updated = item.clone();
        self.local.save_items(&self.items)?;
        Ok(updated)
    }

    /// Delete an item locally and enroll it for remote deletion
    ///
    /// The remote is not contacted here; the id goes into the ledger and
    /// the next successful sync confirms the deletion.
    pub fn remove(&mut self, id: Uuid) -> StoreResult<Todo> {
        let pos = self
            .items
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;
        let removed = self.items.remove(pos);

        self.ledger.add(id);
        self.local.save_items(&self.items)?;
        self.local.save_pending_deletes(&self.ledger.to_vec())?;
        Ok(removed)
    }

    /// Move an item to a new zero-based position
    ///
    /// Positions are reassigned contiguously. `updated_at` is left alone:
    /// a reorder is not a content change and never wins a conflict.
    pub fn move_to(&mut self, id: Uuid, position: usize) -> StoreResult<()> {
        let pos = self
            .items
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::NotFound { id })?;

        let item = self.items.remove(pos);
        let target = position.min(self.items.len());
        self.items.insert(target, item);

        for (index, item) in self.items.iter_mut().enumerate() {
            item.set_order(index as i64);
        }
        self.local.save_items(&self.items)?;
        Ok(())
    }

    /// Get all items, sorted by position
    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    /// Get an item by id
    pub fn get(&self, id: Uuid) -> Option<&Todo> {
        self.items.iter().find(|t| t.id == id)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the list is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    // ==================== Sync State ====================

    /// The pending-deletion ledger
    pub fn pending_deletes(&self) -> &DeletionLedger {
        &self.ledger
    }

    /// Timestamp of the last successful sync
    pub fn last_sync(&self) -> Option<DateTime<Utc>> {
        self.last_sync
    }

    /// Count local changes not yet covered by a successful sync
    ///
    /// Items modified after the last sync plus pending deletions. Before
    /// the first sync every item counts as pending.
    pub fn pending_changes(&self) -> usize {
        let modified = match self.last_sync {
            Some(t) => self.items.iter().filter(|i| i.updated_at > t).count(),
            None => self.items.len(),
        };
        modified + self.ledger.len()
    }

    /// Apply a successful sync result
    ///
    /// Replaces the item list with the merged result, clears the ledger,
    /// and stamps the sync time. This is the only path that clears the
    /// ledger; a failed sync must leave the store untouched instead.
    pub fn apply_sync(&mut self, merged: Vec<Todo>, at: DateTime<Utc>) -> StoreResult<()> {
        let mut merged = merged;
        merged.sort_by_key(Todo::sort_key);

        self.local.save_items(&merged)?;
        self.items = merged;

        self.ledger.clear();
        self.local.save_pending_deletes(&[])?;

        self.local.save_last_sync(at)?;
        self.last_sync = Some(at);

        debug!(items = self.items.len(), "applied sync result");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: "http://localhost:3001".to_string(),
            sync_enabled: false,
            request_timeout_secs: 120,
        }
    }

    #[test]
    fn test_open_creates_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        assert!(store.is_empty());
        assert!(store.pending_deletes().is_empty());
        assert!(store.last_sync().is_none());
    }

    #[test]
    fn test_add_assigns_incrementing_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let first = store.add("first").unwrap();
        let second = store.add("second").unwrap();
        let third = store.add("third").unwrap();

        assert_eq!(first.order, 0);
        assert_eq!(second.order, 1);
        assert_eq!(third.order, 2);
    }

    #[test]
    fn test_add_trims_and_validates() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let todo = store.add("  buy milk  ").unwrap();
        assert_eq!(todo.text, "buy milk");

        assert!(matches!(
            store.add(""),
            Err(StoreError::Validation(ValidationError::Empty))
        ));
        assert!(matches!(
            store.add("   "),
            Err(StoreError::Validation(ValidationError::WhitespaceOnly))
        ));
        assert!(matches!(
            store.add(&"x".repeat(501)),
            Err(StoreError::Validation(ValidationError::TooLong { .. }))
        ));

        // Failed adds leave the list alone
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_add_enforces_item_cap() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let full: Vec<Todo> = (0..MAX_ITEMS as i64)
            .map(|i| Todo::new(format!("item {}", i), i))
            .collect();
        store.apply_sync(full, Utc::now()).unwrap();

        assert!(matches!(
            store.add("one more"),
            Err(StoreError::Validation(ValidationError::TooManyItems { .. }))
        ));
    }

    #[test]
    fn test_toggle_flips_and_persists() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let id;
        {
            let mut store = TodoStore::open_with_config(config.clone()).unwrap();
            id = store.add("buy milk").unwrap().id;
            let toggled = store.toggle(id).unwrap();
            assert!(toggled.completed);
        }

        let store = TodoStore::open_with_config(config).unwrap();
        assert!(store.get(id).unwrap().completed);
    }

    #[test]
    fn test_toggle_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let missing = Uuid::new_v4();
        assert!(matches!(
            store.toggle(missing),
            Err(StoreError::NotFound { id }) if id == missing
        ));
    }

    #[test]
    fn test_edit_replaces_text() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let id = store.add("buy milk").unwrap().id;
        let edited = store.edit(id, "buy oat milk").unwrap();

        assert_eq!(edited.text, "buy oat milk");
        assert_eq!(store.get(id).unwrap().text, "buy oat milk");

        assert!(matches!(
            store.edit(id, "   "),
            Err(StoreError::Validation(ValidationError::WhitespaceOnly))
        ));
    }

    #[test]
    fn test_remove_enrolls_pending_delete() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let id;
        {
            let mut store = TodoStore::open_with_config(config.clone()).unwrap();
            id = store.add("buy milk").unwrap().id;
            let removed = store.remove(id).unwrap();
            assert_eq!(removed.id, id);
            assert!(store.is_empty());
            assert!(store.pending_deletes().contains(&id));
        }

        // Ledger survives a restart
        let store = TodoStore::open_with_config(config).unwrap();
        assert!(store.pending_deletes().contains(&id));
        assert!(store.get(id).is_none());
    }

    #[test]
    fn test_remove_unknown_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        assert!(matches!(
            store.remove(Uuid::new_v4()),
            Err(StoreError::NotFound { .. })
        ));
        assert!(store.pending_deletes().is_empty());
    }

    #[test]
    fn test_move_to_reassigns_orders_without_touching_updated_at() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();
        let c = store.add("c").unwrap();
        let before = store.get(c.id).unwrap().updated_at;

        std::thread::sleep(std::time::Duration::from_millis(10));
        store.move_to(c.id, 0).unwrap();

        let texts: Vec<&str> = store.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["c", "a", "b"]);

        let orders: Vec<i64> = store.items().iter().map(|t| t.order).collect();
        assert_eq!(orders, vec![0, 1, 2]);

        assert_eq!(store.get(c.id).unwrap().updated_at, before);
        assert_eq!(store.get(a.id).unwrap().order, 1);
        assert_eq!(store.get(b.id).unwrap().order, 2);
    }

    #[test]
    fn test_move_to_clamps_position() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let a = store.add("a").unwrap();
        store.add("b").unwrap();

        store.move_to(a.id, 99).unwrap();
        let texts: Vec<&str> = store.items().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "a"]);
    }

    #[test]
    fn test_items_sorted_by_order_then_id() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let mut low = Todo::new("low", 5);
        let mut high = Todo::new("high", 5);
        low.id = Uuid::from_u128(1);
        high.id = Uuid::from_u128(2);
        let first = Todo::new("first", 0);

        store
            .apply_sync(vec![high.clone(), low.clone(), first.clone()], Utc::now())
            .unwrap();

        let ids: Vec<Uuid> = store.items().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, low.id, high.id]);
    }

    #[test]
    fn test_pending_changes_before_first_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        store.add("a").unwrap();
        store.add("b").unwrap();
        let c = store.add("c").unwrap();
        store.remove(c.id).unwrap();

        // Never synced: every item counts, plus the pending deletion
        assert_eq!(store.pending_changes(), 3);
    }

    #[test]
    fn test_pending_changes_after_sync() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = TodoStore::open_with_config(test_config(&temp_dir)).unwrap();

        let a = store.add("a").unwrap();
        let b = store.add("b").unwrap();

        let merged = store.items().to_vec();
        store.apply_sync(merged, Utc::now()).unwrap();
        assert_eq!(store.pending_changes(), 0);

        std::thread::sleep(std::time::Duration::from_millis(10));
        store.toggle(a.id).unwrap();
        assert_eq!(store.pending_changes(), 1);

        store.remove(b.id).unwrap();
        assert_eq!(store.pending_changes(), 2);
    }

    #[test]
    fn test_apply_sync_replaces_clears_and_stamps() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let synced_at = Utc::now();
        {
            let mut store = TodoStore::open_with_config(config.clone()).unwrap();
            let stale = store.add("stale").unwrap();
            store.remove(stale.id).unwrap();
            assert_eq!(store.pending_deletes().len(), 1);

            let merged = vec![Todo::new("from remote", 0)];
            store.apply_sync(merged, synced_at).unwrap();

            assert_eq!(store.len(), 1);
            assert_eq!(store.items()[0].text, "from remote");
            assert!(store.pending_deletes().is_empty());
            assert_eq!(
                store.last_sync().unwrap().timestamp_millis(),
                synced_at.timestamp_millis()
            );
        }

        // Everything persisted
        let store = TodoStore::open_with_config(config).unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.pending_deletes().is_empty());
        assert!(store.last_sync().is_some());
    }

    #[test]
    fn test_data_persists_across_reopens() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        {
            let mut store = TodoStore::open_with_config(config.clone()).unwrap();
            store.add("persistent todo").unwrap();
        }

        {
            let store = TodoStore::open_with_config(config).unwrap();
            assert_eq!(store.len(), 1);
            assert_eq!(store.items()[0].text, "persistent todo");
        }
    }
}
