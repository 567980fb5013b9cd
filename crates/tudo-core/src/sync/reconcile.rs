//! Reconciliation algorithm
//!
//! Merges the local item list against the server's list and pushes the
//! differences while it finds them. Conflicts on the same id resolve by
//! last-writer-wins on `updated_at`; a tie keeps the server's copy so
//! every device converges on the same answer.
//!
//! The pass performs remote writes as a side effect of computing the
//! merge. The first failed call aborts the whole pass and the caller
//! discards the partial merge; because every call is keyed by item id,
//! a retry simply redoes the same work.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::ledger::DeletionLedger;
use crate::models::Todo;
use crate::remote::{RemoteResult, RemoteStore};

/// Counts of the remote operations performed during one pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Local-only items created on the server
    pub created: usize,
    /// Conflicting items where the local copy won and was pushed
    pub updated: usize,
    /// Pending deletions confirmed on the server
    pub deleted: usize,
    /// Server-only items adopted into the local list
    pub adopted: usize,
}

impl SyncReport {
    /// Items sent to the server
    pub fn pushed(&self) -> usize {
        self.created + self.updated
    }

    /// Items taken over from the server
    pub fn pulled(&self) -> usize {
        self.adopted
    }

    /// Whether the pass changed anything on either side
    pub fn is_empty(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0 && self.adopted == 0
    }
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "pushed {}, pulled {}, deleted {}",
            self.pushed(),
            self.pulled(),
            self.deleted
        )
    }
}

/// Result of one reconciliation pass
#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// The merged list to persist locally, sorted by `(order, id)`
    pub merged: Vec<Todo>,
    /// What the pass did to the remote along the way
    pub report: SyncReport,
}

/// Merge local and remote item sets, pushing differences to the remote
///
/// Fetches the full remote list, confirms pending deletions, then
/// classifies the remaining ids:
///
/// - present on both sides: last-writer-wins by `updated_at`, pushing an
///   update when the local copy is strictly newer; ties keep the remote
/// - local only: created on the remote, kept in the merge
/// - remote only: adopted into the merge, nothing pushed
///
/// Ids in the ledger that the remote no longer has need no call at all;
/// their entries just lapse when the caller clears the ledger.
pub async fn reconcile(
    remote: &dyn RemoteStore,
    local: Vec<Todo>,
    pending_deletes: &DeletionLedger,
) -> RemoteResult<ReconcileOutcome> {
    let mut remote_by_id: HashMap<Uuid, Todo> = remote
        .list_all()
        .await?
        .into_iter()
        .map(|todo| (todo.id, todo))
        .collect();

    debug!(
        local = local.len(),
        remote = remote_by_id.len(),
        pending_deletes = pending_deletes.len(),
        "reconciling"
    );

    let mut report = SyncReport::default();

    // A deleted-while-offline id outranks any copy still in the input
    let local: Vec<Todo> = local
        .into_iter()
        .filter(|todo| !pending_deletes.contains(&todo.id))
        .collect();

    for id in pending_deletes.ids() {
        if remote_by_id.remove(id).is_some() {
            remote.delete(*id).await?;
            report.deleted += 1;
        }
    }

    let mut merged: Vec<Todo> = Vec::with_capacity(local.len() + remote_by_id.len());

    for todo in local {
        match remote_by_id.remove(&todo.id) {
            Some(remote_todo) => {
                if todo.updated_at > remote_todo.updated_at {
                    merged.push(remote.update(&todo).await?);
                    report.updated += 1;
                } else {
                    // Remote is newer, or the timestamps tie: remote wins
                    merged.push(remote_todo);
                }
            }
            None => {
                merged.push(remote.create(&todo).await?);
                report.created += 1;
            }
        }
    }

    // Whatever remains on the remote was created on another device
    report.adopted = remote_by_id.len();
    merged.extend(remote_by_id.into_values());

    merged.sort_by_key(Todo::sort_key);

    debug!(merged = merged.len(), %report, "reconciliation complete");

    Ok(ReconcileOutcome { merged, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    use crate::remote::memory::RemoteCall;
    use crate::remote::{MemoryRemote, RemoteError};

    fn at(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    /// A todo with pinned timestamps so conflicts are deterministic
    fn todo_updated_at(text: &str, order: i64, updated_ms: i64) -> Todo {
        let mut todo = Todo::new(text, order);
        todo.created_at = at(0);
        todo.updated_at = at(updated_ms);
        todo
    }

    #[tokio::test]
    async fn test_newer_remote_wins_and_new_remote_items_adopt_without_pushes() {
        let remote = MemoryRemote::new();

        let local_a = todo_updated_at("old text", 0, 100);
        let mut remote_a = local_a.clone();
        remote_a.text = "new text".to_string();
        remote_a.updated_at = at(200);
        let remote_b = todo_updated_at("from the other device", 1, 150);
        remote.seed(vec![remote_a, remote_b.clone()]).await;

        let outcome = reconcile(&remote, vec![local_a], &DeletionLedger::new())
            .await
            .unwrap();

        assert_eq!(outcome.merged.len(), 2);
        assert_eq!(outcome.merged[0].text, "new text");
        assert_eq!(outcome.merged[1].id, remote_b.id);
        assert_eq!(
            outcome.report,
            SyncReport {
                adopted: 1,
                ..Default::default()
            }
        );

        // Nothing needed pushing, so the only call is the fetch
        assert_eq!(remote.calls().await, vec![RemoteCall::List]);
    }

    #[tokio::test]
    async fn test_newer_local_wins_and_is_pushed() {
        let remote = MemoryRemote::new();

        let remote_a = todo_updated_at("stale", 0, 100);
        let mut local_a = remote_a.clone();
        local_a.text = "fresh".to_string();
        local_a.updated_at = at(300);
        remote.seed(vec![remote_a]).await;

        let outcome = reconcile(&remote, vec![local_a.clone()], &DeletionLedger::new())
            .await
            .unwrap();

        assert_eq!(outcome.merged.len(), 1);
        assert_eq!(outcome.merged[0].text, "fresh");
        assert_eq!(outcome.report.updated, 1);
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::List, RemoteCall::Update(local_a.id)]
        );
        assert_eq!(remote.snapshot().await[0].text, "fresh");
    }

    #[tokio::test]
    async fn test_equal_timestamps_keep_the_remote_copy() {
        let remote = MemoryRemote::new();

        let local_a = todo_updated_at("mine", 0, 100);
        let mut remote_a = local_a.clone();
        remote_a.text = "theirs".to_string();
        remote.seed(vec![remote_a]).await;

        let outcome = reconcile(&remote, vec![local_a], &DeletionLedger::new())
            .await
            .unwrap();

        assert_eq!(outcome.merged[0].text, "theirs");
        assert_eq!(outcome.report, SyncReport::default());
        assert_eq!(remote.calls().await, vec![RemoteCall::List]);
    }

    #[tokio::test]
    async fn test_local_only_item_is_created_remotely_and_kept() {
        let remote = MemoryRemote::new();
        let local_c = todo_updated_at("made offline", 0, 100);

        let outcome = reconcile(&remote, vec![local_c.clone()], &DeletionLedger::new())
            .await
            .unwrap();

        assert_eq!(outcome.merged.len(), 1);
        assert_eq!(outcome.merged[0].id, local_c.id);
        assert_eq!(outcome.report.created, 1);
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::List, RemoteCall::Create(local_c.id)]
        );
        assert_eq!(remote.snapshot().await.len(), 1);
    }

    #[tokio::test]
    async fn test_pending_delete_still_on_remote_is_confirmed() {
        let remote = MemoryRemote::new();
        let doomed = todo_updated_at("deleted offline", 0, 100);
        remote.seed(vec![doomed.clone()]).await;

        let ledger = DeletionLedger::from_ids(vec![doomed.id]);
        let outcome = reconcile(&remote, vec![], &ledger).await.unwrap();

        assert!(outcome.merged.is_empty());
        assert_eq!(outcome.report.deleted, 1);
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::List, RemoteCall::Delete(doomed.id)]
        );
        assert!(remote.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_pending_delete_already_gone_needs_no_call() {
        let remote = MemoryRemote::new();
        let ledger = DeletionLedger::from_ids(vec![Uuid::new_v4()]);

        let outcome = reconcile(&remote, vec![], &ledger).await.unwrap();

        assert!(outcome.merged.is_empty());
        assert_eq!(outcome.report, SyncReport::default());
        assert_eq!(remote.calls().await, vec![RemoteCall::List]);
    }

    #[tokio::test]
    async fn test_ledger_outranks_a_lingering_local_copy() {
        let remote = MemoryRemote::new();
        let doomed = todo_updated_at("zombie", 0, 100);
        remote.seed(vec![doomed.clone()]).await;

        let ledger = DeletionLedger::from_ids(vec![doomed.id]);
        let outcome = reconcile(&remote, vec![doomed.clone()], &ledger)
            .await
            .unwrap();

        assert!(outcome.merged.is_empty());
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::List, RemoteCall::Delete(doomed.id)]
        );
    }

    #[tokio::test]
    async fn test_failed_list_aborts_before_any_mutation() {
        let remote = MemoryRemote::new();
        remote.set_failing(true);

        let local = vec![todo_updated_at("anything", 0, 100)];
        let ledger = DeletionLedger::from_ids(vec![Uuid::new_v4()]);

        let err = reconcile(&remote, local, &ledger).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
        assert_eq!(remote.calls().await, vec![RemoteCall::List]);
    }

    #[tokio::test]
    async fn test_failed_push_aborts_the_pass() {
        let remote = MemoryRemote::new();
        // The list succeeds, the first create fails
        remote.fail_after(1);

        let first = todo_updated_at("first", 0, 100);
        let second = todo_updated_at("second", 1, 100);

        let err = reconcile(
            &remote,
            vec![first.clone(), second],
            &DeletionLedger::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RemoteError::Unavailable(_)));
        assert_eq!(
            remote.calls().await,
            vec![RemoteCall::List, RemoteCall::Create(first.id)]
        );
    }

    #[tokio::test]
    async fn test_merge_is_sorted_by_order_then_id() {
        let remote = MemoryRemote::new();

        let mut low = todo_updated_at("low id", 5, 100);
        let mut high = todo_updated_at("high id", 5, 100);
        low.id = Uuid::from_u128(1);
        high.id = Uuid::from_u128(2);
        let first = todo_updated_at("first", 0, 100);
        remote.seed(vec![high.clone(), low.clone()]).await;

        let outcome = reconcile(&remote, vec![first.clone()], &DeletionLedger::new())
            .await
            .unwrap();

        let ids: Vec<Uuid> = outcome.merged.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, low.id, high.id]);
    }

    #[test]
    fn test_report_display_and_helpers() {
        let report = SyncReport {
            created: 2,
            updated: 1,
            deleted: 1,
            adopted: 3,
        };

        assert_eq!(report.pushed(), 3);
        assert_eq!(report.pulled(), 3);
        assert!(!report.is_empty());
        assert_eq!(report.to_string(), "pushed 3, pulled 3, deleted 1");

        assert!(SyncReport::default().is_empty());
    }
}
