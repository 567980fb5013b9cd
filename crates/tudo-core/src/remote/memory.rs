//! In-memory remote for tests
//!
//! Mimics the server contract without a network: CRUD keyed by id,
//! idempotent delete, and the same echo-back responses. Failure
//! injection and a call log let tests exercise the sync engine's
//! error paths and assert exactly which remote operations ran.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::Todo;
use crate::remote::{RemoteError, RemoteResult, RemoteStore};

/// A remote operation observed by the fake
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    List,
    Create(Uuid),
    Update(Uuid),
    Delete(Uuid),
}

/// In-process implementation of the remote todo service
pub struct MemoryRemote {
    items: Mutex<HashMap<Uuid, Todo>>,
    calls: Mutex<Vec<RemoteCall>>,
    /// When set, every operation fails
    fail_all: AtomicBool,
    /// When >= 0, that many operations succeed before the rest fail
    fail_after: AtomicI64,
    /// Artificial latency for `list_all`, in milliseconds
    list_delay_ms: AtomicU64,
    /// Health probe answer
    healthy: AtomicBool,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    pub fn new() -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            fail_all: AtomicBool::new(false),
            fail_after: AtomicI64::new(-1),
            list_delay_ms: AtomicU64::new(0),
            healthy: AtomicBool::new(true),
        }
    }

    /// Install server-side items
    pub async fn seed(&self, todos: Vec<Todo>) {
        let mut items = self.items.lock().await;
        for todo in todos {
            items.insert(todo.id, todo);
        }
    }

    /// Server-side items, sorted by position
    pub async fn snapshot(&self) -> Vec<Todo> {
        let items = self.items.lock().await;
        let mut all: Vec<Todo> = items.values().cloned().collect();
        all.sort_by_key(Todo::sort_key);
        all
    }

    /// The operations performed so far, in order
    pub async fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().await.clone()
    }

    /// Fail every subsequent operation
    pub fn set_failing(&self, failing: bool) {
        self.fail_all.store(failing, Ordering::SeqCst);
    }

    /// Let `n` operations succeed, then fail the rest
    pub fn fail_after(&self, n: i64) {
        self.fail_after.store(n, Ordering::SeqCst);
    }

    /// Delay every `list_all` response
    pub fn set_list_delay(&self, delay: Duration) {
        self.list_delay_ms
            .store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Set the health probe answer
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    async fn record(&self, call: RemoteCall) -> RemoteResult<()> {
        self.calls.lock().await.push(call);

        if self.fail_all.load(Ordering::SeqCst) {
            return Err(RemoteError::Unavailable("injected failure".to_string()));
        }

        let budget = self.fail_after.load(Ordering::SeqCst);
        if budget >= 0 {
            if budget == 0 {
                return Err(RemoteError::Unavailable("injected failure".to_string()));
            }
            self.fail_after.store(budget - 1, Ordering::SeqCst);
        }

        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemote {
    async fn list_all(&self) -> RemoteResult<Vec<Todo>> {
        self.record(RemoteCall::List).await?;

        let delay = self.list_delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }

        Ok(self.snapshot().await)
    }

    async fn create(&self, todo: &Todo) -> RemoteResult<Todo> {
        self.record(RemoteCall::Create(todo.id)).await?;
        self.items.lock().await.insert(todo.id, todo.clone());
        Ok(todo.clone())
    }

    async fn update(&self, todo: &Todo) -> RemoteResult<Todo> {
        self.record(RemoteCall::Update(todo.id)).await?;

        let mut items = self.items.lock().await;
        if !items.contains_key(&todo.id) {
            return Err(RemoteError::Api {
                status: 404,
                message: format!("no todo {}", todo.id),
            });
        }
        items.insert(todo.id, todo.clone());
        Ok(todo.clone())
    }

    async fn delete(&self, id: Uuid) -> RemoteResult<()> {
        self.record(RemoteCall::Delete(id)).await?;

        // Removing something already gone is still success
        self.items.lock().await.remove(&id);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}
