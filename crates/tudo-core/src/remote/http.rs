//! REST client for the todo server
//!
//! Routes:
//! - `GET /todos` - list everything
//! - `POST /todos` - create
//! - `PUT /todos/{id}` - update
//! - `DELETE /todos/{id}` - delete (404 counts as already done)
//! - `HEAD /todos` - health probe with a short timeout

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use tracing::debug;
use uuid::Uuid;

use crate::config::Config;
use crate::models::Todo;
use crate::remote::{RemoteError, RemoteResult, RemoteStore};

/// Health probes answer fast or not at all
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

/// HTTP implementation of the remote todo service
pub struct HttpRemote {
    client: Client,
    base_url: String,
}

impl HttpRemote {
    /// Build a client from the configuration
    ///
    /// The request timeout applies to every CRUD call; the health probe
    /// uses its own shorter per-request timeout.
    pub fn new(config: &Config) -> RemoteResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn todos_url(&self) -> String {
        format!("{}/todos", self.base_url)
    }

    fn todo_url(&self, id: Uuid) -> String {
        format!("{}/todos/{}", self.base_url, id)
    }
}

/// Turn a non-success response into an API error with the server's body
async fn check_ok(response: Response) -> RemoteResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(RemoteError::Api {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl RemoteStore for HttpRemote {
    async fn list_all(&self) -> RemoteResult<Vec<Todo>> {
        let response = self.client.get(self.todos_url()).send().await?;
        let items: Vec<Todo> = check_ok(response).await?.json().await?;
        debug!(count = items.len(), "fetched remote items");
        Ok(items)
    }

    async fn create(&self, todo: &Todo) -> RemoteResult<Todo> {
        let response = self.client.post(self.todos_url()).json(todo).send().await?;
        Ok(check_ok(response).await?.json().await?)
    }

    async fn update(&self, todo: &Todo) -> RemoteResult<Todo> {
        let response = self
            .client
            .put(self.todo_url(todo.id))
            .json(todo)
            .send()
            .await?;
        Ok(check_ok(response).await?.json().await?)
    }

    async fn delete(&self, id: Uuid) -> RemoteResult<()> {
        let response = self.client.delete(self.todo_url(id)).send().await?;

        // Already gone on the server means the deletion is complete
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%id, "remote item already deleted");
            return Ok(());
        }

        check_ok(response).await?;
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let result = self
            .client
            .head(self.todos_url())
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await;

        match result {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_config(server_url: &str) -> Config {
        Config {
            data_dir: PathBuf::from("/tmp"),
            server_url: server_url.to_string(),
            sync_enabled: true,
            request_timeout_secs: 5,
        }
    }

    #[test]
    fn test_urls_join_cleanly() {
        let remote = HttpRemote::new(&test_config("http://localhost:3001/")).unwrap();
        assert_eq!(remote.todos_url(), "http://localhost:3001/todos");

        let id = Uuid::nil();
        assert_eq!(
            remote.todo_url(id),
            format!("http://localhost:3001/todos/{}", id)
        );
    }

    // Port 9 (discard) is never serving HTTP, so these exercise the
    // transport failure paths without a network
    #[tokio::test]
    async fn test_health_check_unreachable_is_false() {
        let remote = HttpRemote::new(&test_config("http://127.0.0.1:9")).unwrap();
        assert!(!remote.health_check().await);
    }

    #[tokio::test]
    async fn test_list_all_unreachable_is_transport_error() {
        let remote = HttpRemote::new(&test_config("http://127.0.0.1:9")).unwrap();
        let err = remote.list_all().await.unwrap_err();
        assert!(matches!(err, RemoteError::Transport(_)));
    }
}
