//! Todo command handlers

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use tudo_core::{Todo, TodoStore};

use crate::output::Output;

/// Add a new todo
pub fn add(store: &mut TodoStore, text: String, output: &Output) -> Result<()> {
    let todo = store.add(&text).context("Failed to add todo")?;

    output.success(&format!("Added todo: {}", todo.id));
    output.print_todo(&todo);

    Ok(())
}

/// List todos, optionally hiding completed ones
pub fn list(store: &TodoStore, active: bool, output: &Output) -> Result<()> {
    if active {
        let todos: Vec<Todo> = store
            .items()
            .iter()
            .filter(|t| !t.completed)
            .cloned()
            .collect();
        output.print_todos(&todos);
    } else {
        output.print_todos(store.items());
    }
    Ok(())
}

/// Toggle a todo between done and open
pub fn done(store: &mut TodoStore, id: String, output: &Output) -> Result<()> {
    let uuid = parse_todo_id(&id, store)?;

    let todo = store.toggle(uuid).context("Failed to toggle todo")?;

    let verb = if todo.completed { "Done" } else { "Reopened" };
    output.success(&format!("{}: {}", verb, todo.text));

    Ok(())
}

/// Change a todo's text
pub fn edit(store: &mut TodoStore, id: String, text: String, output: &Output) -> Result<()> {
    let uuid = parse_todo_id(&id, store)?;

    let todo = store.edit(uuid, &text).context("Failed to edit todo")?;

    output.success("Todo updated");
    output.print_todo(&todo);

    Ok(())
}

/// Delete a todo
pub fn delete(store: &mut TodoStore, id: String, output: &Output) -> Result<()> {
    let uuid = parse_todo_id(&id, store)?;

    store.remove(uuid).context("Failed to delete todo")?;

    output.success(&format!("Deleted todo: {}", uuid));

    Ok(())
}

/// Move a todo to a new position (0-based)
pub fn move_to(store: &mut TodoStore, id: String, position: usize, output: &Output) -> Result<()> {
    let uuid = parse_todo_id(&id, store)?;

    store
        .move_to(uuid, position)
        .context("Failed to move todo")?;

    output.success(&format!("Moved todo to position {}", position));

    Ok(())
}

/// Parse a todo ID (supports full UUID or prefix)
fn parse_todo_id(id: &str, store: &TodoStore) -> Result<Uuid> {
    // Try full UUID first
    if let Ok(uuid) = Uuid::parse_str(id) {
        return Ok(uuid);
    }

    // Try prefix match
    let matches: Vec<&Todo> = store
        .items()
        .iter()
        .filter(|t| t.id.to_string().starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No todo found matching: {}", id),
        1 => Ok(matches[0].id),
        _ => {
            eprintln!("Multiple todos match '{}':", id);
            for todo in &matches {
                eprintln!("  {} - {}", todo.id, todo.text);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use tudo_core::Config;

    fn test_store(temp_dir: &TempDir) -> TodoStore {
        let config = Config {
            data_dir: temp_dir.path().to_path_buf(),
            server_url: "http://localhost:3001".to_string(),
            sync_enabled: false,
            request_timeout_secs: 120,
        };
        TodoStore::open_with_config(config).unwrap()
    }

    #[test]
    fn test_parse_full_uuid() {
        let temp_dir = TempDir::new().unwrap();
        let store = test_store(&temp_dir);

        // A full UUID parses without consulting the store
        let id = Uuid::new_v4();
        assert_eq!(parse_todo_id(&id.to_string(), &store).unwrap(), id);
    }

    #[test]
    fn test_parse_unique_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        let todo = store.add("find me").unwrap();

        let prefix = &todo.id.to_string()[..8];
        assert_eq!(parse_todo_id(prefix, &store).unwrap(), todo.id);
    }

    #[test]
    fn test_parse_unknown_prefix_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        store.add("only one").unwrap();

        assert!(parse_todo_id("zzzz", &store).is_err());
    }

    #[test]
    fn test_parse_ambiguous_prefix_fails() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = test_store(&temp_dir);
        store.add("one").unwrap();
        store.add("two").unwrap();

        // The empty prefix matches every id
        assert!(parse_todo_id("", &store).is_err());
    }
}
