//! Command output
//!
//! Every command prints through `Output`, which renders one of three
//! ways: human-readable text, JSON for tooling (`--json`), or bare ids
//! for scripts (`--quiet`).

use tudo_core::Todo;

/// How command results are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text for people (the default)
    Human,
    /// Pretty-printed JSON
    Json,
    /// Ids only, no decoration
    Quiet,
}

impl OutputFormat {
    /// Resolve the global CLI flags; `--quiet` outranks `--json`
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        match (quiet, json) {
            (true, _) => OutputFormat::Quiet,
            (false, true) => OutputFormat::Json,
            (false, false) => OutputFormat::Human,
        }
    }
}

/// Renders command results in the selected format
pub struct Output {
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print one todo with all its fields
    pub fn print_todo(&self, todo: &Todo) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", todo.id);
                println!("Text:     {}", todo.text);
                println!("Done:     {}", if todo.completed { "yes" } else { "no" });
                println!("Position: {}", todo.order);
                println!("Created:  {}", todo.created_at.format("%Y-%m-%d %H:%M"));
                println!("Updated:  {}", todo.updated_at.format("%Y-%m-%d %H:%M"));
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(todo).unwrap()),
            OutputFormat::Quiet => println!("{}", todo.id),
        }
    }

    /// Print the list, one row per todo
    pub fn print_todos(&self, todos: &[Todo]) {
        match self.format {
            OutputFormat::Human => {
                if todos.is_empty() {
                    println!("No todos found.");
                    return;
                }
                for todo in todos {
                    let check = if todo.completed { "x" } else { " " };
                    println!(
                        "{} | [{}] {}",
                        &todo.id.to_string()[..8],
                        check,
                        truncate(&todo.text, 60)
                    );
                }
                println!("\n{} todo(s)", todos.len());
            }
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(todos).unwrap()),
            OutputFormat::Quiet => {
                for todo in todos {
                    println!("{}", todo.id);
                }
            }
        }
    }

    /// Confirm a completed action; silent in quiet mode
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => println!(
                "{}",
                serde_json::json!({"status": "success", "message": message})
            ),
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational note; silent in quiet mode
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => println!("{}", serde_json::json!({"message": msg})),
            OutputFormat::Quiet => {}
        }
    }
}

/// Shorten long text to `max_chars`, ending in "..."
///
/// Counts chars rather than bytes so multibyte text never splits.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}
