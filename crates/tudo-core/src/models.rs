//! Data models for tudo
//!
//! Defines the synchronized todo item and the validation rules applied
//! at the boundary before an item enters the store. Items serialize with
//! camelCase field names and epoch-millisecond timestamps, matching the
//! remote service's JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Maximum todo text length, measured after trimming
pub const MAX_TEXT_LEN: usize = 500;

/// Maximum number of items in the list
pub const MAX_ITEMS: usize = 1000;

/// A single todo item
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    /// Unique identifier, generated on the creating device
    pub id: Uuid,
    /// The todo text, non-empty and trimmed
    pub text: String,
    /// Whether the item is done
    pub completed: bool,
    /// When this item was created (immutable)
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    /// When this item was last modified, drives last-writer-wins
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Display position; compared, not required to be contiguous
    pub order: i64,
}

impl Todo {
    /// Create a new todo with the given text and position
    pub fn new(text: impl Into<String>, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            completed: false,
            created_at: now,
            updated_at: now,
            order,
        }
    }

    /// Create a todo with a specific ID (for loading from storage)
    pub fn with_id(id: Uuid, text: impl Into<String>, order: i64) -> Self {
        let now = Utc::now();
        Self {
            id,
            text: text.into(),
            completed: false,
            created_at: now,
            updated_at: now,
            order,
        }
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.updated_at = Utc::now();
    }

    /// Set the completion state
    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
        self.updated_at = Utc::now();
    }

    /// Flip the completion state
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
        self.updated_at = Utc::now();
    }

    /// Move to a new position
    ///
    /// Deliberately does not touch `updated_at`: a pure reorder is not a
    /// content change, so it never wins a last-writer-wins comparison.
    pub fn set_order(&mut self, order: i64) {
        self.order = order;
    }

    /// Sort key giving items a deterministic total order across devices
    pub fn sort_key(&self) -> (i64, Uuid) {
        (self.order, self.id)
    }
}

/// Errors for user-supplied todo input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// No text given at all
    #[error("Todo text cannot be empty")]
    Empty,

    /// Text given but only whitespace
    #[error("Todo text cannot be only whitespace")]
    WhitespaceOnly,

    /// Text longer than the allowed maximum
    #[error("Todo text cannot exceed {max} characters")]
    TooLong { max: usize },

    /// The list is already at capacity
    #[error("Cannot have more than {max} todos")]
    TooManyItems { max: usize },
}

/// Validate and normalize todo text
///
/// Returns the trimmed text on success.
pub fn validate_text(text: &str) -> Result<String, ValidationError> {
    if text.is_empty() {
        return Err(ValidationError::Empty);
    }

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::WhitespaceOnly);
    }

    if trimmed.chars().count() > MAX_TEXT_LEN {
        return Err(ValidationError::TooLong { max: MAX_TEXT_LEN });
    }

    Ok(trimmed.to_string())
}
