//! Typed field-level change sets for audit entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// How a single field differs between the old and new snapshot.
///
/// - `Added`   -- absent (null) before, present after.
/// - `Removed` -- present before, absent (null) after.
/// - `Changed` -- present on both sides with different values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Added,
    Removed,
    Changed,
}

impl DiffStatus {
    /// String representation for display, logging, and database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "added",
            Self::Removed => "removed",
            Self::Changed => "changed",
        }
    }
}

impl std::fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One changed field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    pub field: String,
    pub status: DiffStatus,
    pub from: Value,
    pub to: Value,
}

/// Ordered list of changed fields. Empty when nothing changed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet(pub Vec<FieldChange>);

impl ChangeSet {
    /// Record `field` if `from` and `to` differ.
    pub fn compare(&mut self, field: &str, from: Value, to: Value) {
        if from == to {
            return;
        }
        let status = match (&from, &to) {
            (Value::Null, _) => DiffStatus::Added,
            (_, Value::Null) => DiffStatus::Removed,
            _ => DiffStatus::Changed,
        };
        self.0.push(FieldChange {
            field: field.to_string(),
            status,
            from,
            to,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&FieldChange> {
        self.0.iter().find(|c| c.field == field)
    }

    /// Field names, in comparison order.
    pub fn fields(&self) -> Vec<&str> {
        self.0.iter().map(|c| c.field.as_str()).collect()
    }
}
