//! Path change types between two trees.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a path changed in a commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Path was added.
    Add,
    /// Path content or mode changed.
    Modify,
    /// Path was removed.
    Delete,
    /// Path was renamed.
    Rename,
    /// Path was copied.
    Copy,
}

impl ChangeType {
    /// Returns the short lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeType::Add => "add",
            ChangeType::Modify => "modify",
            ChangeType::Delete => "delete",
            ChangeType::Rename => "rename",
            ChangeType::Copy => "copy",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
