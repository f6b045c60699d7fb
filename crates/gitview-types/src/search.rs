//! Commit search types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The field a commit search is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// Author name or email.
    Author,
    /// Committer name or email.
    Committer,
    /// Commit message.
    #[default]
    Commit,
}

impl SearchType {
    /// All search types, in the order the search form offers them.
    pub const ALL: [SearchType; 3] = [SearchType::Author, SearchType::Committer, SearchType::Commit];

    /// Returns the lowercase name used in URLs and query prefixes.
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Author => "author",
            SearchType::Committer => "committer",
            SearchType::Commit => "commit",
        }
    }

    /// Parses a search type name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "author" => Some(SearchType::Author),
            "committer" => Some(SearchType::Committer),
            "commit" => Some(SearchType::Commit),
            _ => None,
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
