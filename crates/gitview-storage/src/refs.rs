//! Git reference management.

use crate::{ObjectId, Result, StorageError};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// The symbolic name of the checked-out revision.
pub const HEAD: &str = "HEAD";
/// Prefix of local branches.
pub const R_HEADS: &str = "refs/heads/";
/// Prefix of tags.
pub const R_TAGS: &str = "refs/tags/";
/// Prefix of remote-tracking branches.
pub const R_REMOTES: &str = "refs/remotes/";

/// Symbolic refs deeper than this are treated as cycles.
const MAX_SYMREF_DEPTH: usize = 5;

/// A git reference (branch, tag, or symbolic ref).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Direct reference to an object.
    Direct(ObjectId),
    /// Symbolic reference (e.g., HEAD -> refs/heads/main).
    Symbolic(String),
}

impl Reference {
    /// Returns the object ID if this is a direct reference.
    pub fn as_direct(&self) -> Option<ObjectId> {
        match self {
            Self::Direct(id) => Some(*id),
            Self::Symbolic(_) => None,
        }
    }
}

/// Strips the `refs/heads/`, `refs/tags/` or `refs/remotes/` prefix.
pub fn short_ref_name(name: &str) -> &str {
    [R_HEADS, R_TAGS, R_REMOTES]
        .iter()
        .find_map(|prefix| name.strip_prefix(prefix))
        .unwrap_or(name)
}

/// Thread-safe reference store, ordered by ref name.
#[derive(Debug, Default)]
pub struct RefStore {
    refs: RwLock<BTreeMap<String, Reference>>,
}

impl RefStore {
    /// Creates a new empty reference store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a reference by name.
    pub fn get(&self, name: &str) -> Result<Reference> {
        self.refs
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StorageError::RefNotFound(name.to_string()))
    }

    /// Returns true if a reference with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.refs.read().contains_key(name)
    }

    /// Sets a reference to point to an object.
    pub fn set(&self, name: &str, target: ObjectId) {
        self.refs
            .write()
            .insert(name.to_string(), Reference::Direct(target));
    }

    /// Sets a symbolic reference.
    pub fn set_symbolic(&self, name: &str, target: &str) {
        self.refs
            .write()
            .insert(name.to_string(), Reference::Symbolic(target.to_string()));
    }

    /// Deletes a reference.
    pub fn delete(&self, name: &str) -> Result<()> {
        self.refs
            .write()
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| StorageError::RefNotFound(name.to_string()))
    }

    /// Lists all references with a given prefix, sorted by name.
    pub fn list(&self, prefix: &str) -> Vec<(String, Reference)> {
        self.refs
            .read()
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, refr)| (name.clone(), refr.clone()))
            .collect()
    }

    /// Resolves a reference through symbolic links to an object ID.
    pub fn resolve(&self, name: &str) -> Result<ObjectId> {
        let mut current = name.to_string();
        for _ in 0..MAX_SYMREF_DEPTH {
            match self.get(&current)? {
                Reference::Direct(id) => return Ok(id),
                Reference::Symbolic(target) => current = target,
            }
        }
        Err(StorageError::InvalidRef(format!(
            "symbolic ref '{}' nested too deeply",
            name
        )))
    }

    /// Resolves HEAD to the current commit.
    pub fn resolve_head(&self) -> Result<ObjectId> {
        self.resolve(HEAD)
    }

    /// Gets the current branch name (if HEAD is symbolic).
    pub fn current_branch(&self) -> Option<String> {
        match self.get(HEAD).ok()? {
            Reference::Symbolic(target) => target.strip_prefix(R_HEADS).map(|s| s.to_string()),
            Reference::Direct(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_bytes([byte; 20])
    }

    #[test]
    fn test_resolve_head_through_branch() {
        let store = RefStore::new();
        store.set("refs/heads/main", id(1));
        store.set_symbolic(HEAD, "refs/heads/main");

        assert_eq!(store.resolve_head().unwrap(), id(1));
        assert_eq!(store.current_branch(), Some("main".to_string()));
    }

    #[test]
    fn test_resolve_detached_head() {
        let store = RefStore::new();
        store.set(HEAD, id(2));
        assert_eq!(store.resolve_head().unwrap(), id(2));
        assert!(store.current_branch().is_none());
    }

    #[test]
    fn test_resolve_unborn_branch() {
        let store = RefStore::new();
        store.set_symbolic(HEAD, "refs/heads/main");
        assert!(matches!(store.resolve_head(), Err(StorageError::RefNotFound(_))));
    }

    #[test]
    fn test_resolve_symbolic_cycle() {
        let store = RefStore::new();
        store.set_symbolic("refs/heads/a", "refs/heads/b");
        store.set_symbolic("refs/heads/b", "refs/heads/a");
        assert!(matches!(store.resolve("refs/heads/a"), Err(StorageError::InvalidRef(_))));
    }

    #[test]
    fn test_list_is_sorted_and_filtered() {
        let store = RefStore::new();
        store.set("refs/tags/v1.0", id(1));
        store.set("refs/heads/zeta", id(1));
        store.set("refs/heads/alpha", id(1));

        let heads: Vec<String> = store.list(R_HEADS).into_iter().map(|(n, _)| n).collect();
        assert_eq!(heads, vec!["refs/heads/alpha", "refs/heads/zeta"]);
        assert_eq!(store.list(R_TAGS).len(), 1);
        assert!(store.list(R_REMOTES).is_empty());
    }

    #[test]
    fn test_delete() {
        let store = RefStore::new();
        store.set("refs/heads/feature", id(1));
        store.delete("refs/heads/feature").unwrap();
        assert!(!store.contains("refs/heads/feature"));
        assert!(store.delete("refs/heads/feature").is_err());
    }

    #[test]
    fn test_short_ref_name() {
        assert_eq!(short_ref_name("refs/heads/main"), "main");
        assert_eq!(short_ref_name("refs/tags/v1"), "v1");
        assert_eq!(short_ref_name("refs/remotes/origin/ticgit"), "origin/ticgit");
        assert_eq!(short_ref_name("HEAD"), "HEAD");
    }
}
