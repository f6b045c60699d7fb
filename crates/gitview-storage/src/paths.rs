//! Tree listings, blob lookup and tree diffs.

use crate::{Commit, FileMode, ObjectId, ObjectType, Repository, Result, StorageError, Tree};
use bytes::Bytes;
use gitview_types::ChangeType;
use std::collections::BTreeMap;

/// An entry of a tree listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathModel {
    /// Entry name.
    pub name: String,
    /// Path from the repository root.
    pub path: String,
    /// Entry mode.
    pub mode: FileMode,
    /// Object id.
    pub id: ObjectId,
    /// Blob size in bytes, zero for trees and submodules.
    pub size: usize,
    /// Commit the listing was taken from.
    pub commit_id: ObjectId,
}

impl PathModel {
    /// Returns true for directories.
    pub fn is_tree(&self) -> bool {
        self.mode == FileMode::Tree
    }

    /// Returns true for submodule links.
    pub fn is_submodule(&self) -> bool {
        self.mode == FileMode::Gitlink
    }
}

/// A path touched by a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathChangeModel {
    /// Path from the repository root.
    pub path: String,
    /// Mode after the change (before it, for deletions).
    pub mode: FileMode,
    /// Blob id after the change (before it, for deletions).
    pub id: ObjectId,
    /// Kind of change.
    pub change_type: ChangeType,
}

impl PathChangeModel {
    /// Returns the last path component.
    pub fn name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }
}

fn load_tree(repo: &Repository, id: &ObjectId) -> Result<Tree> {
    Tree::parse(&repo.objects.get(id)?)
}

/// Walks from `root` down to the tree at `path`, if it exists.
fn tree_at(repo: &Repository, root: &ObjectId, path: &str) -> Result<Option<Tree>> {
    let mut tree = load_tree(repo, root)?;
    for component in path.split('/').filter(|c| !c.is_empty()) {
        let next = match tree.find(component) {
            Some(entry) if entry.is_tree() => entry.id,
            _ => return Ok(None),
        };
        tree = load_tree(repo, &next)?;
    }
    Ok(Some(tree))
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Lists the entries of the directory `path` at `commit`, directories first.
///
/// An unknown path or a path naming a file yields an empty listing.
pub fn get_files_in_path(
    repo: &Repository,
    path: Option<&str>,
    commit: &Commit,
) -> Result<Vec<PathModel>> {
    let path = path.unwrap_or_default().trim_matches('/');
    let Some(tree) = tree_at(repo, &commit.tree, path)? else {
        return Ok(Vec::new());
    };

    let mut models = Vec::with_capacity(tree.entries.len());
    for entry in tree.entries {
        let size = match entry.mode {
            FileMode::Tree | FileMode::Gitlink => 0,
            _ => repo.objects.get(&entry.id).map(|o| o.size()).unwrap_or(0),
        };
        models.push(PathModel {
            path: join(path, &entry.name),
            name: entry.name,
            mode: entry.mode,
            id: entry.id,
            size,
            commit_id: commit.id,
        });
    }
    models.sort_by(|a, b| {
        b.is_tree()
            .cmp(&a.is_tree())
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
    Ok(models)
}

/// Returns the content of the file at `path` in `commit`.
pub fn get_blob(repo: &Repository, commit: &Commit, path: &str) -> Result<Option<Bytes>> {
    let path = path.trim_matches('/');
    let (dir, name) = match path.rsplit_once('/') {
        Some((dir, name)) => (dir, name),
        None => ("", path),
    };
    if name.is_empty() {
        return Ok(None);
    }
    let Some(tree) = tree_at(repo, &commit.tree, dir)? else {
        return Ok(None);
    };
    let Some(entry) = tree.find(name) else {
        return Ok(None);
    };
    let object = repo.objects.get(&entry.id)?;
    if object.object_type != ObjectType::Blob {
        return Ok(None);
    }
    Ok(Some(object.data))
}

/// Collects every file path below `tree_id` with its mode and id.
fn flatten(
    repo: &Repository,
    tree_id: &ObjectId,
    prefix: &str,
    out: &mut BTreeMap<String, (FileMode, ObjectId)>,
) -> Result<()> {
    for entry in load_tree(repo, tree_id)?.entries {
        let path = join(prefix, &entry.name);
        if entry.is_tree() {
            flatten(repo, &entry.id, &path, out)?;
        } else {
            out.insert(path, (entry.mode, entry.id));
        }
    }
    Ok(())
}

/// Lists files whose extension matches one of `extensions`
/// (case-insensitive, without the dot), sorted by path.
pub fn get_documents(
    repo: &Repository,
    commit: &Commit,
    extensions: &[&str],
) -> Result<Vec<PathModel>> {
    let mut files = BTreeMap::new();
    flatten(repo, &commit.tree, "", &mut files)?;

    let mut documents = Vec::new();
    for (path, (mode, id)) in files {
        let Some((_, ext)) = path.rsplit_once('.') else {
            continue;
        };
        if !extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)) {
            continue;
        }
        let size = repo.objects.get(&id).map(|o| o.size()).unwrap_or(0);
        documents.push(PathModel {
            name: path.rsplit('/').next().unwrap_or(&path).to_string(),
            path,
            mode,
            id,
            size,
            commit_id: commit.id,
        });
    }
    Ok(documents)
}

/// Lists the files changed by `commit` relative to its first parent.
///
/// Root commits report every file as added. Renames and copies are not
/// detected; they show up as a deletion plus an addition.
pub fn get_changed_paths(repo: &Repository, commit: &Commit) -> Result<Vec<PathChangeModel>> {
    let mut after = BTreeMap::new();
    flatten(repo, &commit.tree, "", &mut after)?;

    let mut before = BTreeMap::new();
    if let Some(parent) = commit.first_parent() {
        match repo.objects.get(&parent) {
            Ok(object) => {
                let parent = Commit::parse(&object)?;
                flatten(repo, &parent.tree, "", &mut before)?;
            }
            Err(StorageError::ObjectNotFound(_)) => {
                tracing::debug!(repository = %repo.name, commit = %commit.id, "Parent not loaded");
            }
            Err(e) => return Err(e),
        }
    }

    let mut changes = Vec::new();
    for (path, &(mode, id)) in &after {
        let change_type = match before.get(path) {
            None => ChangeType::Add,
            Some(&(old_mode, old_id)) if old_id != id || old_mode != mode => ChangeType::Modify,
            Some(_) => continue,
        };
        changes.push(PathChangeModel {
            path: path.clone(),
            mode,
            id,
            change_type,
        });
    }
    for (path, &(mode, id)) in &before {
        if !after.contains_key(path) {
            changes.push(PathChangeModel {
                path: path.clone(),
                mode,
                id,
                change_type: ChangeType::Delete,
            });
        }
    }
    changes.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(changes)
}
