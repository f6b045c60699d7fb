//! Imports bare repositories from disk.

use crate::{ObjectId, ObjectStore, PackReader, Repository, Result, StorageError, HEAD};
use gitview_utils::get_relative_path;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const SYMREF_PREFIX: &str = "ref: ";

/// Returns true if `path` looks like a bare repository.
pub(crate) fn is_bare_repository(path: &Path) -> bool {
    path.join(HEAD).is_file() && path.join("objects").is_dir()
}

/// Finds every bare repository below `base_dir`.
///
/// Returns `(name, path)` pairs sorted by name, where names are paths
/// relative to `base_dir` with `/` separators, e.g. `team/project.git`.
/// Repositories are not searched for nested repositories.
pub fn discover_repositories(base_dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    if !base_dir.is_dir() {
        return Err(StorageError::NotFound(format!(
            "repositories folder {}",
            base_dir.display()
        )));
    }

    let base = base_dir.to_string_lossy().to_string();
    let mut found = Vec::new();
    let mut walker = WalkDir::new(base_dir).min_depth(1).sort_by_file_name().into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable path");
                continue;
            }
        };
        if !entry.file_type().is_dir() || !is_bare_repository(entry.path()) {
            continue;
        }
        walker.skip_current_dir();

        let name = get_relative_path(&base, &entry.path().to_string_lossy());
        found.push((name, entry.path().to_path_buf()));
    }

    found.sort();
    Ok(found)
}

/// The files a push always rewrites: HEAD, packed-refs, loose refs and
/// the pack file names. Two equal snapshots mean the loaded objects and
/// refs are still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RefsSnapshot(Vec<(String, String)>);

impl RefsSnapshot {
    /// Reads the snapshot of the repository at `path`.
    pub(crate) fn read(path: &Path) -> Result<Self> {
        let mut entries = vec![(HEAD.to_string(), fs::read_to_string(path.join(HEAD))?)];

        let packed = path.join("packed-refs");
        if packed.is_file() {
            entries.push(("packed-refs".to_string(), fs::read_to_string(packed)?));
        }

        let refs_dir = path.join("refs");
        if refs_dir.is_dir() {
            let base = path.to_string_lossy().to_string();
            for entry in WalkDir::new(&refs_dir).sort_by_file_name() {
                let entry = entry.map_err(|e| StorageError::Io(e.into()))?;
                if entry.file_type().is_file() {
                    let name = get_relative_path(&base, &entry.path().to_string_lossy());
                    entries.push((name, fs::read_to_string(entry.path())?));
                }
            }
        }

        let pack_dir = path.join("objects").join("pack");
        if pack_dir.is_dir() {
            let mut packs: Vec<String> = fs::read_dir(&pack_dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.file_name().to_string_lossy().to_string())
                .filter(|name| name.ends_with(".pack"))
                .collect();
            packs.sort();
            entries.extend(packs.into_iter().map(|name| (name, String::new())));
        }

        Ok(Self(entries))
    }
}

/// Loads one bare repository: objects, refs and HEAD.
pub fn load_repository(path: &Path, name: &str) -> Result<Repository> {
    let repo = Repository::new(name);
    load_objects(&path.join("objects"), &repo.objects)?;

    // loose refs override packed ones
    load_packed_refs(&path.join("packed-refs"), &repo)?;
    load_loose_refs(path, &repo)?;
    load_head(&path.join(HEAD), &repo)?;

    Ok(repo)
}

fn load_objects(objects_dir: &Path, store: &ObjectStore) -> Result<()> {
    let pack_dir = objects_dir.join("pack");
    if pack_dir.is_dir() {
        let mut packs: Vec<_> = fs::read_dir(&pack_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "pack"))
            .collect();
        packs.sort();
        for pack in packs {
            let data = fs::read(&pack)?;
            let ids = PackReader::new(&data).read_into(store)?;
            tracing::debug!(pack = %pack.display(), objects = ids.len(), "Read pack");
        }
    }

    for fanout in fs::read_dir(objects_dir)? {
        let fanout = fanout?;
        let prefix = fanout.file_name().to_string_lossy().to_string();
        if prefix.len() != 2 || !fanout.file_type()?.is_dir() {
            continue;
        }
        for file in fs::read_dir(fanout.path())? {
            let file = file?;
            let rest = file.file_name().to_string_lossy().to_string();
            let Ok(expected) = ObjectId::from_hex(&format!("{}{}", prefix, rest)) else {
                continue;
            };
            let object = ObjectStore::decompress(&fs::read(file.path())?)?;
            if object.id != expected {
                return Err(StorageError::InvalidObject(format!(
                    "loose object {} hashes to {}",
                    expected, object.id
                )));
            }
            store.put(object);
        }
    }
    Ok(())
}

fn load_packed_refs(path: &Path, repo: &Repository) -> Result<()> {
    if !path.is_file() {
        return Ok(());
    }
    for line in fs::read_to_string(path)?.lines() {
        // comments and peeled-tag lines
        if line.starts_with('#') || line.starts_with('^') || line.trim().is_empty() {
            continue;
        }
        let (hex, name) = line
            .split_once(' ')
            .ok_or_else(|| StorageError::InvalidRef(format!("packed-refs line: {}", line)))?;
        repo.refs.set(name.trim(), ObjectId::from_hex(hex)?);
    }
    Ok(())
}

fn load_loose_refs(repo_dir: &Path, repo: &Repository) -> Result<()> {
    let refs_dir = repo_dir.join("refs");
    if !refs_dir.is_dir() {
        return Ok(());
    }
    let base = repo_dir.to_string_lossy().to_string();
    for entry in WalkDir::new(&refs_dir) {
        let entry = entry.map_err(|e| StorageError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = get_relative_path(&base, &entry.path().to_string_lossy());
        let content = fs::read_to_string(entry.path())?;
        set_ref(repo, &name, content.trim())?;
    }
    Ok(())
}

fn load_head(path: &Path, repo: &Repository) -> Result<()> {
    let content = fs::read_to_string(path)?;
    set_ref(repo, HEAD, content.trim())
}

fn set_ref(repo: &Repository, name: &str, value: &str) -> Result<()> {
    match value.strip_prefix(SYMREF_PREFIX) {
        Some(target) => repo.refs.set_symbolic(name, target.trim()),
        None => repo.refs.set(name, ObjectId::from_hex(value)?),
    }
    Ok(())
}
