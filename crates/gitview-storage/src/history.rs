//! Revision resolution and commit history walks.

use crate::{
    Commit, ObjectId, ObjectType, Repository, Result, StorageError, Tag, HEAD, R_HEADS, R_REMOTES,
    R_TAGS,
};
use gitview_types::SearchType;
use std::collections::{BinaryHeap, HashSet};

/// Shortest abbreviated object id accepted as a revision.
const MIN_ABBREV_LEN: usize = 4;

/// Annotated tags pointing at tags deeper than this are not peeled.
const MAX_PEEL_DEPTH: usize = 10;

/// Resolves a revision string to an object id.
///
/// Accepts, in order: nothing or `HEAD`, a full ref name, a branch,
/// tag or remote name, a full object id, or an unambiguous id prefix.
/// Returns `Ok(None)` when nothing matches.
pub fn resolve_revision(repo: &Repository, revision: Option<&str>) -> Result<Option<ObjectId>> {
    let revision = revision.map(str::trim).unwrap_or_default();
    if revision.is_empty() || revision == HEAD {
        return match repo.head() {
            Ok(id) => Ok(Some(id)),
            Err(StorageError::RefNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        };
    }

    for candidate in [
        revision.to_string(),
        format!("{}{}", R_HEADS, revision),
        format!("{}{}", R_TAGS, revision),
        format!("{}{}", R_REMOTES, revision),
    ] {
        if repo.refs.contains(&candidate) {
            return match repo.refs.resolve(&candidate) {
                Ok(id) => Ok(Some(id)),
                Err(StorageError::RefNotFound(_)) => Ok(None),
                Err(e) => Err(e),
            };
        }
    }

    if !revision.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Ok(None);
    }
    if revision.len() == ObjectId::HEX_LEN {
        let id = ObjectId::from_hex(revision)?;
        return Ok(repo.objects.contains(&id).then_some(id));
    }
    if revision.len() >= MIN_ABBREV_LEN && revision.len() < ObjectId::HEX_LEN {
        return Ok(repo.objects.find_unique_prefix(revision));
    }
    Ok(None)
}

/// Follows annotated tags until a non-tag object is reached.
pub(crate) fn peel(repo: &Repository, id: ObjectId) -> Result<ObjectId> {
    let mut current = id;
    for _ in 0..MAX_PEEL_DEPTH {
        let object = repo.objects.get(&current)?;
        if object.object_type != ObjectType::Tag {
            return Ok(current);
        }
        current = Tag::parse(&object)?.object;
    }
    Err(StorageError::InvalidObject(format!(
        "tag chain starting at {} is too deep",
        id
    )))
}

/// Looks up a commit by revision; `None` resolves HEAD.
///
/// Returns `Ok(None)` when the revision is unknown or does not name a commit.
pub fn get_commit(repo: &Repository, revision: Option<&str>) -> Result<Option<Commit>> {
    let Some(id) = resolve_revision(repo, revision)? else {
        return Ok(None);
    };
    let id = match peel(repo, id) {
        Ok(id) => id,
        Err(StorageError::ObjectNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let object = match repo.objects.get(&id) {
        Ok(object) => object,
        Err(StorageError::ObjectNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    if object.object_type != ObjectType::Commit {
        return Ok(None);
    }
    Commit::parse(&object).map(Some)
}

/// Walks history from `start`, newest commit first.
///
/// Skips `offset` commits and returns at most `limit`.
pub fn get_revlog(
    repo: &Repository,
    start: Option<&str>,
    offset: usize,
    limit: usize,
) -> Result<Vec<Commit>> {
    let Some(head) = get_commit(repo, start)? else {
        return Ok(Vec::new());
    };
    RevWalk::new(repo, head)
        .skip(offset)
        .take(limit)
        .collect()
}

/// Searches history from `start` for commits matching `term`.
///
/// Matching is a case-insensitive substring test against the message
/// (`Commit`), or the name and email of the author or committer.
pub fn search_revlogs(
    repo: &Repository,
    start: Option<&str>,
    term: &str,
    search_type: SearchType,
    offset: usize,
    limit: usize,
) -> Result<Vec<Commit>> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return Ok(Vec::new());
    }
    let Some(head) = get_commit(repo, start)? else {
        return Ok(Vec::new());
    };

    let mut results = Vec::new();
    let mut skipped = 0;
    for commit in RevWalk::new(repo, head) {
        let commit = commit?;
        if !matches_search(&commit, &term, search_type) {
            continue;
        }
        if skipped < offset {
            skipped += 1;
            continue;
        }
        results.push(commit);
        if results.len() >= limit {
            break;
        }
    }

    tracing::debug!(
        repository = %repo.name,
        term = %term,
        search_type = %search_type,
        hits = results.len(),
        "Searched revlog"
    );
    Ok(results)
}

fn matches_search(commit: &Commit, term: &str, search_type: SearchType) -> bool {
    match search_type {
        SearchType::Commit => commit.message.to_lowercase().contains(term),
        SearchType::Author => {
            commit.author.name.to_lowercase().contains(term)
                || commit.author.email.to_lowercase().contains(term)
        }
        SearchType::Committer => {
            commit.committer.name.to_lowercase().contains(term)
                || commit.committer.email.to_lowercase().contains(term)
        }
    }
}

/// Commit-time ordered traversal of all ancestors of a commit.
struct RevWalk<'a> {
    repo: &'a Repository,
    queue: BinaryHeap<(i64, ObjectId)>,
    pending: Vec<Commit>,
    seen: HashSet<ObjectId>,
}

impl<'a> RevWalk<'a> {
    fn new(repo: &'a Repository, start: Commit) -> Self {
        let mut seen = HashSet::new();
        seen.insert(start.id);
        Self {
            repo,
            queue: BinaryHeap::from([(start.commit_time(), start.id)]),
            pending: vec![start],
            seen,
        }
    }

    fn load(&self, id: &ObjectId) -> Result<Option<Commit>> {
        match self.repo.objects.get(id) {
            Ok(object) => Commit::parse(&object).map(Some),
            Err(StorageError::ObjectNotFound(_)) => {
                // shallow or partially loaded history
                tracing::debug!(repository = %self.repo.name, commit = %id, "Missing parent");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl Iterator for RevWalk<'_> {
    type Item = Result<Commit>;

    fn next(&mut self) -> Option<Self::Item> {
        let (_, id) = self.queue.pop()?;
        let commit = match self.pending.iter().position(|c| c.id == id) {
            Some(idx) => self.pending.swap_remove(idx),
            None => return Some(Err(StorageError::ObjectNotFound(id.to_hex()))),
        };

        for parent in &commit.parents {
            if !self.seen.insert(*parent) {
                continue;
            }
            match self.load(parent) {
                Ok(Some(parent_commit)) => {
                    self.queue.push((parent_commit.commit_time(), parent_commit.id));
                    self.pending.push(parent_commit);
                }
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }

        Some(Ok(commit))
    }
}
