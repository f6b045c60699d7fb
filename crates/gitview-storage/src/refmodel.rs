//! Ref listings with display metadata.

use crate::history::peel;
use crate::{
    short_ref_name, Commit, ObjectId, ObjectType, Repository, Result, StorageError, Tag, R_HEADS,
    R_REMOTES, R_TAGS,
};
use std::collections::HashMap;

/// Suffix identifying the branch that stores tickets.
const TICKET_BRANCH_SUFFIX: &str = "ticgit";

/// A branch, tag or remote-tracking branch ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefModel {
    /// Short name, e.g. `main` or `origin/main`.
    pub name: String,
    /// Full ref name, e.g. `refs/heads/main`.
    pub ref_name: String,
    /// Object the ref points at (a tag object for annotated tags).
    pub object_id: ObjectId,
    /// Commit reached after peeling tags.
    pub commit_id: ObjectId,
    /// True for annotated tags.
    pub is_annotated: bool,
    /// Tag message, or the short message of the commit.
    pub message: String,
    /// Tagger or committer time (unix seconds).
    pub when: i64,
}

impl RefModel {
    /// Returns true if this is a tag.
    pub fn is_tag(&self) -> bool {
        self.ref_name.starts_with(R_TAGS)
    }

    /// Returns true if this is a remote-tracking branch.
    pub fn is_remote(&self) -> bool {
        self.ref_name.starts_with(R_REMOTES)
    }
}

fn load_ref(repo: &Repository, ref_name: &str, object_id: ObjectId) -> Result<Option<RefModel>> {
    let object = match repo.objects.get(&object_id) {
        Ok(object) => object,
        Err(StorageError::ObjectNotFound(_)) => {
            tracing::debug!(repository = %repo.name, reference = %ref_name, "Dangling ref");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let (is_annotated, tag) = match object.object_type {
        ObjectType::Tag => (true, Some(Tag::parse(&object)?)),
        _ => (false, None),
    };
    let commit_id = match peel(repo, object_id) {
        Ok(id) => id,
        Err(StorageError::ObjectNotFound(_)) => return Ok(None),
        Err(e) => return Err(e),
    };
    let commit = match repo.objects.get(&commit_id) {
        Ok(object) if object.object_type == ObjectType::Commit => Some(Commit::parse(&object)?),
        _ => None,
    };

    let (message, when) = match (&tag, &commit) {
        (Some(tag), commit) => (
            tag.message.trim().to_string(),
            tag.tagger
                .as_ref()
                .map(|t| t.when)
                .or_else(|| commit.as_ref().map(Commit::commit_time))
                .unwrap_or_default(),
        ),
        (None, Some(commit)) => (commit.short_message().to_string(), commit.commit_time()),
        (None, None) => (String::new(), 0),
    };

    Ok(Some(RefModel {
        name: short_ref_name(ref_name).to_string(),
        ref_name: ref_name.to_string(),
        object_id,
        commit_id,
        is_annotated,
        message,
        when,
    }))
}

fn list_refs(repo: &Repository, prefix: &str) -> Result<Vec<RefModel>> {
    let mut models = Vec::new();
    for (name, _) in repo.refs.list(prefix) {
        let target = match repo.refs.resolve(&name) {
            Ok(id) => id,
            Err(StorageError::RefNotFound(_)) => continue,
            Err(e) => return Err(e),
        };
        if let Some(model) = load_ref(repo, &name, target)? {
            models.push(model);
        }
    }
    Ok(models)
}

fn newest_first(mut refs: Vec<RefModel>, limit: Option<usize>) -> Vec<RefModel> {
    refs.sort_by(|a, b| b.when.cmp(&a.when).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        refs.truncate(limit);
    }
    refs
}

/// Maps each commit id to the refs pointing at it, sorted by name.
pub fn get_all_refs(repo: &Repository) -> Result<HashMap<ObjectId, Vec<RefModel>>> {
    let mut map: HashMap<ObjectId, Vec<RefModel>> = HashMap::new();
    for prefix in [R_HEADS, R_TAGS, R_REMOTES] {
        for model in list_refs(repo, prefix)? {
            map.entry(model.commit_id).or_default().push(model);
        }
    }
    for refs in map.values_mut() {
        refs.sort_by(|a, b| a.name.cmp(&b.name));
    }
    Ok(map)
}

/// Local branches, most recently updated first.
pub fn get_local_branches(repo: &Repository, limit: Option<usize>) -> Result<Vec<RefModel>> {
    Ok(newest_first(list_refs(repo, R_HEADS)?, limit))
}

/// Remote-tracking branches, most recently updated first.
pub fn get_remote_branches(repo: &Repository, limit: Option<usize>) -> Result<Vec<RefModel>> {
    Ok(newest_first(list_refs(repo, R_REMOTES)?, limit))
}

/// Tags, newest first.
pub fn get_tags(repo: &Repository, limit: Option<usize>) -> Result<Vec<RefModel>> {
    Ok(newest_first(list_refs(repo, R_TAGS)?, limit))
}

/// Finds the ticket branch: a local branch ending in `ticgit`, or
/// failing that a remote-tracking one.
pub fn get_ticket_branch(repo: &Repository) -> Result<Option<RefModel>> {
    let is_ticket = |model: &RefModel| model.name.ends_with(TICKET_BRANCH_SUFFIX);
    if let Some(local) = list_refs(repo, R_HEADS)?.into_iter().find(is_ticket) {
        return Ok(Some(local));
    }
    Ok(list_refs(repo, R_REMOTES)?.into_iter().find(is_ticket))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GitObject, Tree};

    fn commit_at(repo: &Repository, parent: Option<ObjectId>, when: i64, msg: &str) -> ObjectId {
        let tree = repo.objects.put(Tree::encode(Vec::new()));
        let ident = format!("Dev <dev@example.com> {} +0000", when);
        let parents: Vec<ObjectId> = parent.into_iter().collect();
        repo.objects
            .put(GitObject::commit(&tree, &parents, &ident, &ident, msg))
    }

    fn sample_repo() -> (Repository, ObjectId, ObjectId) {
        let repo = Repository::new("refs.git");
        let old = commit_at(&repo, None, 100, "Old work\n\nbody");
        let new = commit_at(&repo, Some(old), 200, "New work");
        repo.refs.set("refs/heads/main", new);
        repo.refs.set("refs/heads/legacy", old);
        repo.refs.set("refs/remotes/origin/main", new);
        repo.refs.set("refs/tags/light", old);
        let annotated = repo.objects.put(GitObject::tag(
            &new,
            ObjectType::Commit,
            "v1.0",
            "Rel <rel@example.com> 300 +0000",
            "Release 1.0\n",
        ));
        repo.refs.set("refs/tags/v1.0", annotated);
        (repo, old, new)
    }

    #[test]
    fn test_local_branches_newest_first() {
        let (repo, old, new) = sample_repo();
        let branches = get_local_branches(&repo, None).unwrap();
        let names: Vec<&str> = branches.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["main", "legacy"]);
        assert_eq!(branches[0].commit_id, new);
        assert_eq!(branches[1].commit_id, old);
        assert_eq!(branches[1].message, "Old work");

        assert_eq!(get_local_branches(&repo, Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_tags_are_peeled() {
        let (repo, old, new) = sample_repo();
        let tags = get_tags(&repo, None).unwrap();
        assert_eq!(tags.len(), 2);

        let v1 = &tags[0];
        assert_eq!(v1.name, "v1.0");
        assert!(v1.is_annotated);
        assert!(v1.is_tag());
        assert_eq!(v1.commit_id, new);
        assert_ne!(v1.object_id, new);
        assert_eq!(v1.message, "Release 1.0");
        assert_eq!(v1.when, 300);

        assert_eq!(tags[1].name, "light");
        assert!(!tags[1].is_annotated);
        assert_eq!(tags[1].commit_id, old);
    }

    #[test]
    fn test_all_refs_grouped_by_commit() {
        let (repo, old, new) = sample_repo();
        let refs = get_all_refs(&repo).unwrap();

        let at_new: Vec<&str> = refs[&new].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(at_new, vec!["main", "origin/main", "v1.0"]);
        let at_old: Vec<&str> = refs[&old].iter().map(|r| r.name.as_str()).collect();
        assert_eq!(at_old, vec!["legacy", "light"]);
    }

    #[test]
    fn test_dangling_refs_are_skipped() {
        let (repo, _, _) = sample_repo();
        repo.refs
            .set("refs/heads/broken", ObjectId::from_bytes([7u8; 20]));
        let names: Vec<String> = get_local_branches(&repo, None)
            .unwrap()
            .into_iter()
            .map(|b| b.name)
            .collect();
        assert!(!names.contains(&"broken".to_string()));
    }

    #[test]
    fn test_ticket_branch_prefers_local() {
        let (repo, old, new) = sample_repo();
        assert!(get_ticket_branch(&repo).unwrap().is_none());

        repo.refs.set("refs/remotes/origin/ticgit", old);
        let remote = get_ticket_branch(&repo).unwrap().unwrap();
        assert!(remote.is_remote());
        assert_eq!(remote.name, "origin/ticgit");

        repo.refs.set("refs/heads/ticgit", new);
        let local = get_ticket_branch(&repo).unwrap().unwrap();
        assert_eq!(local.ref_name, "refs/heads/ticgit");
    }
}
