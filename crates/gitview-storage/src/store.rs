//! Object store and repository management.

use crate::{GitObject, ObjectId, ObjectType, RefStore, Result, StorageError, HEAD};
use crate::loader::{discover_repositories, is_bare_repository, load_repository, RefsSnapshot};
use bytes::Bytes;
use flate2::read::ZlibDecoder;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Content-addressed object store.
#[derive(Debug, Default)]
pub struct ObjectStore {
    /// Objects indexed by their SHA-1 hash.
    objects: RwLock<HashMap<ObjectId, GitObject>>,
}

impl ObjectStore {
    /// Creates a new empty object store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores an object and returns its ID.
    pub fn put(&self, object: GitObject) -> ObjectId {
        let id = object.id;
        self.objects.write().insert(id, object);
        id
    }

    /// Retrieves an object by ID.
    pub fn get(&self, id: &ObjectId) -> Result<GitObject> {
        self.objects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(id.to_hex()))
    }

    /// Checks if an object exists.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.objects.read().contains_key(id)
    }

    /// Returns the number of objects in the store.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }

    /// Returns the single object whose hex id starts with `prefix`.
    ///
    /// Ambiguous and unknown prefixes both yield `None`.
    pub fn find_unique_prefix(&self, prefix: &str) -> Option<ObjectId> {
        let objects = self.objects.read();
        let mut matches = objects.keys().filter(|id| id.starts_with_hex(prefix));
        let first = *matches.next()?;
        match matches.next() {
            Some(_) => None,
            None => Some(first),
        }
    }

    /// Stores a blob and returns its ID.
    pub fn put_blob(&self, content: impl Into<Bytes>) -> ObjectId {
        self.put(GitObject::blob(content))
    }

    /// Decompresses a loose object.
    pub fn decompress(compressed: &[u8]) -> Result<GitObject> {
        let mut decoder = ZlibDecoder::new(compressed);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| StorageError::Compression(e.to_string()))?;

        // Parse header: "type size\0data"
        let null_pos = decompressed.iter().position(|&b| b == 0).ok_or_else(|| {
            StorageError::InvalidObject("missing null byte in header".to_string())
        })?;

        let header = String::from_utf8_lossy(&decompressed[..null_pos]);
        let (kind, size) = header.split_once(' ').ok_or_else(|| {
            StorageError::InvalidObject(format!("invalid header: {}", header))
        })?;

        let object_type = ObjectType::parse(kind)?;
        let size: usize = size
            .parse()
            .map_err(|_| StorageError::InvalidObject("invalid size".to_string()))?;

        let data = &decompressed[null_pos + 1..];
        if data.len() != size {
            return Err(StorageError::InvalidObject(format!(
                "size mismatch: header says {}, found {}",
                size,
                data.len()
            )));
        }

        Ok(GitObject::new(object_type, Bytes::copy_from_slice(data)))
    }
}

/// A git repository with objects and references.
#[derive(Debug)]
pub struct Repository {
    /// Repository name, e.g. `team/project.git`.
    pub name: String,
    /// Object store.
    pub objects: Arc<ObjectStore>,
    /// Reference store.
    pub refs: Arc<RefStore>,
}

impl Repository {
    /// Creates a new empty repository whose HEAD points at `main`.
    pub fn new(name: impl Into<String>) -> Self {
        let refs = Arc::new(RefStore::new());
        refs.set_symbolic(HEAD, "refs/heads/main");

        Self {
            name: name.into(),
            objects: Arc::new(ObjectStore::new()),
            refs,
        }
    }

    /// Gets the current HEAD commit.
    pub fn head(&self) -> Result<ObjectId> {
        self.refs.resolve_head()
    }

    /// Gets the current branch name.
    pub fn current_branch(&self) -> Option<String> {
        self.refs.current_branch()
    }
}

#[derive(Debug)]
struct StoredRepository {
    repository: Arc<Repository>,
    /// Refs on disk when the repository was loaded; `None` for
    /// repositories registered in memory.
    snapshot: Option<RefsSnapshot>,
}

/// Registry of repositories keyed by name.
///
/// A store opened on a folder serves the bare repositories below it and
/// follows the folder: repositories are reloaded when their refs change,
/// new repositories are picked up and deleted ones are forgotten.
#[derive(Debug, Default)]
pub struct RepoStore {
    repos: RwLock<BTreeMap<String, StoredRepository>>,
    base_dir: Option<PathBuf>,
}

impl RepoStore {
    /// Creates a new empty in-memory repository store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a store on the bare repositories below `base_dir`.
    ///
    /// Fails when `base_dir` is not a directory. Repositories that fail to
    /// load are logged and skipped.
    pub fn open(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            repos: RwLock::default(),
            base_dir: Some(base_dir.into()),
        };
        store.rescan()?;
        Ok(store)
    }

    /// Folder the repositories are read from.
    pub fn base_dir(&self) -> Option<&Path> {
        self.base_dir.as_deref()
    }

    /// Registers an in-memory repository.
    pub fn insert(&self, repository: Repository) -> Result<Arc<Repository>> {
        let mut repos = self.repos.write();
        if repos.contains_key(&repository.name) {
            return Err(StorageError::RepoExists(repository.name));
        }
        let repo = Arc::new(repository);
        repos.insert(
            repo.name.clone(),
            StoredRepository {
                repository: repo.clone(),
                snapshot: None,
            },
        );
        Ok(repo)
    }

    /// Opens a repository by name.
    ///
    /// For a store opened on a folder this checks the refs on disk and
    /// reloads the repository when they changed. If the reload fails the
    /// previously loaded state is served.
    pub fn get(&self, name: &str) -> Result<Arc<Repository>> {
        let cached = self
            .repos
            .read()
            .get(name)
            .map(|stored| (stored.repository.clone(), stored.snapshot.clone()));

        let Some(base_dir) = &self.base_dir else {
            return cached
                .map(|(repository, _)| repository)
                .ok_or_else(|| StorageError::RepoNotFound(name.to_string()));
        };
        if let Some((repository, None)) = &cached {
            return Ok(repository.clone());
        }

        let Some(path) = repository_path(base_dir, name).filter(|path| is_bare_repository(path))
        else {
            if cached.is_some() {
                self.repos.write().remove(name);
                tracing::info!(repository = %name, "Repository removed from disk");
            }
            return Err(StorageError::RepoNotFound(name.to_string()));
        };

        let Some((repository, Some(snapshot))) = cached else {
            return self.load(name, &path);
        };
        match RefsSnapshot::read(&path) {
            Ok(current) if current == snapshot => Ok(repository),
            Ok(_) => {
                tracing::debug!(repository = %name, "Refs changed on disk, reloading");
                self.load(name, &path).or_else(|e| {
                    tracing::warn!(repository = %name, error = %e, "Failed to reload repository");
                    Ok(repository)
                })
            }
            Err(e) => {
                tracing::warn!(repository = %name, error = %e, "Failed to read refs");
                Ok(repository)
            }
        }
    }

    /// Brings the registry in line with the folder: loads repositories
    /// not seen before and forgets those no longer on disk. Returns the
    /// names of all registered repositories, sorted.
    pub fn rescan(&self) -> Result<Vec<String>> {
        let Some(base_dir) = &self.base_dir else {
            return Ok(self.names());
        };
        let found = discover_repositories(base_dir)?;

        self.repos.write().retain(|name, stored| {
            stored.snapshot.is_none() || found.iter().any(|(found_name, _)| found_name == name)
        });
        for (name, path) in &found {
            if self.repos.read().contains_key(name) {
                continue;
            }
            if let Err(e) = self.load(name, path) {
                tracing::warn!(repository = %name, error = %e, "Failed to load repository");
            }
        }
        Ok(self.names())
    }

    /// Names of the registered repositories, sorted. A store opened on a
    /// folder rescans it first.
    pub fn list(&self) -> Vec<String> {
        if self.base_dir.is_some() {
            match self.rescan() {
                Ok(names) => return names,
                Err(e) => tracing::warn!(error = %e, "Failed to rescan repositories"),
            }
        }
        self.names()
    }

    /// Returns the number of registered repositories.
    pub fn len(&self) -> usize {
        self.repos.read().len()
    }

    /// Returns true if no repositories are registered.
    pub fn is_empty(&self) -> bool {
        self.repos.read().is_empty()
    }

    fn names(&self) -> Vec<String> {
        self.repos.read().keys().cloned().collect()
    }

    fn load(&self, name: &str, path: &Path) -> Result<Arc<Repository>> {
        // read before loading so a concurrent push triggers another reload
        let snapshot = RefsSnapshot::read(path)?;
        let repository = Arc::new(load_repository(path, name)?);
        tracing::info!(
            repository = %name,
            objects = repository.objects.len(),
            "Loaded repository"
        );
        self.repos.write().insert(
            name.to_string(),
            StoredRepository {
                repository: repository.clone(),
                snapshot: Some(snapshot),
            },
        );
        Ok(repository)
    }
}

/// Path of repository `name` below `base_dir`, refusing names that
/// leave the folder.
fn repository_path(base_dir: &Path, name: &str) -> Option<PathBuf> {
    let relative = Path::new(name);
    let inside = !name.is_empty()
        && relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    inside.then(|| base_dir.join(relative))
}

#[cfg(test)]
impl Repository {
    /// Creates a commit on the current branch with HEAD as its parent.
    pub(crate) fn commit(
        &self,
        tree_id: &ObjectId,
        message: &str,
        author: &str,
        committer: &str,
    ) -> Result<ObjectId> {
        let parents: Vec<ObjectId> = self.head().into_iter().collect();
        let commit = GitObject::commit(tree_id, &parents, author, committer, message);
        let commit_id = self.objects.put(commit);

        match self.current_branch() {
            Some(branch) => self
                .refs
                .set(&format!("{}{}", crate::R_HEADS, branch), commit_id),
            None => self.refs.set(HEAD, commit_id),
        }
        Ok(commit_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    const IDENT: &str = "Alice <alice@example.com> 1234567890 +0000";

    #[test]
    fn test_object_store_roundtrip() {
        let store = ObjectStore::new();
        let id = store.put_blob(b"Hello, World!".to_vec());

        let retrieved = store.get(&id).unwrap();
        assert_eq!(retrieved.data.as_ref(), b"Hello, World!");
        assert!(store.contains(&id));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_object_store_missing() {
        let store = ObjectStore::new();
        let missing = ObjectId::from_bytes([9u8; 20]);
        assert!(matches!(store.get(&missing), Err(StorageError::ObjectNotFound(_))));
    }

    #[test]
    fn test_find_unique_prefix() {
        let store = ObjectStore::new();
        let id = store.put_blob(b"one".to_vec());
        store.put_blob(b"two".to_vec());

        assert_eq!(store.find_unique_prefix(&id.short_hex(10)), Some(id));
        assert_eq!(store.find_unique_prefix(""), None);
    }

    #[test]
    fn test_loose_object_roundtrip() {
        let original = GitObject::blob(b"Hello, World!".to_vec());
        let header = format!("blob {}\0", original.data.len());
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(header.as_bytes()).unwrap();
        encoder.write_all(&original.data).unwrap();
        let compressed = encoder.finish().unwrap();
        let decompressed = ObjectStore::decompress(&compressed).unwrap();

        assert_eq!(original.id, decompressed.id);
        assert_eq!(original.object_type, decompressed.object_type);
        assert_eq!(original.data, decompressed.data);
    }

    #[test]
    fn test_decompress_garbage() {
        assert!(matches!(
            ObjectStore::decompress(b"not zlib"),
            Err(StorageError::Compression(_))
        ));
    }

    #[test]
    fn test_repository_commit_advances_branch() {
        let repo = Repository::new("test.git");
        assert_eq!(repo.current_branch(), Some("main".to_string()));

        let tree_id = repo.objects.put(GitObject::new(ObjectType::Tree, Vec::new()));
        let first = repo.commit(&tree_id, "first", IDENT, IDENT).unwrap();
        let second = repo.commit(&tree_id, "second", IDENT, IDENT).unwrap();

        assert_ne!(first, second);
        assert_eq!(repo.head().unwrap(), second);
        let data = repo.objects.get(&second).unwrap().data;
        assert!(String::from_utf8_lossy(&data).contains(&format!("parent {}", first)));
    }

    #[test]
    fn test_repo_store_registry() {
        let repos = RepoStore::new();
        repos.insert(Repository::new("b.git")).unwrap();
        repos.insert(Repository::new("a.git")).unwrap();

        assert!(matches!(
            repos.insert(Repository::new("a.git")),
            Err(StorageError::RepoExists(_))
        ));
        assert!(matches!(repos.get("c.git"), Err(StorageError::RepoNotFound(_))));

        assert_eq!(repos.list(), vec!["a.git", "b.git"]);
        assert_eq!(repos.len(), 2);
        assert!(repos.base_dir().is_none());
    }

    #[test]
    fn test_repository_path_stays_inside() {
        let base = Path::new("/srv/git");
        assert_eq!(
            repository_path(base, "team/app.git"),
            Some(PathBuf::from("/srv/git/team/app.git"))
        );
        assert_eq!(repository_path(base, "../etc"), None);
        assert_eq!(repository_path(base, "team/../../etc"), None);
        assert_eq!(repository_path(base, "/etc"), None);
        assert_eq!(repository_path(base, ""), None);
    }
}
