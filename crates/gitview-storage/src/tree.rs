//! Tree object parsing.

use crate::{GitObject, ObjectId, ObjectType, Result, StorageError};

/// File mode of a tree entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// Subdirectory (`40000`).
    Tree,
    /// Regular file (`100644`).
    Regular,
    /// Executable file (`100755`).
    Executable,
    /// Symbolic link (`120000`).
    Symlink,
    /// Submodule commit (`160000`).
    Gitlink,
}

impl FileMode {
    /// Parses the octal mode string stored in a tree.
    pub fn parse(mode: &str) -> Result<Self> {
        match mode {
            "40000" | "040000" => Ok(Self::Tree),
            "100644" | "100664" => Ok(Self::Regular),
            "100755" => Ok(Self::Executable),
            "120000" => Ok(Self::Symlink),
            "160000" => Ok(Self::Gitlink),
            other => Err(StorageError::InvalidObject(format!(
                "unknown file mode: {}",
                other
            ))),
        }
    }

    /// Returns the mode string git writes into trees.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tree => "40000",
            Self::Regular => "100644",
            Self::Executable => "100755",
            Self::Symlink => "120000",
            Self::Gitlink => "160000",
        }
    }

    /// Returns the mode as `ls -l` style permissions for listings.
    pub fn display(&self) -> &'static str {
        match self {
            Self::Tree => "drwxr-xr-x",
            Self::Regular => "-rw-r--r--",
            Self::Executable => "-rwxr-xr-x",
            Self::Symlink => "lrwxrwxrwx",
            Self::Gitlink => "m---------",
        }
    }
}

/// A single entry of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Entry mode.
    pub mode: FileMode,
    /// File or directory name.
    pub name: String,
    /// Target object.
    pub id: ObjectId,
}

impl TreeEntry {
    /// Creates a new entry.
    pub fn new(mode: FileMode, name: impl Into<String>, id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            id,
        }
    }

    /// Returns true for subdirectories.
    pub fn is_tree(&self) -> bool {
        self.mode == FileMode::Tree
    }
}

/// A parsed tree object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries in stored order.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Parses a tree object.
    pub fn parse(object: &GitObject) -> Result<Self> {
        if object.object_type != ObjectType::Tree {
            return Err(StorageError::InvalidObject(format!(
                "{} is a {}, not a tree",
                object.id,
                object.object_type.as_str()
            )));
        }
        Self::parse_data(&object.data)
    }

    /// Parses raw tree data: repeated `mode SP name NUL sha1[20]`.
    pub fn parse_data(data: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut i = 0;

        while i < data.len() {
            let space_pos = data[i..]
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| StorageError::InvalidObject("tree entry without mode".into()))?;
            let mode = FileMode::parse(&String::from_utf8_lossy(&data[i..i + space_pos]))?;
            i += space_pos + 1;

            let null_pos = data[i..]
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| StorageError::InvalidObject("tree entry without name".into()))?;
            let name = String::from_utf8_lossy(&data[i..i + null_pos]).to_string();
            i += null_pos + 1;

            if i + 20 > data.len() {
                return Err(StorageError::InvalidObject("truncated tree entry".into()));
            }
            let id = ObjectId::from_slice(&data[i..i + 20])?;
            i += 20;

            entries.push(TreeEntry { mode, name, id });
        }

        Ok(Self { entries })
    }

    /// Encodes entries into a tree object, sorting them the way git does.
    pub fn encode(mut entries: Vec<TreeEntry>) -> GitObject {
        // git orders directories as if their name ended with '/'
        entries.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        let mut data = Vec::new();
        for entry in &entries {
            data.extend_from_slice(entry.mode.as_str().as_bytes());
            data.push(b' ');
            data.extend_from_slice(entry.name.as_bytes());
            data.push(0);
            data.extend_from_slice(entry.id.as_bytes());
        }
        GitObject::new(ObjectType::Tree, data)
    }

    /// Finds an entry by name.
    pub fn find(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }
}

fn sort_key(entry: &TreeEntry) -> Vec<u8> {
    let mut key = entry.name.as_bytes().to_vec();
    if entry.is_tree() {
        key.push(b'/');
    }
    key
}
