//! Commit and annotated tag parsing.

use crate::{GitObject, ObjectId, ObjectType, Result, StorageError};
use gitview_types::PersonIdent;

/// A parsed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Commit id.
    pub id: ObjectId,
    /// Root tree.
    pub tree: ObjectId,
    /// Parent commits, first parent first.
    pub parents: Vec<ObjectId>,
    /// Author identity.
    pub author: PersonIdent,
    /// Committer identity.
    pub committer: PersonIdent,
    /// Full message.
    pub message: String,
}

impl Commit {
    /// Parses a commit object.
    pub fn parse(object: &GitObject) -> Result<Self> {
        if object.object_type != ObjectType::Commit {
            return Err(StorageError::InvalidObject(format!(
                "{} is a {}, not a commit",
                object.id,
                object.object_type.as_str()
            )));
        }

        let content = String::from_utf8_lossy(&object.data);
        let (headers, message) = split_message(&content);

        let mut tree = None;
        let mut parents = Vec::new();
        let mut author = None;
        let mut committer = None;

        for line in headers.lines() {
            if let Some(hex) = line.strip_prefix("tree ") {
                tree = Some(ObjectId::from_hex(hex.trim())?);
            } else if let Some(hex) = line.strip_prefix("parent ") {
                parents.push(ObjectId::from_hex(hex.trim())?);
            } else if let Some(ident) = line.strip_prefix("author ") {
                author = PersonIdent::parse(ident);
            } else if let Some(ident) = line.strip_prefix("committer ") {
                committer = PersonIdent::parse(ident);
            }
        }

        let tree = tree.ok_or_else(|| {
            StorageError::InvalidObject(format!("commit {} has no tree", object.id))
        })?;
        let author = author.unwrap_or_else(|| PersonIdent::new("", "", 0));
        let committer = committer.unwrap_or_else(|| author.clone());

        Ok(Self {
            id: object.id,
            tree,
            parents,
            author,
            committer,
            message: message.to_string(),
        })
    }

    /// Returns the first line of the message.
    pub fn short_message(&self) -> &str {
        self.message.lines().next().unwrap_or("").trim()
    }

    /// Returns the first parent, if any.
    pub fn first_parent(&self) -> Option<ObjectId> {
        self.parents.first().copied()
    }

    /// Returns the commit time (committer time, unix seconds).
    pub fn commit_time(&self) -> i64 {
        self.committer.when
    }
}

/// A parsed annotated tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Tag object id.
    pub id: ObjectId,
    /// Tagged object.
    pub object: ObjectId,
    /// Type of the tagged object.
    pub object_type: ObjectType,
    /// Tag name.
    pub name: String,
    /// Tagger, missing on some very old tags.
    pub tagger: Option<PersonIdent>,
    /// Tag message.
    pub message: String,
}

impl Tag {
    /// Parses a tag object.
    pub fn parse(object: &GitObject) -> Result<Self> {
        if object.object_type != ObjectType::Tag {
            return Err(StorageError::InvalidObject(format!(
                "{} is a {}, not a tag",
                object.id,
                object.object_type.as_str()
            )));
        }

        let content = String::from_utf8_lossy(&object.data);
        let (headers, message) = split_message(&content);

        let mut target = None;
        let mut target_type = None;
        let mut name = String::new();
        let mut tagger = None;

        for line in headers.lines() {
            if let Some(hex) = line.strip_prefix("object ") {
                target = Some(ObjectId::from_hex(hex.trim())?);
            } else if let Some(kind) = line.strip_prefix("type ") {
                target_type = Some(ObjectType::parse(kind.trim())?);
            } else if let Some(tag) = line.strip_prefix("tag ") {
                name = tag.trim().to_string();
            } else if let Some(ident) = line.strip_prefix("tagger ") {
                tagger = PersonIdent::parse(ident);
            }
        }

        let (Some(target), Some(target_type)) = (target, target_type) else {
            return Err(StorageError::InvalidObject(format!(
                "tag {} has no target",
                object.id
            )));
        };

        Ok(Self {
            id: object.id,
            object: target,
            object_type: target_type,
            name,
            tagger,
            message: message.to_string(),
        })
    }
}

/// Splits an object body into headers and message at the first blank line.
fn split_message(content: &str) -> (&str, &str) {
    match content.find("\n\n") {
        Some(pos) => (&content[..pos], &content[pos + 2..]),
        None => (content, ""),
    }
}
