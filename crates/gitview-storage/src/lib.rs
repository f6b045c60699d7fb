//! Git access layer for gitview.
//!
//! This crate provides content-addressed storage for git objects
//! (blobs, trees, commits, tags), reference management, and the
//! read-side queries the web front-end needs: revision resolution,
//! history walks and searches, tree listings, tree diffs, ref listings
//! and ticket branches. Repositories are loaded from bare repositories
//! on disk.

mod commit;
mod error;
mod history;
mod loader;
mod object;
mod pack;
mod paths;
mod refmodel;
mod refs;
mod store;
mod tickets;
mod tree;

pub use commit::{Commit, Tag};
pub use error::StorageError;
pub use history::{get_commit, get_revlog, resolve_revision, search_revlogs};
pub use loader::{discover_repositories, load_repository};
pub use object::{GitObject, ObjectId, ObjectType};
pub use pack::PackReader;
pub use paths::{
    get_blob, get_changed_paths, get_documents, get_files_in_path, PathChangeModel, PathModel,
};
pub use refmodel::{
    get_all_refs, get_local_branches, get_remote_branches, get_tags, get_ticket_branch, RefModel,
};
pub use refs::{short_ref_name, RefStore, Reference, HEAD, R_HEADS, R_REMOTES, R_TAGS};
pub use store::{ObjectStore, RepoStore, Repository};
pub use tickets::{get_tickets, TicketComment, TicketModel};
pub use tree::{FileMode, Tree, TreeEntry};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
