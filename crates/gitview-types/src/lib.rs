//! Common types used throughout `gitview`.
//!
//! This crate provides the models shared by the storage layer and the
//! web front-end: repository metadata, users, search types, commit
//! identities and change types.

mod change;
mod person;
mod repository;
mod search;
mod user;

pub use change::ChangeType;
pub use person::PersonIdent;
pub use repository::{AccessRestriction, RepositoryModel};
pub use search::SearchType;
pub use user::UserModel;
