//! gitview web front-end
//!
//! Server-rendered pages for browsing git repositories:
//! - Repository index, summary, log, branches, tags and tree pages
//! - Blob, raw and commit views
//! - Commit search by message, author or committer
//! - Ticket branch and Markdown documentation pages
//! - Repository settings editing for administrators and owners
//! - RSS feeds per repository

pub mod error;
pub mod markdown;
pub mod messages;
pub mod pages;
pub mod params;
pub mod person;
pub mod repository_page;
pub mod routes;
pub mod search;
pub mod session;
pub mod settings;
pub mod syndication;
pub mod templates;
pub mod time;
pub mod validation;

pub use error::WebError;
pub use markdown::render_markdown;
pub use repository_page::RepositoryPage;
pub use routes::{web_routes, WebState};
pub use session::{Session, UserAccount, UserStore};
pub use settings::{MessageSubstitution, WebSettings};
