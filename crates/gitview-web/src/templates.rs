//! Askama template definitions.

use askama::Template;

use crate::repository_page::PageChrome;

/// Repository row of the index page.
#[derive(Debug, Clone)]
pub struct RepositoryRow {
    pub name: String,
    pub href: String,
    pub description: String,
    pub owner: String,
    pub last_change: String,
}

/// A ref label shown next to a commit.
#[derive(Debug, Clone)]
pub struct RefBadge {
    pub name: String,
    pub href: String,
    /// CSS class: `branch`, `tag` or `remote`.
    pub kind: &'static str,
}

/// Commit row of log, summary and search pages.
#[derive(Debug, Clone)]
pub struct CommitRow {
    pub short_id: String,
    pub href: String,
    pub tree_href: String,
    pub message: String,
    /// Pre-rendered person panel.
    pub author_html: String,
    pub date: String,
    pub age: String,
    pub refs: Vec<RefBadge>,
}

/// Branch or tag row.
#[derive(Debug, Clone)]
pub struct RefRow {
    pub name: String,
    pub short_id: String,
    pub message: String,
    pub age: String,
    pub log_href: String,
    pub tree_href: String,
    pub commit_href: String,
    pub is_annotated: bool,
}

/// Tree listing row.
#[derive(Debug, Clone)]
pub struct PathRow {
    pub name: String,
    pub href: String,
    pub mode: &'static str,
    pub size: String,
    pub is_tree: bool,
}

/// File changed by a commit.
#[derive(Debug, Clone)]
pub struct ChangeRow {
    pub path: String,
    pub href: String,
    pub change: &'static str,
    pub tooltip: &'static str,
}

/// A parent of a commit.
#[derive(Debug, Clone)]
pub struct ParentLink {
    pub short_id: String,
    pub href: String,
}

/// Ticket comment.
#[derive(Debug, Clone)]
pub struct TicketCommentRow {
    pub author: String,
    pub date: String,
    pub text_html: String,
}

/// Ticket of the tickets page.
#[derive(Debug, Clone)]
pub struct TicketRow {
    pub id: String,
    pub title: String,
    pub state: String,
    pub assigned: String,
    pub tags: String,
    pub date: String,
    pub comments: Vec<TicketCommentRow>,
}

/// Document of the docs page.
#[derive(Debug, Clone)]
pub struct DocRow {
    pub name: String,
    pub path: String,
    pub href: String,
    pub size: String,
}

/// Access restriction choice of the edit form.
#[derive(Debug, Clone)]
pub struct RestrictionOption {
    pub name: &'static str,
    pub selected: bool,
}

/// RSS item.
#[derive(Debug, Clone)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub author: String,
    pub pub_date: String,
    pub guid: String,
}

/// Repository list.
#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub chrome: PageChrome,
    pub repositories: Vec<RepositoryRow>,
}

/// Repository summary.
#[derive(Template)]
#[template(path = "summary.html")]
pub struct SummaryTemplate {
    pub chrome: PageChrome,
    pub description: String,
    pub owner: String,
    pub last_change: String,
    pub commits: Vec<CommitRow>,
    pub branches: Vec<RefRow>,
    pub tags: Vec<RefRow>,
    pub readme_html: Option<String>,
    pub log_href: String,
    pub branches_href: String,
    pub tags_href: String,
}

/// Paged commit log.
#[derive(Template)]
#[template(path = "log.html")]
pub struct LogTemplate {
    pub chrome: PageChrome,
    pub commits: Vec<CommitRow>,
    pub newer_href: Option<String>,
    pub older_href: Option<String>,
}

/// Local and remote branches.
#[derive(Template)]
#[template(path = "branches.html")]
pub struct BranchesTemplate {
    pub chrome: PageChrome,
    pub branches: Vec<RefRow>,
    pub remotes: Vec<RefRow>,
}

/// Tags.
#[derive(Template)]
#[template(path = "tags.html")]
pub struct TagsTemplate {
    pub chrome: PageChrome,
    pub tags: Vec<RefRow>,
}

/// Directory listing.
#[derive(Template)]
#[template(path = "tree.html")]
pub struct TreeTemplate {
    pub chrome: PageChrome,
    pub short_id: String,
    pub commit_href: String,
    pub path: String,
    pub parent_href: Option<String>,
    pub files: Vec<PathRow>,
}

/// File viewer.
#[derive(Template)]
#[template(path = "blob.html")]
pub struct BlobTemplate {
    pub chrome: PageChrome,
    pub short_id: String,
    pub path: String,
    pub raw_href: String,
    pub markdown_href: Option<String>,
    pub is_binary: bool,
    pub content: String,
    pub language: &'static str,
    pub size: String,
}

/// Single commit.
#[derive(Template)]
#[template(path = "commit.html")]
pub struct CommitTemplate {
    pub chrome: PageChrome,
    pub id: String,
    pub short_id: String,
    pub tree_href: String,
    pub parents: Vec<ParentLink>,
    pub author_html: String,
    pub author_date: String,
    pub committer_html: String,
    pub committer_date: String,
    pub message_html: String,
    pub refs: Vec<RefBadge>,
    pub changes: Vec<ChangeRow>,
}

/// Commit search results.
#[derive(Template)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub chrome: PageChrome,
    pub search: String,
    pub search_type: String,
    pub results: Vec<CommitRow>,
    pub newer_href: Option<String>,
    pub older_href: Option<String>,
}

/// Tickets of the ticket branch.
#[derive(Template)]
#[template(path = "tickets.html")]
pub struct TicketsTemplate {
    pub chrome: PageChrome,
    pub branch: String,
    pub tickets: Vec<TicketRow>,
}

/// Markdown documents.
#[derive(Template)]
#[template(path = "docs.html")]
pub struct DocsTemplate {
    pub chrome: PageChrome,
    pub docs: Vec<DocRow>,
}

/// A rendered Markdown document.
#[derive(Template)]
#[template(path = "markdown.html")]
pub struct MarkdownTemplate {
    pub chrome: PageChrome,
    pub path: String,
    pub raw_href: String,
    pub html: String,
}

/// Repository settings form.
#[derive(Template)]
#[template(path = "edit.html")]
pub struct EditTemplate {
    pub chrome: PageChrome,
    pub action: String,
    pub description: String,
    pub owner: String,
    pub use_tickets: bool,
    pub use_docs: bool,
    pub restrictions: Vec<RestrictionOption>,
    pub errors: Vec<String>,
}

/// RSS 2.0 feed.
#[derive(Template)]
#[template(path = "feed.xml")]
pub struct FeedTemplate {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<FeedItem>,
}
