//! User-visible strings, keyed by translation key.

use once_cell::sync::Lazy;
use std::collections::HashMap;

static MESSAGES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("gb.summary", "summary"),
        ("gb.log", "log"),
        ("gb.branches", "branches"),
        ("gb.tags", "tags"),
        ("gb.tree", "tree"),
        ("gb.tickets", "tickets"),
        ("gb.edit", "edit"),
        ("gb.docs", "docs"),
        ("gb.blob", "blob"),
        ("gb.raw", "raw"),
        ("gb.commit", "commit"),
        ("gb.search", "search"),
        ("gb.markdown", "markdown"),
        ("gb.feed", "feed"),
        ("gb.repositories", "repositories"),
        ("gb.missingUsername", "Missing Username"),
        ("gb.searchForAuthor", "Search for author"),
        ("gb.searchForCommitter", "Search for committer"),
        ("gb.searchTypeTooltip", "Select Search Type"),
        ("gb.searchTooltip", "Search this repository"),
        ("gb.addition", "addition"),
        ("gb.modification", "modification"),
        ("gb.deletion", "deletion"),
        ("gb.rename", "rename"),
        ("gb.author", "author"),
        ("gb.committer", "committer"),
        ("gb.parent", "parent"),
        ("gb.age", "age"),
        ("gb.owner", "owner"),
        ("gb.description", "description"),
        ("gb.lastChange", "last change"),
        ("gb.accessRestriction", "access restriction"),
        ("gb.useTickets", "use tickets"),
        ("gb.useDocs", "use docs"),
        ("gb.save", "save"),
        ("gb.newer", "newer"),
        ("gb.older", "older"),
        ("gb.login", "login"),
        ("gb.emptyRepository", "empty repository"),
    ])
});

/// Returns the text for `key`, or the key itself when it is unknown.
pub fn get_string(key: &str) -> &str {
    MESSAGES.get(key).copied().unwrap_or(key)
}
