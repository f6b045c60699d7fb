//! Front-end settings.

use gitview_utils::{break_lines_for_html, escape_for_html};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A regex substitution applied to rendered commit messages,
/// e.g. turning `#123` into a link to an issue tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSubstitution {
    /// Pattern matched against the HTML-escaped message.
    pub pattern: String,
    /// Replacement, may reference groups as `$1`.
    pub replacement: String,
    /// Restricts the substitution to one repository.
    #[serde(default)]
    pub repository: Option<String>,
}

/// Settings of the `web` configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSettings {
    /// Require an administrator session for administration pages.
    pub authenticate_admin_pages: bool,
    /// Enable administration pages.
    pub allow_administration: bool,
    /// Show author and committer email addresses.
    pub show_email_addresses: bool,
    /// Show the search type selector next to the search box.
    pub show_search_type_selection: bool,
    /// Name shown in page titles and headers.
    pub site_name: String,
    /// Commits shown on the summary page.
    pub summary_commit_count: usize,
    /// Branches and tags shown on the summary page.
    pub summary_refs_count: usize,
    /// Commits per log and search results page.
    pub log_page_size: usize,
    /// Entries in an RSS feed.
    pub syndication_entries: usize,
    /// File extensions rendered as Markdown documents.
    pub markdown_extensions: Vec<String>,
    /// Substitutions applied to commit messages.
    pub commit_message_regex: Vec<MessageSubstitution>,
}

impl Default for WebSettings {
    fn default() -> Self {
        Self {
            authenticate_admin_pages: true,
            allow_administration: false,
            show_email_addresses: false,
            show_search_type_selection: false,
            site_name: "gitview".to_string(),
            summary_commit_count: 16,
            summary_refs_count: 5,
            log_page_size: 50,
            syndication_entries: 25,
            markdown_extensions: vec!["md".into(), "mkd".into(), "markdown".into()],
            commit_message_regex: Vec::new(),
        }
    }
}

/// Compiled commit message substitutions.
#[derive(Debug, Default)]
pub struct MessageProcessor {
    rules: Vec<(Regex, MessageSubstitution)>,
}

impl MessageProcessor {
    /// Compiles the configured substitutions, skipping invalid patterns.
    pub fn new(substitutions: &[MessageSubstitution]) -> Self {
        let mut rules = Vec::with_capacity(substitutions.len());
        for substitution in substitutions {
            match Regex::new(&substitution.pattern) {
                Ok(regex) => rules.push((regex, substitution.clone())),
                Err(e) => tracing::warn!(
                    pattern = %substitution.pattern,
                    error = %e,
                    "Ignoring invalid commit message substitution"
                ),
            }
        }
        Self { rules }
    }

    /// Renders a commit message as HTML: escapes it, applies the
    /// substitutions for `repository` and breaks lines.
    pub fn process(&self, repository: &str, text: &str) -> String {
        let mut html = escape_for_html(text, false);
        for (regex, substitution) in &self.rules {
            let applies = substitution
                .repository
                .as_deref()
                .is_none_or(|r| r.eq_ignore_ascii_case(repository));
            if applies {
                html = regex
                    .replace_all(&html, substitution.replacement.as_str())
                    .into_owned();
            }
        }
        break_lines_for_html(&html)
    }
}
