//! Author and committer panels, and change type tooltips.

use gitview_types::{ChangeType, PersonIdent, SearchType};
use gitview_utils::{escape_for_html, is_empty};
use std::fmt;

use crate::messages::get_string;
use crate::params::PageParameters;

/// A link to the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonLink {
    /// Link text.
    pub text: String,
    /// Search page URL.
    pub href: String,
    /// Tooltip, set for author and committer searches.
    pub tooltip: Option<String>,
}

impl PersonLink {
    fn new(
        repository: &str,
        object_id: Option<&str>,
        text: String,
        value: &str,
        search_type: SearchType,
    ) -> Self {
        Self {
            text,
            href: PageParameters::new_search_parameter(repository, object_id, value, search_type)
                .href("/search"),
            tooltip: person_search_tooltip(value, search_type),
        }
    }
}

impl fmt::Display for PersonLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<a class=\"list\" href=\"{}\"", escape_for_html(&self.href, false))?;
        if let Some(tooltip) = &self.tooltip {
            write!(f, " title=\"{}\"", escape_for_html(tooltip, false))?;
        }
        write!(f, ">{}</a>", escape_for_html(&self.text, false))
    }
}

/// How a person is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersonPanel {
    /// A single link.
    Partial(PersonLink),
    /// A name link followed by an `<email>` link.
    Full {
        /// Name link.
        name: PersonLink,
        /// Address link.
        address: PersonLink,
    },
}

impl fmt::Display for PersonPanel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonPanel::Partial(link) => write!(f, "<span class=\"person\">{}</span>", link),
            PersonPanel::Full { name, address } => {
                write!(f, "<span class=\"person\">{} {}</span>", name, address)
            }
        }
    }
}

/// Builds the panel for `ident`, linking to searches of `search_type`.
///
/// Without email display, or when the name or email is missing, only one
/// link is shown: the name, else the email (when emails are shown), else
/// a missing-username placeholder.
pub fn create_person_panel(
    repository: &str,
    object_id: Option<&str>,
    ident: &PersonIdent,
    search_type: SearchType,
    show_email: bool,
) -> PersonPanel {
    let name = ident.name.as_str();
    let email = ident.email.as_str();

    if !show_email || is_empty(Some(name)) || is_empty(Some(email)) {
        let value = if !is_empty(Some(name)) {
            name
        } else if show_email {
            email
        } else {
            get_string("gb.missingUsername")
        };
        return PersonPanel::Partial(PersonLink::new(
            repository,
            object_id,
            value.to_string(),
            value,
            search_type,
        ));
    }

    PersonPanel::Full {
        name: PersonLink::new(repository, object_id, name.to_string(), name, search_type),
        address: PersonLink::new(
            repository,
            object_id,
            format!("<{}>", email),
            email,
            search_type,
        ),
    }
}

/// Tooltip for a person link, if the search type has one.
pub fn person_search_tooltip(value: &str, search_type: SearchType) -> Option<String> {
    let prefix = match search_type {
        SearchType::Author => get_string("gb.searchForAuthor"),
        SearchType::Committer => get_string("gb.searchForCommitter"),
        SearchType::Commit => return None,
    };
    Some(format!("{} {}", prefix, value))
}

/// Tooltip describing a change type.
pub fn change_type_tooltip(change_type: ChangeType) -> &'static str {
    match change_type {
        ChangeType::Add => get_string("gb.addition"),
        ChangeType::Copy | ChangeType::Rename => get_string("gb.rename"),
        ChangeType::Delete => get_string("gb.deletion"),
        ChangeType::Modify => get_string("gb.modification"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str, email: &str) -> PersonIdent {
        PersonIdent::new(name, email, 0)
    }

    #[test]
    fn test_partial_when_emails_hidden() {
        let panel = create_person_panel(
            "a.git",
            None,
            &ident("Alice", "alice@example.com"),
            SearchType::Author,
            false,
        );
        let PersonPanel::Partial(link) = panel else {
            panic!("expected partial panel");
        };
        assert_eq!(link.text, "Alice");
        assert_eq!(link.href, "/search?r=a.git&s=Alice&st=author");
        assert_eq!(link.tooltip.as_deref(), Some("Search for author Alice"));
    }

    #[test]
    fn test_partial_falls_back_to_email() {
        let panel = create_person_panel(
            "a.git",
            Some("main"),
            &ident("", "ghost@example.com"),
            SearchType::Committer,
            true,
        );
        let PersonPanel::Partial(link) = panel else {
            panic!("expected partial panel");
        };
        assert_eq!(link.text, "ghost@example.com");
        assert_eq!(
            link.tooltip.as_deref(),
            Some("Search for committer ghost@example.com")
        );
        assert!(link.href.contains("h=main"));
    }

    #[test]
    fn test_partial_missing_username() {
        let panel =
            create_person_panel("a.git", None, &ident("", "x@example.com"), SearchType::Author, false);
        let PersonPanel::Partial(link) = panel else {
            panic!("expected partial panel");
        };
        assert_eq!(link.text, "Missing Username");
    }

    #[test]
    fn test_partial_when_email_missing() {
        let panel = create_person_panel("a.git", None, &ident("Bob", ""), SearchType::Author, true);
        assert!(matches!(panel, PersonPanel::Partial(ref link) if link.text == "Bob"));
    }

    #[test]
    fn test_full_panel() {
        let panel = create_person_panel(
            "a.git",
            None,
            &ident("Alice", "alice@example.com"),
            SearchType::Author,
            true,
        );
        let PersonPanel::Full { name, address } = &panel else {
            panic!("expected full panel");
        };
        assert_eq!(name.text, "Alice");
        assert_eq!(address.text, "<alice@example.com>");
        assert_eq!(
            address.tooltip.as_deref(),
            Some("Search for author alice@example.com")
        );

        let html = panel.to_string();
        assert!(html.contains("&lt;alice@example.com&gt;</a>"));
        assert!(html.contains("title=\"Search for author Alice\""));
    }

    #[test]
    fn test_commit_search_has_no_tooltip() {
        assert_eq!(person_search_tooltip("x", SearchType::Commit), None);
    }

    #[test]
    fn test_change_type_tooltips() {
        assert_eq!(change_type_tooltip(ChangeType::Add), "addition");
        assert_eq!(change_type_tooltip(ChangeType::Copy), "rename");
        assert_eq!(change_type_tooltip(ChangeType::Rename), "rename");
        assert_eq!(change_type_tooltip(ChangeType::Delete), "deletion");
        assert_eq!(change_type_tooltip(ChangeType::Modify), "modification");
    }
}
