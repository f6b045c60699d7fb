//! Page registry and navigation links.

use crate::messages::get_string;
use crate::params::PageParameters;

/// A page reachable from the repository navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRegistration {
    /// Link id, e.g. `summary`.
    pub key: &'static str,
    /// Translation key of the link text.
    pub translation_key: &'static str,
    /// Route serving the page.
    pub path: &'static str,
}

const fn page(
    key: &'static str,
    translation_key: &'static str,
    path: &'static str,
) -> PageRegistration {
    PageRegistration {
        key,
        translation_key,
        path,
    }
}

/// Registered pages; each key maps to exactly one route.
pub static REGISTERED_PAGES: [PageRegistration; 8] = [
    page("summary", "gb.summary", "/summary"),
    page("log", "gb.log", "/log"),
    page("branches", "gb.branches", "/branches"),
    page("tags", "gb.tags", "/tags"),
    page("tree", "gb.tree", "/tree"),
    page("tickets", "gb.tickets", "/tickets"),
    page("edit", "gb.edit", "/edit"),
    page("docs", "gb.docs", "/docs"),
];

/// Links always shown, in order.
pub const STANDARD_LINKS: [&str; 5] = ["summary", "log", "branches", "tags", "tree"];

/// Looks up a registration by link id.
pub fn registration(key: &str) -> Option<&'static PageRegistration> {
    REGISTERED_PAGES.iter().find(|page| page.key == key)
}

/// Finds the link id whose translated name equals `page_name`.
pub fn get_link_id(page_name: &str) -> Option<&'static str> {
    REGISTERED_PAGES
        .iter()
        .find(|page| get_string(page.translation_key) == page_name)
        .map(|page| page.key)
}

/// A navigation link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    /// Link id.
    pub key: &'static str,
    /// Link text.
    pub label: String,
    /// Target URL.
    pub href: String,
    /// Disabled links render as plain text.
    pub enabled: bool,
    /// Text rendered before the link.
    pub separator: Option<&'static str>,
}

impl NavLink {
    /// Builds an enabled link to a registered page of `repository`.
    pub fn registered(page: &PageRegistration, repository: &str) -> Self {
        Self {
            key: page.key,
            label: get_string(page.translation_key).to_string(),
            href: PageParameters::new_repository_parameter(repository).href(page.path),
            enabled: true,
            separator: None,
        }
    }
}

/// Disables the link of the page named `page_name`, if it is registered.
pub fn disable_registered_page_link(links: &mut [NavLink], page_name: &str) {
    let Some(key) = get_link_id(page_name) else {
        return;
    };
    if let Some(link) = links.iter_mut().find(|link| link.key == key) {
        link.enabled = false;
    }
}
