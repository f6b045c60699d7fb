//! The repository search form.

use gitview_types::SearchType;
use serde::Deserialize;

use crate::messages::get_string;
use crate::params::PageParameters;

/// Route handling search form submissions.
pub const SEARCH_FORM_ACTION: &str = "/searchform";

/// State of the search form rendered on every repository page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchForm {
    /// Repository searched.
    pub repository: String,
    /// Initial search box content.
    pub search_box: String,
    /// Initially selected type.
    pub search_type: SearchType,
    /// Show the type selector.
    pub show_type_selection: bool,
}

impl SearchForm {
    /// An empty form for `repository`.
    pub fn new(repository: &str, show_type_selection: bool) -> Self {
        Self {
            repository: repository.to_string(),
            search_box: String::new(),
            search_type: SearchType::Commit,
            show_type_selection,
        }
    }

    /// Selectable search types, in display order.
    pub fn search_types(&self) -> &'static [SearchType] {
        &SearchType::ALL
    }

    /// Tooltip of the type selector.
    pub fn search_type_tooltip(&self) -> &'static str {
        get_string("gb.searchTypeTooltip")
    }

    /// Tooltip of the search box.
    pub fn search_tooltip(&self) -> &'static str {
        get_string("gb.searchTooltip")
    }

    /// Placeholder of the search box.
    pub fn placeholder(&self) -> &'static str {
        get_string("gb.search")
    }

    /// Form action URL.
    pub fn action(&self) -> &'static str {
        SEARCH_FORM_ACTION
    }
}

/// A submitted search form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchFormInput {
    /// Repository name.
    #[serde(default)]
    pub r: String,
    /// Search box content.
    #[serde(default)]
    pub search_box: String,
    /// Selected type; `commit` when absent.
    #[serde(default)]
    pub search_type: Option<String>,
}

/// Extracts a `type:` prefix from the search box.
///
/// The first type whose lowercase name followed by `:` prefixes the
/// lowercased input wins; the prefix is removed and the rest trimmed.
/// Otherwise the input and `selected` type are returned unchanged.
pub fn parse_search_input(input: &str, selected: SearchType) -> (SearchType, String) {
    for search_type in SearchType::ALL {
        let prefix = format!("{}:", search_type.as_str());
        let matches = input
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&prefix));
        if matches {
            return (search_type, input[prefix.len()..].trim().to_string());
        }
    }
    (selected, input.to_string())
}

impl SearchFormInput {
    /// Parses the submission and returns the search page URL to redirect to.
    pub fn redirect_target(&self) -> String {
        let selected = self
            .search_type
            .as_deref()
            .and_then(SearchType::parse)
            .unwrap_or_default();
        let (search_type, search) = parse_search_input(&self.search_box, selected);
        PageParameters::new_search_parameter(self.r.trim(), None, &search, search_type)
            .href("/search")
    }
}
