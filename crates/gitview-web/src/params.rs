//! Page parameters carried in query strings.
//!
//! `r` repository, `h` object id, `f` path, `s` search term,
//! `st` search type and `pg` page number.

use gitview_types::SearchType;
use gitview_utils::encode_url;
use serde::Deserialize;

/// Query parameters shared by the repository pages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageParameters {
    /// Repository name.
    #[serde(default)]
    pub r: Option<String>,
    /// Object id or ref name.
    #[serde(default)]
    pub h: Option<String>,
    /// Path inside the repository.
    #[serde(default)]
    pub f: Option<String>,
    /// Search term.
    #[serde(default)]
    pub s: Option<String>,
    /// Search type.
    #[serde(default)]
    pub st: Option<String>,
    /// Page number, starting at 1.
    #[serde(default)]
    pub pg: Option<usize>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl PageParameters {
    /// Repository name, empty when missing.
    pub fn repository_name(&self) -> &str {
        non_empty(&self.r).unwrap_or_default()
    }

    /// Object id, if given.
    pub fn object(&self) -> Option<&str> {
        non_empty(&self.h)
    }

    /// Path, if given.
    pub fn path(&self) -> Option<&str> {
        non_empty(&self.f).map(|p| p.trim_matches('/'))
    }

    /// Search term, empty when missing.
    pub fn search_string(&self) -> &str {
        non_empty(&self.s).unwrap_or_default()
    }

    /// Search type, `commit` when missing or unknown.
    pub fn search_type(&self) -> SearchType {
        non_empty(&self.st)
            .and_then(SearchType::parse)
            .unwrap_or_default()
    }

    /// Page number, at least 1.
    pub fn page(&self) -> usize {
        self.pg.unwrap_or(1).max(1)
    }

    /// Parameters naming a repository.
    pub fn new_repository_parameter(repository: &str) -> Self {
        Self {
            r: Some(repository.to_string()),
            ..Default::default()
        }
    }

    /// Parameters naming an object in a repository.
    pub fn new_object_parameter(repository: &str, object_id: Option<&str>) -> Self {
        Self {
            h: object_id.filter(|id| !id.is_empty()).map(str::to_string),
            ..Self::new_repository_parameter(repository)
        }
    }

    /// Parameters naming a path at an object in a repository.
    pub fn new_path_parameter(repository: &str, object_id: Option<&str>, path: &str) -> Self {
        Self {
            f: Some(path.to_string()).filter(|p| !p.is_empty()),
            ..Self::new_object_parameter(repository, object_id)
        }
    }

    /// Parameters for a search.
    pub fn new_search_parameter(
        repository: &str,
        object_id: Option<&str>,
        search: &str,
        search_type: SearchType,
    ) -> Self {
        Self {
            s: Some(search.to_string()),
            st: Some(search_type.as_str().to_string()),
            ..Self::new_object_parameter(repository, object_id)
        }
    }

    /// Sets the page number.
    pub fn with_page(mut self, page: usize) -> Self {
        self.pg = Some(page);
        self
    }

    /// Encodes the parameters as a query string without the leading `?`.
    pub fn to_query(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in [
            ("r", &self.r),
            ("h", &self.h),
            ("f", &self.f),
            ("s", &self.s),
            ("st", &self.st),
        ] {
            if let Some(value) = value {
                pairs.push(format!("{}={}", key, encode_param(value)));
            }
        }
        if let Some(page) = self.pg {
            pairs.push(format!("pg={}", page));
        }
        pairs.join("&")
    }

    /// Link to `path` carrying these parameters.
    pub fn href(&self, path: &str) -> String {
        let query = self.to_query();
        if query.is_empty() {
            path.to_string()
        } else {
            format!("{}?{}", path, query)
        }
    }
}

/// Escapes a query value: the query delimiters first, then slashes and spaces.
pub fn encode_param(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '&' => escaped.push_str("%26"),
            '#' => escaped.push_str("%23"),
            '+' => escaped.push_str("%2B"),
            '=' => escaped.push_str("%3D"),
            '?' => escaped.push_str("%3F"),
            _ => escaped.push(c),
        }
    }
    encode_url(&escaped)
}
