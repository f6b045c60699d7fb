//! RSS feed links.

use crate::params::encode_param;
use gitview_storage::{R_HEADS, R_REMOTES, R_TAGS};

/// Path prefix of the feed route.
pub const SYNDICATION_PATH: &str = "/feed/";

/// Link to the feed of `repository`, optionally starting at `object_id`
/// and limited to `length` entries (zero means the default length).
pub fn as_link(base_url: &str, repository: &str, object_id: Option<&str>, length: usize) -> String {
    let mut link = base_url.trim_end_matches('/').to_string();
    link.push_str(SYNDICATION_PATH);
    link.push_str(repository);

    match object_id.filter(|id| !id.is_empty()) {
        Some(id) => {
            link.push_str("?h=");
            link.push_str(&encode_param(id));
            if length > 0 {
                link.push_str(&format!("&l={}", length));
            }
        }
        None if length > 0 => link.push_str(&format!("?l={}", length)),
        None => {}
    }
    link
}

/// Feed title: `repository (id)` with ref prefixes stripped from the id,
/// or just the repository when there is no id.
pub fn get_title(repository: &str, object_id: Option<&str>) -> String {
    let Some(id) = object_id.filter(|id| !id.is_empty()) else {
        return repository.to_string();
    };
    let id = [R_HEADS, R_REMOTES, R_TAGS]
        .iter()
        .find_map(|prefix| id.strip_prefix(prefix))
        .unwrap_or(id);
    format!("{} ({})", repository, id)
}

/// An RSS discovery `<link>` for a page head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryLink {
    /// Feed title.
    pub title: String,
    /// Feed URL.
    pub href: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_link() {
        assert_eq!(as_link("", "a.git", None, 0), "/feed/a.git");
        assert_eq!(as_link("/", "team/a.git", None, 0), "/feed/team/a.git");
        assert_eq!(as_link("", "a.git", None, 10), "/feed/a.git?l=10");
        assert_eq!(as_link("", "a.git", Some("dev"), 0), "/feed/a.git?h=dev");
        assert_eq!(
            as_link("https://git.example.com", "a.git", Some("dev"), 5),
            "https://git.example.com/feed/a.git?h=dev&l=5"
        );
        assert_eq!(
            as_link("", "a.git", Some("feature/a&l=1#x"), 0),
            "/feed/a.git?h=feature%2Fa%26l%3D1%23x"
        );
    }

    #[test]
    fn test_get_title() {
        assert_eq!(get_title("a.git", Some("refs/heads/main")), "a.git (main)");
        assert_eq!(get_title("a.git", Some("refs/remotes/origin/x")), "a.git (origin/x)");
        assert_eq!(get_title("a.git", Some("refs/tags/v1")), "a.git (v1)");
        assert_eq!(get_title("a.git", Some("abc123")), "a.git (abc123)");
        assert_eq!(get_title("a.git", None), "a.git");
    }
}
