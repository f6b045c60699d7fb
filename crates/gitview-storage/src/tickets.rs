//! Tickets stored on a ticgit branch.
//!
//! Each ticket is a top-level directory named `<epoch>_<title-with-dashes>_<suffix>`
//! whose files encode the ticket fields in their names:
//! `TICKET_ID_<id>`, `state_<state>`, `ASSIGNED_<user>`, `TAG_<tag>` and
//! `<epoch>_COMMENT_<author>` (the comment text is the file content).

use crate::{get_files_in_path, Commit, ObjectType, RefModel, Repository, Result};

const TICKET_ID_PREFIX: &str = "TICKET_ID_";
const STATE_PREFIX: &str = "state_";
const ASSIGNED_PREFIX: &str = "ASSIGNED_";
const TAG_PREFIX: &str = "TAG_";
const COMMENT_MARKER: &str = "_COMMENT_";

/// A comment on a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketComment {
    /// Comment author.
    pub author: String,
    /// Creation time (unix seconds).
    pub date: i64,
    /// Comment body.
    pub text: String,
}

/// A ticket read from the ticket branch.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketModel {
    /// Directory name of the ticket.
    pub name: String,
    /// Human readable title.
    pub title: String,
    /// Creation time (unix seconds), zero when the name carries none.
    pub date: i64,
    /// Ticket id.
    pub id: String,
    /// Current state, e.g. `open` or `resolved`.
    pub state: String,
    /// Assigned user.
    pub assigned: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
    /// Comments, oldest first.
    pub comments: Vec<TicketComment>,
}

impl TicketModel {
    /// Derives date and title from a ticket directory name.
    pub fn from_name(name: &str) -> Self {
        let chunks: Vec<&str> = name.split('_').collect();
        let date = chunks
            .first()
            .filter(|chunk| chunk.len() == 10)
            .and_then(|chunk| chunk.parse().ok())
            .unwrap_or(0);
        let title = chunks
            .get(1)
            .map(|chunk| chunk.replace('-', " "))
            .unwrap_or_else(|| name.to_string());
        Self {
            name: name.to_string(),
            title,
            date,
            ..Default::default()
        }
    }

    fn apply(&mut self, file_name: &str, content: impl FnOnce() -> Result<String>) -> Result<()> {
        if let Some(id) = file_name.strip_prefix(TICKET_ID_PREFIX) {
            self.id = id.to_string();
        } else if let Some(state) = file_name.strip_prefix(STATE_PREFIX) {
            self.state = state.to_string();
        } else if let Some(assigned) = file_name.strip_prefix(ASSIGNED_PREFIX) {
            self.assigned = Some(assigned.to_string());
        } else if let Some(tag) = file_name.strip_prefix(TAG_PREFIX) {
            self.tags.push(tag.to_string());
        } else if let Some((date, author)) = file_name.split_once(COMMENT_MARKER) {
            self.comments.push(TicketComment {
                author: author.to_string(),
                date: date.parse().unwrap_or(0),
                text: content()?,
            });
        }
        Ok(())
    }
}

/// Reads every ticket from the head of `branch`, newest first.
pub fn get_tickets(repo: &Repository, branch: &RefModel) -> Result<Vec<TicketModel>> {
    let commit = Commit::parse(&repo.objects.get(&branch.commit_id)?)?;

    let mut tickets = Vec::new();
    for dir in get_files_in_path(repo, None, &commit)? {
        if !dir.is_tree() {
            continue;
        }
        let mut ticket = TicketModel::from_name(&dir.name);
        for file in get_files_in_path(repo, Some(&dir.path), &commit)? {
            ticket.apply(&file.name, || {
                let object = repo.objects.get(&file.id)?;
                if object.object_type != ObjectType::Blob {
                    return Ok(String::new());
                }
                Ok(String::from_utf8_lossy(&object.data).trim().to_string())
            })?;
        }
        ticket.comments.sort_by_key(|c| c.date);
        ticket.tags.sort();
        tickets.push(ticket);
    }
    tickets.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.name.cmp(&b.name)));

    tracing::debug!(repository = %repo.name, count = tickets.len(), "Loaded tickets");
    Ok(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{get_ticket_branch, FileMode, Tree, TreeEntry};

    const IDENT: &str = "Dev <dev@example.com> 1700000000 +0000";

    fn ticket_dir(repo: &Repository, files: &[(&str, &str)]) -> crate::ObjectId {
        let entries = files
            .iter()
            .map(|(name, content)| {
                let id = repo.objects.put_blob(content.as_bytes().to_vec());
                TreeEntry::new(FileMode::Regular, *name, id)
            })
            .collect();
        repo.objects.put(Tree::encode(entries))
    }

    #[test]
    fn test_name_parsing() {
        let ticket = TicketModel::from_name("1270000000_crash-on-startup_429");
        assert_eq!(ticket.date, 1270000000);
        assert_eq!(ticket.title, "crash on startup");

        let odd = TicketModel::from_name("2010_x");
        assert_eq!(odd.date, 0);
        assert_eq!(odd.title, "x");

        assert_eq!(TicketModel::from_name("plain").title, "plain");
    }

    #[test]
    fn test_get_tickets_from_branch() {
        let repo = Repository::new("tickets.git");
        let first = ticket_dir(
            &repo,
            &[
                ("TICKET_ID_abc123", ""),
                ("state_open", ""),
                ("ASSIGNED_alice", ""),
                ("TAG_ui", ""),
                ("TAG_bug", ""),
                ("1270000200_COMMENT_bob", "Second thought\n"),
                ("1270000100_COMMENT_alice", "First!"),
            ],
        );
        let second = ticket_dir(&repo, &[("TICKET_ID_def456", ""), ("state_resolved", "")]);
        let root = repo.objects.put(Tree::encode(vec![
            TreeEntry::new(FileMode::Tree, "1270000000_button-misaligned_1", first),
            TreeEntry::new(FileMode::Tree, "1280000000_docs-typo_2", second),
            TreeEntry::new(FileMode::Regular, "README", repo.objects.put_blob(b"x".to_vec())),
        ]));
        let commit = repo.commit(&root, "tickets", IDENT, IDENT).unwrap();
        repo.refs.set("refs/heads/ticgit", commit);

        let branch = get_ticket_branch(&repo).unwrap().unwrap();
        let tickets = get_tickets(&repo, &branch).unwrap();
        assert_eq!(tickets.len(), 2);

        assert_eq!(tickets[0].title, "docs typo");
        assert_eq!(tickets[0].state, "resolved");

        let t = &tickets[1];
        assert_eq!(t.id, "abc123");
        assert_eq!(t.state, "open");
        assert_eq!(t.assigned.as_deref(), Some("alice"));
        assert_eq!(t.tags, vec!["bug", "ui"]);
        assert_eq!(t.comments.len(), 2);
        assert_eq!(t.comments[0].author, "alice");
        assert_eq!(t.comments[0].text, "First!");
        assert_eq!(t.comments[1].text, "Second thought");
    }
}
