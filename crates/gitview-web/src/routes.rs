//! Web route handlers for the gitview front-end.

use askama::Template;
use axum::{
    extract::{Form, Path, Query, State},
    http::{
        header::{CONTENT_TYPE, HOST},
        HeaderMap, StatusCode,
    },
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use gitview_storage::{
    get_blob, get_changed_paths, get_documents, get_files_in_path, get_local_branches,
    get_remote_branches, get_revlog, get_tags, get_ticket_branch, get_tickets, search_revlogs,
    Commit, ObjectId, RefModel, RepoStore, Repository,
};
use gitview_types::{AccessRestriction, ChangeType, RepositoryModel, SearchType, UserModel};
use gitview_utils::trim_short_log;
use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::WebError;
use crate::markdown::{content_type, is_binary, is_markdown, language_class, render_markdown};
use crate::params::PageParameters;
use crate::repository_page::{PageChrome, RepositoryPage};
use crate::search::{SearchFormInput, SEARCH_FORM_ACTION};
use crate::session::{Session, UserStore};
use crate::settings::{MessageProcessor, WebSettings};
use crate::syndication;
use crate::templates::*;
use crate::time::{format_date, format_rfc2822, now, time_ago};
use crate::validation::{error_messages, EditForm};

/// Stylesheet shared by every page.
const STYLESHEET: &str = include_str!("../static/gitview.css");

/// Shared state for web routes.
#[derive(Clone)]
pub struct WebState {
    pub repos: Arc<RepoStore>,
    /// Configured repository models, keyed by repository name.
    pub models: Arc<RwLock<HashMap<String, RepositoryModel>>>,
    pub users: Arc<UserStore>,
    pub settings: Arc<WebSettings>,
    /// Commit message renderer built from the settings.
    pub messages: Arc<MessageProcessor>,
}

impl WebState {
    /// Creates the state, compiling the commit message substitutions.
    pub fn new(repos: Arc<RepoStore>, users: Arc<UserStore>, settings: WebSettings) -> Self {
        let messages = MessageProcessor::new(&settings.commit_message_regex);
        Self {
            repos,
            models: Arc::new(RwLock::new(HashMap::new())),
            users,
            settings: Arc::new(settings),
            messages: Arc::new(messages),
        }
    }

    /// Stores the model of a repository, replacing any previous one.
    pub fn set_repository_model(&self, model: RepositoryModel) {
        self.models.write().insert(model.name.clone(), model);
    }

    /// Returns the model of `name` if the repository exists and `user`
    /// may view it. Repositories without a configured model get an
    /// unrestricted default one.
    pub fn get_repository_model(
        &self,
        user: Option<&UserModel>,
        name: &str,
    ) -> Option<RepositoryModel> {
        let repository = self.repos.get(name).ok()?;
        self.repository_model(user, &repository)
    }

    /// Model of an opened repository if `user` may view it.
    pub fn repository_model(
        &self,
        user: Option<&UserModel>,
        repository: &Repository,
    ) -> Option<RepositoryModel> {
        let mut model = self
            .models
            .read()
            .get(&repository.name)
            .cloned()
            .unwrap_or_else(|| RepositoryModel::new(&repository.name));

        if model.last_change.is_none() {
            model.last_change = gitview_storage::get_commit(repository, None)
                .ok()
                .flatten()
                .map(|commit| commit.commit_time());
        }

        model.is_visible_to(user).then_some(model)
    }

    /// Models of every repository `user` may view, sorted by name.
    pub fn list_repository_models(&self, user: Option<&UserModel>) -> Vec<RepositoryModel> {
        self.repos
            .list()
            .iter()
            .filter_map(|name| self.get_repository_model(user, name))
            .collect()
    }
}

/// Create the web router.
pub fn web_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    WebState: axum::extract::FromRef<S>,
{
    Router::new()
        .route("/", get(index))
        .route("/login", get(login))
        .route("/static/gitview.css", get(stylesheet))
        // Repository pages
        .route("/summary", get(summary))
        .route("/log", get(log))
        .route("/branches", get(branches))
        .route("/tags", get(tags))
        .route("/tree", get(tree))
        .route("/blob", get(blob))
        .route("/raw", get(raw))
        .route("/commit", get(commit))
        .route("/tickets", get(tickets))
        .route("/docs", get(docs))
        .route("/markdown", get(markdown))
        .route("/edit", get(edit_form).post(edit_submit))
        // Search
        .route("/search", get(search))
        .route(SEARCH_FORM_ACTION, post(search_form))
        // Syndication
        .route("/feed/{*repository}", get(feed))
}

/// Query parameters of the feed.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    /// Start object.
    #[serde(default)]
    pub h: Option<String>,
    /// Entry count.
    #[serde(default)]
    pub l: Option<usize>,
}

fn ref_badges(page: &RepositoryPage, refs: &[RefModel]) -> Vec<RefBadge> {
    refs.iter()
        .map(|r| RefBadge {
            name: r.name.clone(),
            href: page.new_commit_parameter(Some(&r.ref_name)).href("/log"),
            kind: if r.is_tag() {
                "tag"
            } else if r.is_remote() {
                "remote"
            } else {
                "branch"
            },
        })
        .collect()
}

fn commit_row(
    page: &RepositoryPage,
    commit: &Commit,
    all_refs: &HashMap<ObjectId, Vec<RefModel>>,
    now: i64,
) -> CommitRow {
    let id = commit.id.to_hex();
    let params = page.new_commit_parameter(Some(&id));
    CommitRow {
        short_id: RepositoryPage::get_short_object_id(&id),
        href: params.href("/commit"),
        tree_href: params.href("/tree"),
        message: trim_short_log(commit.short_message()),
        author_html: page
            .create_person_panel(&commit.author, SearchType::Author)
            .to_string(),
        date: format_date(commit.commit_time()),
        age: time_ago(commit.commit_time(), now),
        refs: all_refs
            .get(&commit.id)
            .map(|refs| ref_badges(page, refs))
            .unwrap_or_default(),
    }
}

fn ref_row(page: &RepositoryPage, r: &RefModel, now: i64) -> RefRow {
    let commit_id = r.commit_id.to_hex();
    let by_name = page.new_commit_parameter(Some(&r.ref_name));
    RefRow {
        name: r.name.clone(),
        short_id: RepositoryPage::get_short_object_id(&commit_id),
        message: trim_short_log(&r.message),
        age: time_ago(r.when, now),
        log_href: by_name.href("/log"),
        tree_href: by_name.href("/tree"),
        commit_href: page.new_commit_parameter(Some(&commit_id)).href("/commit"),
        is_annotated: r.is_annotated,
    }
}

/// Offset of the first commit on a 1-based page.
fn page_offset(page_number: usize, page_size: usize) -> Result<usize, WebError> {
    (page_number - 1)
        .checked_mul(page_size)
        .ok_or_else(|| WebError::BadRequest(format!("Invalid page number {}", page_number)))
}

fn path_not_specified(page: &RepositoryPage) -> WebError {
    WebError::BadRequest(format!("Path not specified for {} page!", page.page_name()))
}

fn file_not_found(page: &RepositoryPage, path: &str, commit: &Commit) -> WebError {
    WebError::NotFound(format!(
        "Failed to find {} at {} in {}",
        path,
        RepositoryPage::get_short_object_id(&commit.id.to_hex()),
        page.repository_name()
    ))
}

/// Repository list.
async fn index(
    State(state): State<WebState>,
    session: Session,
) -> Result<impl IntoResponse, WebError> {
    let now = now();
    let repositories = state
        .list_repository_models(session.user())
        .into_iter()
        .map(|model| RepositoryRow {
            href: PageParameters::new_repository_parameter(&model.name).href("/summary"),
            description: model.description,
            owner: model.owner.unwrap_or_default(),
            last_change: model
                .last_change
                .map(|when| time_ago(when, now))
                .unwrap_or_default(),
            name: model.name,
        })
        .collect();

    let template = IndexTemplate {
        chrome: PageChrome::site(&state, &session, "repositories"),
        repositories,
    };
    Ok(Html(template.render()?))
}

/// Challenges anonymous users for credentials.
async fn login(session: Session) -> Result<impl IntoResponse, WebError> {
    match session.username() {
        Some(username) => {
            tracing::info!(username = %username, "User logged in");
            Ok(Redirect::to("/"))
        }
        None => Err(WebError::Unauthorized("Login required".to_string())),
    }
}

async fn stylesheet() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/css; charset=utf-8")], STYLESHEET)
}

/// Repository summary: metadata, recent commits, branches, tags and the
/// rendered README.
async fn summary(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let mut page = RepositoryPage::open(&state, session, "gb.summary", &params)?;
    page.add_syndication_discovery_link();
    let settings = &state.settings;
    let now = now();

    let (commits, branches, tags, readme_html) = {
        let repo = page.repository()?;
        let all_refs = page.all_refs()?;
        let commits = get_revlog(repo, page.object_id(), 0, settings.summary_commit_count)?
            .iter()
            .map(|commit| commit_row(&page, commit, &all_refs, now))
            .collect();
        let refs_count = Some(settings.summary_refs_count);
        let branches = get_local_branches(repo, refs_count)?
            .iter()
            .map(|r| ref_row(&page, r, now))
            .collect();
        let tags = get_tags(repo, refs_count)?
            .iter()
            .map(|r| ref_row(&page, r, now))
            .collect();

        let mut readme_html = None;
        if let Some(head) = gitview_storage::get_commit(repo, page.object_id())? {
            let readme = get_files_in_path(repo, None, &head)?.into_iter().find(|file| {
                !file.is_tree()
                    && file.name.to_lowercase().starts_with("readme")
                    && is_markdown(&file.name, &settings.markdown_extensions)
            });
            if let Some(readme) = readme {
                if let Some(data) = get_blob(repo, &head, &readme.path)? {
                    readme_html = Some(render_markdown(&String::from_utf8_lossy(&data)));
                }
            }
        }
        (commits, branches, tags, readme_html)
    };

    let model = page.model();
    let template = SummaryTemplate {
        description: model.description.clone(),
        owner: model.owner.clone().unwrap_or_default(),
        last_change: model.last_change.map(format_date).unwrap_or_default(),
        commits,
        branches,
        tags,
        readme_html,
        log_href: page.new_commit_parameter(None).href("/log"),
        branches_href: page.new_repository_parameter().href("/branches"),
        tags_href: page.new_repository_parameter().href("/tags"),
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Paged commit log.
async fn log(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let mut page = RepositoryPage::open(&state, session, "gb.log", &params)?;
    page.add_syndication_discovery_link();
    let page_size = state.settings.log_page_size.max(1);
    let page_number = params.page();
    let now = now();

    let (commits, has_more) = {
        let offset = page_offset(page_number, page_size)?;
        let repo = page.repository()?;
        let all_refs = page.all_refs()?;
        let mut commits = get_revlog(
            repo,
            page.object_id(),
            offset,
            page_size.saturating_add(1),
        )?;
        let has_more = commits.len() > page_size;
        commits.truncate(page_size);
        let rows: Vec<CommitRow> = commits
            .iter()
            .map(|commit| commit_row(&page, commit, &all_refs, now))
            .collect();
        (rows, has_more)
    };

    let base = page.new_commit_parameter(None);
    let template = LogTemplate {
        commits,
        newer_href: (page_number > 1)
            .then(|| base.clone().with_page(page_number - 1).href("/log")),
        older_href: page_number
            .checked_add(1)
            .filter(|_| has_more)
            .map(|next| base.clone().with_page(next).href("/log")),
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Local and remote branches.
async fn branches(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.branches", &params)?;
    let now = now();
    let repo = page.repository()?;
    let branches = get_local_branches(repo, None)?
        .iter()
        .map(|r| ref_row(&page, r, now))
        .collect();
    let remotes = get_remote_branches(repo, None)?
        .iter()
        .map(|r| ref_row(&page, r, now))
        .collect();

    let template = BranchesTemplate {
        branches,
        remotes,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Tags.
async fn tags(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.tags", &params)?;
    let now = now();
    let tags = get_tags(page.repository()?, None)?
        .iter()
        .map(|r| ref_row(&page, r, now))
        .collect();

    let template = TagsTemplate {
        tags,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Directory listing at a commit.
async fn tree(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.tree", &params)?;
    let commit = page.get_commit()?;
    let path = params.path().unwrap_or_default().to_string();
    let commit_id = commit.id.to_hex();

    let files = get_files_in_path(page.repository()?, params.path(), &commit)?
        .into_iter()
        .map(|file| {
            let target = if file.is_tree() { "/tree" } else { "/blob" };
            PathRow {
                href: if file.is_submodule() {
                    String::new()
                } else {
                    page.new_path_parameter(&file.path).href(target)
                },
                mode: file.mode.display(),
                size: if file.is_tree() || file.is_submodule() {
                    String::new()
                } else {
                    file.size.to_string()
                },
                is_tree: file.is_tree(),
                name: file.name,
            }
        })
        .collect();

    let parent_href = (!path.is_empty()).then(|| {
        let parent = path.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("");
        page.new_path_parameter(parent).href("/tree")
    });

    let template = TreeTemplate {
        short_id: RepositoryPage::get_short_object_id(&commit_id),
        commit_href: page.new_commit_parameter(Some(&commit_id)).href("/commit"),
        path,
        parent_href,
        files,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// File viewer.
async fn blob(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.blob", &params)?;
    let path = params.path().ok_or_else(|| path_not_specified(&page))?;
    let commit = page.get_commit()?;
    let data = get_blob(page.repository()?, &commit, path)?
        .ok_or_else(|| file_not_found(&page, path, &commit))?;

    let is_binary = is_binary(&data);
    let template = BlobTemplate {
        short_id: RepositoryPage::get_short_object_id(&commit.id.to_hex()),
        path: path.to_string(),
        raw_href: page.new_path_parameter(path).href("/raw"),
        markdown_href: is_markdown(path, &state.settings.markdown_extensions)
            .then(|| page.new_path_parameter(path).href("/markdown")),
        is_binary,
        content: if is_binary {
            String::new()
        } else {
            String::from_utf8_lossy(&data).into_owned()
        },
        language: language_class(path),
        size: data.len().to_string(),
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Raw file download.
async fn raw(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<Response, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.raw", &params)?;
    let path = params.path().ok_or_else(|| path_not_specified(&page))?;
    let commit = page.get_commit()?;
    let data = get_blob(page.repository()?, &commit, path)?
        .ok_or_else(|| file_not_found(&page, path, &commit))?;

    let content_type = content_type(path, &data);
    Ok(([(CONTENT_TYPE, content_type)], data).into_response())
}

/// Single commit with its changed files.
async fn commit(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let mut page = RepositoryPage::open(&state, session, "gb.commit", &params)?;
    page.add_syndication_discovery_link();
    let commit = page.get_commit()?;
    let id = commit.id.to_hex();
    let parent = commit.first_parent().map(|parent| parent.to_hex());

    let changes = get_changed_paths(page.repository()?, &commit)?
        .into_iter()
        .map(|change| {
            // deleted files only exist in the parent
            let at = match change.change_type {
                ChangeType::Delete => parent.as_deref(),
                _ => Some(id.as_str()),
            };
            ChangeRow {
                href: PageParameters::new_path_parameter(page.repository_name(), at, &change.path)
                    .href("/blob"),
                change: change.change_type.as_str(),
                tooltip: page.change_type_tooltip(change.change_type),
                path: change.path,
            }
        })
        .collect();

    let parents = commit
        .parents
        .iter()
        .map(|parent| {
            let parent = parent.to_hex();
            ParentLink {
                short_id: RepositoryPage::get_short_object_id(&parent),
                href: page.new_commit_parameter(Some(&parent)).href("/commit"),
            }
        })
        .collect();

    let refs = page.refs_for(&commit)?;
    let template = CommitTemplate {
        short_id: RepositoryPage::get_short_object_id(&id),
        tree_href: page.new_commit_parameter(Some(&id)).href("/tree"),
        parents,
        author_html: page
            .create_person_panel(&commit.author, SearchType::Author)
            .to_string(),
        author_date: format_date(commit.author.when),
        committer_html: page
            .create_person_panel(&commit.committer, SearchType::Committer)
            .to_string(),
        committer_date: format_date(commit.committer.when),
        message_html: page.full_text(&commit.message, true),
        refs: ref_badges(&page, &refs),
        changes,
        id,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Commit search results.
async fn search(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.search", &params)?;
    let term = params.search_string().to_string();
    let search_type = params.search_type();
    let page_size = state.settings.log_page_size.max(1);
    let page_number = params.page();
    let now = now();

    tracing::debug!(
        repository = %page.repository_name(),
        term = %term,
        search_type = %search_type,
        "Searching commits"
    );

    let (results, has_more) = {
        let offset = page_offset(page_number, page_size)?;
        let repo = page.repository()?;
        let all_refs = page.all_refs()?;
        let mut commits = search_revlogs(
            repo,
            page.object_id(),
            &term,
            search_type,
            offset,
            page_size.saturating_add(1),
        )?;
        let has_more = commits.len() > page_size;
        commits.truncate(page_size);
        let rows: Vec<CommitRow> = commits
            .iter()
            .map(|commit| commit_row(&page, commit, &all_refs, now))
            .collect();
        (rows, has_more)
    };

    let base = PageParameters::new_search_parameter(
        page.repository_name(),
        page.object_id(),
        &term,
        search_type,
    );
    let template = SearchTemplate {
        search: term,
        search_type: search_type.to_string(),
        results,
        newer_href: (page_number > 1)
            .then(|| base.clone().with_page(page_number - 1).href("/search")),
        older_href: page_number
            .checked_add(1)
            .filter(|_| has_more)
            .map(|next| base.clone().with_page(next).href("/search")),
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Search form submission: redirects to the results page.
async fn search_form(Form(input): Form<SearchFormInput>) -> Redirect {
    Redirect::to(&input.redirect_target())
}

/// Tickets stored on the ticket branch.
async fn tickets(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.tickets", &params)?;
    let repo = page.repository()?;
    let branch = get_ticket_branch(repo)?
        .filter(|_| page.model().use_tickets)
        .ok_or_else(|| {
            WebError::NotFound(format!("No ticket branch in {}", page.repository_name()))
        })?;

    let tickets = get_tickets(repo, &branch)?
        .into_iter()
        .map(|ticket| TicketRow {
            id: ticket.id,
            title: ticket.title,
            state: ticket.state,
            assigned: ticket.assigned.unwrap_or_default(),
            tags: ticket.tags.join(", "),
            date: format_date(ticket.date),
            comments: ticket
                .comments
                .iter()
                .map(|comment| TicketCommentRow {
                    author: comment.author.clone(),
                    date: format_date(comment.date),
                    text_html: page.full_text(&comment.text, true),
                })
                .collect(),
        })
        .collect();

    let template = TicketsTemplate {
        branch: branch.name,
        tickets,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Markdown documents of the repository.
async fn docs(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.docs", &params)?;
    if !page.model().use_docs {
        return Err(WebError::NotFound(format!(
            "Documentation is disabled for {}",
            page.repository_name()
        )));
    }

    let repo = page.repository()?;
    let extensions: Vec<&str> = state
        .settings
        .markdown_extensions
        .iter()
        .map(String::as_str)
        .collect();
    let docs = match gitview_storage::get_commit(repo, page.object_id())? {
        Some(commit) => get_documents(repo, &commit, &extensions)?
            .into_iter()
            .map(|doc| DocRow {
                href: page.new_path_parameter(&doc.path).href("/markdown"),
                size: doc.size.to_string(),
                name: doc.name,
                path: doc.path,
            })
            .collect(),
        None => Vec::new(),
    };

    let template = DocsTemplate {
        docs,
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// A Markdown file rendered as HTML.
async fn markdown(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.markdown", &params)?;
    let path = params.path().ok_or_else(|| path_not_specified(&page))?;
    let commit = page.get_commit()?;
    let data = get_blob(page.repository()?, &commit, path)?
        .ok_or_else(|| file_not_found(&page, path, &commit))?;

    let template = MarkdownTemplate {
        path: path.to_string(),
        raw_href: page.new_path_parameter(path).href("/raw"),
        html: render_markdown(&String::from_utf8_lossy(&data)),
        chrome: page.finish(),
    };
    Ok(Html(template.render()?))
}

/// Only administrators and the repository owner may edit settings.
fn require_edit_access(page: &RepositoryPage) -> Result<(), WebError> {
    let is_owner = page
        .session()
        .username()
        .is_some_and(|username| page.model().is_owner(username));
    if page.show_admin() || is_owner {
        return Ok(());
    }
    let message = format!("Unauthorized access for repository {}", page.repository_name());
    if page.session().is_logged_in() {
        Err(WebError::Forbidden(message))
    } else {
        Err(WebError::Unauthorized(message))
    }
}

fn edit_template(
    page: RepositoryPage,
    model: &RepositoryModel,
    errors: Vec<String>,
) -> EditTemplate {
    EditTemplate {
        action: page.new_repository_parameter().href("/edit"),
        description: model.description.clone(),
        owner: model.owner.clone().unwrap_or_default(),
        use_tickets: model.use_tickets,
        use_docs: model.use_docs,
        restrictions: AccessRestriction::ALL
            .iter()
            .map(|restriction| RestrictionOption {
                name: restriction.as_str(),
                selected: *restriction == model.access_restriction,
            })
            .collect(),
        errors,
        chrome: page.finish(),
    }
}

/// Repository settings form.
async fn edit_form(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
) -> Result<impl IntoResponse, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.edit", &params)?;
    require_edit_access(&page)?;
    let model = page.model().clone();
    let template = edit_template(page, &model, Vec::new());
    Ok(Html(template.render()?))
}

/// Saves repository settings and redirects to the summary.
async fn edit_submit(
    State(state): State<WebState>,
    session: Session,
    Query(params): Query<PageParameters>,
    Form(form): Form<EditForm>,
) -> Result<Response, WebError> {
    let page = RepositoryPage::open(&state, session, "gb.edit", &params)?;
    require_edit_access(&page)?;

    let restriction = match form.validate() {
        Ok(restriction) => restriction,
        Err(errors) => {
            let mut model = page.model().clone();
            model.description = form.description.clone();
            let template = edit_template(page, &model, error_messages(&errors));
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, Html(template.render()?)).into_response());
        }
    };

    let mut model = page.model().clone();
    model.description = form.description.trim().to_string();
    model.owner = form.owner();
    model.use_tickets = form.use_tickets();
    model.use_docs = form.use_docs();
    model.access_restriction = restriction;
    model.last_change = None;

    tracing::info!(
        repository = %model.name,
        user = page.session().username().unwrap_or("anonymous"),
        access_restriction = %model.access_restriction,
        "Updated repository settings"
    );

    let target = page.new_repository_parameter().href("/summary");
    state.set_repository_model(model);
    Ok(Redirect::to(&target).into_response())
}

/// RSS feed of a repository's recent commits.
async fn feed(
    State(state): State<WebState>,
    session: Session,
    Path(repository): Path<String>,
    Query(query): Query<FeedQuery>,
    headers: HeaderMap,
) -> Result<Response, WebError> {
    let params = PageParameters {
        r: Some(repository),
        h: query.h,
        ..Default::default()
    };
    let page = RepositoryPage::open(&state, session, "gb.feed", &params)?;
    let length = query
        .l
        .filter(|l| *l > 0)
        .unwrap_or(state.settings.syndication_entries);
    let base_url = headers
        .get(HOST)
        .and_then(|host| host.to_str().ok())
        .map(|host| format!("http://{}", host))
        .unwrap_or_default();

    let items = get_revlog(page.repository()?, page.object_id(), 0, length)?
        .iter()
        .map(|commit| {
            let id = commit.id.to_hex();
            FeedItem {
                title: commit.short_message().to_string(),
                link: format!(
                    "{}{}",
                    base_url,
                    page.new_commit_parameter(Some(&id)).href("/commit")
                ),
                description: commit.message.clone(),
                author: commit.author.name.clone(),
                pub_date: format_rfc2822(commit.commit_time()),
                guid: id,
            }
        })
        .collect();

    let template = FeedTemplate {
        title: syndication::get_title(page.repository_name(), page.object_id()),
        link: format!(
            "{}{}",
            base_url,
            page.new_repository_parameter().href("/summary")
        ),
        description: page.model().description.clone(),
        items,
    };
    tracing::debug!(repository = %page.repository_name(), length, "Rendered feed");
    Ok((
        [(CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        template.render()?,
    )
        .into_response())
}
