//! End-to-end tests for the repository pages.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine};
use gitview_storage::{
    FileMode, GitObject, ObjectId, RepoStore, Repository, Tree, TreeEntry, R_HEADS, R_TAGS,
};
use gitview_types::{AccessRestriction, RepositoryModel};
use gitview_utils::{get_md5, MD5_TYPE};
use gitview_web::{web_routes, UserAccount, UserStore, WebSettings, WebState};
use std::sync::Arc;
use tower::ServiceExt;

const IDENT: &str = "Alice Smith <alice@example.com> 1700000000 +0000";
const LATER: &str = "Bob Jones <bob@example.com> 1700003600 +0000";

fn account(username: &str, password: &str, can_admin: bool) -> UserAccount {
    UserAccount {
        username: username.into(),
        password: password.into(),
        display_name: None,
        email: None,
        can_admin,
        repositories: Vec::new(),
    }
}

/// Commits `tree` on `branch` with the branch head, if any, as parent.
fn commit(
    repo: &Repository,
    branch: &str,
    tree: &ObjectId,
    message: &str,
    ident: &str,
) -> ObjectId {
    let ref_name = format!("{}{}", R_HEADS, branch);
    let parents: Vec<ObjectId> = repo.refs.resolve(&ref_name).into_iter().collect();
    let id = repo
        .objects
        .put(GitObject::commit(tree, &parents, ident, ident, message));
    repo.refs.set(&ref_name, id);
    id
}

/// A ticgit branch holding one open ticket with a comment.
fn add_ticket_branch(repo: &Repository) {
    let empty = repo.objects.put_blob(Vec::new());
    let comment = repo.objects.put_blob(b"Crashes on <start>\n".to_vec());
    let ticket = repo.objects.put(Tree::encode(vec![
        TreeEntry::new(FileMode::Regular, "1700000100_COMMENT_bob", comment),
        TreeEntry::new(FileMode::Regular, "ASSIGNED_alice", empty),
        TreeEntry::new(FileMode::Regular, "TAG_bug", empty),
        TreeEntry::new(FileMode::Regular, "TICKET_ID_abc123", empty),
        TreeEntry::new(FileMode::Regular, "state_open", empty),
    ]));
    let root = repo.objects.put(Tree::encode(vec![TreeEntry::new(
        FileMode::Tree,
        "1700000000_crash-on-startup_1",
        ticket,
    )]));
    commit(repo, "ticgit", &root, "new ticket", IDENT);
}

fn project() -> Repository {
    let repo = Repository::new("project.git");
    let readme = repo.objects.put_blob(b"# Project\n\nHello *world*.".to_vec());
    let main = repo.objects.put_blob(b"fn main() {}\n".to_vec());
    let src = repo
        .objects
        .put(Tree::encode(vec![TreeEntry::new(FileMode::Regular, "main.rs", main)]));
    let first = repo.objects.put(Tree::encode(vec![TreeEntry::new(
        FileMode::Regular,
        "README.md",
        readme,
    )]));
    let second = repo.objects.put(Tree::encode(vec![
        TreeEntry::new(FileMode::Regular, "README.md", readme),
        TreeEntry::new(FileMode::Tree, "src", src),
    ]));
    let initial = commit(&repo, "main", &first, "initial import", IDENT);
    commit(&repo, "main", &second, "add the second commit", LATER);
    repo.refs.set(&format!("{}v1.0", R_TAGS), initial);
    add_ticket_branch(&repo);
    repo
}

fn secret() -> Repository {
    let repo = Repository::new("secret.git");
    let blob = repo.objects.put_blob(b"classified".to_vec());
    let tree = repo
        .objects
        .put(Tree::encode(vec![TreeEntry::new(FileMode::Regular, "notes.txt", blob)]));
    commit(&repo, "main", &tree, "hide things", IDENT);
    repo
}

fn create_state(settings: WebSettings) -> WebState {
    let repos = Arc::new(RepoStore::new());
    repos.insert(project()).unwrap();
    repos.insert(secret()).unwrap();

    let md5_password = format!("{}{}", MD5_TYPE, get_md5("hunter2"));
    let users = Arc::new(UserStore::new([
        account("alice", "wonderland", false),
        account("bob", &md5_password, false),
        account("root", "toor", true),
    ]));

    let state = WebState::new(repos, users, settings);
    state.set_repository_model(
        RepositoryModel::new("project.git")
            .with_description("A public project")
            .with_docs(true),
    );
    state.set_repository_model(
        RepositoryModel::new("secret.git")
            .with_owner("alice")
            .with_access_restriction(AccessRestriction::View),
    );
    state
}

fn create_test_app() -> Router {
    create_app(WebSettings::default())
}

fn create_app(settings: WebSettings) -> Router {
    web_routes().with_state(create_state(settings))
}

/// The test app with tickets switched on for project.git.
fn create_tickets_app() -> Router {
    let state = create_state(WebSettings::default());
    state.set_repository_model(
        RepositoryModel::new("project.git")
            .with_description("A public project")
            .with_docs(true)
            .with_tickets(true),
    );
    web_routes().with_state(state)
}

fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", username, password)))
}

async fn get(app: &Router, uri: &str, auth: Option<(&str, &str)>) -> Response {
    let mut request = Request::builder().method("GET").uri(uri);
    if let Some((username, password)) = auth {
        request = request.header(header::AUTHORIZATION, basic(username, password));
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn post_form(app: &Router, uri: &str, body: &str, auth: Option<(&str, &str)>) -> Response {
    let mut request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some((username, password)) = auth {
        request = request.header(header::AUTHORIZATION, basic(username, password));
    }
    app.clone()
        .oneshot(request.body(Body::from(body.to_string())).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(response: &Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

// ==================== Index ====================

#[tokio::test]
async fn test_index_hides_restricted_repositories() {
    let app = create_test_app();

    let response = get(&app, "/", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("project.git"));
    assert!(html.contains("A public project"));
    assert!(!html.contains("secret.git"));

    let html = body_text(get(&app, "/", Some(("alice", "wonderland"))).await).await;
    assert!(html.contains("secret.git"));
}

#[tokio::test]
async fn test_stylesheet() {
    let app = create_test_app();
    let response = get(&app, "/static/gitview.css", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/css"));
}

// ==================== Page errors ====================

#[tokio::test]
async fn test_missing_repository_parameter() {
    let app = create_test_app();
    let response = get(&app, "/summary", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("Repository not specified for summary!"));
}

#[tokio::test]
async fn test_unknown_repository() {
    let app = create_test_app();
    let response = get(&app, "/log?r=missing.git", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response)
        .await
        .contains("Can not load repository missing.git"));
}

#[tokio::test]
async fn test_restricted_repository_requires_login() {
    let app = create_test_app();

    let response = get(&app, "/summary?r=secret.git", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert!(body_text(response)
        .await
        .contains("Unauthorized access for repository secret.git"));

    let response = get(&app, "/summary?r=secret.git", Some(("bob", "hunter2"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, "/summary?r=secret.git", Some(("alice", "wonderland"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(&app, "/summary?r=secret.git", Some(("root", "toor"))).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_wrong_password_is_anonymous() {
    let app = create_test_app();
    let response = get(&app, "/summary?r=secret.git", Some(("alice", "wrong"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_unknown_commit() {
    let app = create_test_app();
    let response = get(&app, "/commit?r=project.git&h=deadbeef", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Failed to find commit &quot;deadbeef&quot; in project.git for commit page!"));
}

// ==================== Navigation ====================

#[tokio::test]
async fn test_summary_navigation() {
    let app = create_test_app();
    let response = get(&app, "/summary?r=project.git", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    // current page is disabled, the others link
    assert!(html.contains(r#"<span class="disabled">summary</span>"#));
    assert!(html.contains("log?r=project.git"));
    assert!(html.contains("branches?r=project.git"));
    // docs enabled, tickets and edit not
    assert!(html.contains("docs?r=project.git"));
    assert!(!html.contains("tickets?r=project.git"));
    assert!(!html.contains("edit?r=project.git"));
    // search form
    assert!(html.contains(r#"action="/searchform""#));
    assert!(html.contains("Search this repository"));
}

#[tokio::test]
async fn test_owner_sees_edit_link() {
    let app = create_test_app();
    let html = body_text(get(&app, "/log?r=secret.git", Some(("alice", "wonderland"))).await).await;
    assert!(html.contains("edit?r=secret.git"));
    assert!(html.contains(r#"<span class="disabled">log</span>"#));
}

#[tokio::test]
async fn test_admin_links_follow_settings() {
    let app = create_test_app();
    let html = body_text(get(&app, "/summary?r=project.git", Some(("root", "toor"))).await).await;
    assert!(!html.contains("edit?r=project.git"));

    let app = create_app(WebSettings {
        allow_administration: true,
        ..Default::default()
    });
    let html = body_text(get(&app, "/summary?r=project.git", Some(("root", "toor"))).await).await;
    assert!(html.contains("edit?r=project.git"));

    let html = body_text(get(&app, "/summary?r=project.git", None).await).await;
    assert!(!html.contains("edit?r=project.git"));
}

// ==================== Content ====================

#[tokio::test]
async fn test_summary_renders_readme_and_refs() {
    let app = create_test_app();
    let html = body_text(get(&app, "/summary?r=project.git", None).await).await;
    assert!(html.contains("<em>world</em>"));
    assert!(html.contains("add the second commit"));
    assert!(html.contains("v1.0"));
    assert!(html.contains("application/rss+xml"));
}

#[tokio::test]
async fn test_log_lists_history() {
    let app = create_test_app();
    let html = body_text(get(&app, "/log?r=project.git", None).await).await;
    let second = html.find("add the second commit").unwrap();
    let first = html.find("initial import").unwrap();
    assert!(second < first);
}

#[tokio::test]
async fn test_log_paging() {
    let app = create_app(WebSettings {
        log_page_size: 1,
        ..Default::default()
    });
    let html = body_text(get(&app, "/log?r=project.git", None).await).await;
    assert!(html.contains("add the second commit"));
    assert!(!html.contains("initial import"));
    assert!(html.contains("pg=2"));

    let html = body_text(get(&app, "/log?r=project.git&pg=2", None).await).await;
    assert!(html.contains("initial import"));
    assert!(!html.contains("pg=3"));
}

#[tokio::test]
async fn test_page_number_out_of_range() {
    let app = create_test_app();
    for uri in [
        "/log?r=project.git&pg=18446744073709551615",
        "/search?r=project.git&s=second&st=commit&pg=18446744073709551615",
    ] {
        let response = get(&app, uri, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);
        assert!(body_text(response).await.contains("Invalid page number"));
    }

    // past the end is just an empty page
    let response = get(&app, "/log?r=project.git&pg=1000", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(!html.contains("initial import"));
    assert!(html.contains("pg=999"));
}

#[tokio::test]
async fn test_tree_and_blob() {
    let app = create_test_app();
    let html = body_text(get(&app, "/tree?r=project.git", None).await).await;
    assert!(html.contains("README.md"));
    assert!(html.contains(">src<"));

    let response = get(&app, "/blob?r=project.git&f=src/main.rs", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("fn main() {}"));

    let response = get(&app, "/raw?r=project.git&f=src/main.rs", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "fn main() {}\n");
}

#[tokio::test]
async fn test_blob_errors() {
    let app = create_test_app();
    let response = get(&app, "/blob?r=project.git", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response)
        .await
        .contains("Path not specified for blob page!"));

    let response = get(&app, "/blob?r=project.git&f=nope.txt", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_commit_page_lists_changes() {
    let app = create_test_app();
    let html = body_text(get(&app, "/commit?r=project.git", None).await).await;
    assert!(html.contains("src/main.rs"));
    assert!(html.contains(r#"title="addition""#));
    assert!(html.contains("Bob Jones"));
}

#[tokio::test]
async fn test_docs_page() {
    let app = create_test_app();
    let html = body_text(get(&app, "/docs?r=project.git", None).await).await;
    assert!(html.contains("README.md"));
    assert!(html.contains("markdown?r=project.git"));

    let response = get(&app, "/markdown?r=project.git&f=README.md", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("<h1>Project</h1>"));
}

#[tokio::test]
async fn test_docs_link_disabled_on_docs_page() {
    let app = create_test_app();
    let html = body_text(get(&app, "/docs?r=project.git", None).await).await;
    assert!(html.contains(r#"<span class="disabled">docs</span>"#));
    assert!(!html.contains(r#"href="/docs?r=project.git""#));
    assert!(html.contains("summary?r=project.git"));
}

#[tokio::test]
async fn test_tickets_disabled() {
    // the branch exists but the repository does not use tickets
    let app = create_test_app();
    let response = get(&app, "/tickets?r=project.git", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response)
        .await
        .contains("No ticket branch in project.git"));
}

#[tokio::test]
async fn test_tickets_enabled_without_branch() {
    let state = create_state(WebSettings::default());
    state.set_repository_model(
        RepositoryModel::new("secret.git")
            .with_owner("alice")
            .with_access_restriction(AccessRestriction::View)
            .with_tickets(true),
    );
    let app = web_routes().with_state(state);
    let alice = Some(("alice", "wonderland"));

    let html = body_text(get(&app, "/summary?r=secret.git", alice).await).await;
    assert!(!html.contains("tickets?r=secret.git"));

    let response = get(&app, "/tickets?r=secret.git", alice).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tickets_link_with_ticket_branch() {
    let app = create_tickets_app();
    let html = body_text(get(&app, "/summary?r=project.git", None).await).await;
    assert!(html.contains(r#"href="/tickets?r=project.git""#));
    assert!(html.contains("ticgit"));

    let tickets = html.find("tickets?r=project.git").unwrap();
    let docs = html.find("docs?r=project.git").unwrap();
    assert!(tickets < docs);
}

#[tokio::test]
async fn test_tickets_page() {
    let app = create_tickets_app();
    let response = get(&app, "/tickets?r=project.git", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains(r#"<span class="disabled">tickets</span>"#));
    assert!(html.contains("branch: ticgit"));
    assert!(html.contains("crash on startup"));
    assert!(html.contains(r#"<span class="state open">open</span>"#));
    assert!(html.contains("abc123"));
    assert!(html.contains("<td>alice</td>"));
    assert!(html.contains("<td>bug</td>"));
    assert!(html.contains("bob"));
    assert!(html.contains("Crashes on &lt;start&gt;"));
    assert!(!html.contains("<start>"));
}

// ==================== Search ====================

#[tokio::test]
async fn test_search_form_redirects() {
    let app = create_test_app();

    let response = post_form(
        &app,
        "/searchform",
        "r=project.git&search_box=author%3A+alice",
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/search?r=project.git&s=alice&st=author");

    let response = post_form(
        &app,
        "/searchform",
        "r=project.git&search_box=second&search_type=committer",
        None,
    )
    .await;
    assert_eq!(location(&response), "/search?r=project.git&s=second&st=committer");
}

#[tokio::test]
async fn test_search_results() {
    let app = create_test_app();
    let html = body_text(get(&app, "/search?r=project.git&s=second&st=commit", None).await).await;
    assert!(html.contains("add the second commit"));
    assert!(!html.contains("initial import"));

    let html = body_text(get(&app, "/search?r=project.git&s=ALICE&st=author", None).await).await;
    assert!(html.contains("initial import"));
    assert!(!html.contains("add the second commit"));
}

// ==================== Session ====================

#[tokio::test]
async fn test_login() {
    let app = create_test_app();

    let response = get(&app, "/login", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let challenge = response.headers()[header::WWW_AUTHENTICATE].to_str().unwrap();
    assert_eq!(challenge, r#"Basic realm="gitview""#);

    let response = get(&app, "/login", Some(("bob", "hunter2"))).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

// ==================== Edit ====================

#[tokio::test]
async fn test_edit_requires_owner() {
    let app = create_test_app();

    let response = get(&app, "/edit?r=secret.git", Some(("root", "toor"))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&app, "/edit?r=project.git", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/edit?r=secret.git", Some(("alice", "wonderland"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response)
        .await
        .contains(r#"<option value="view" selected>"#));
}

#[tokio::test]
async fn test_edit_updates_model() {
    let app = create_test_app();
    let alice = Some(("alice", "wonderland"));

    let response = post_form(
        &app,
        "/edit?r=secret.git",
        "description=Top+secret&owner=alice&access_restriction=none&use_docs=true",
        alice,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/summary?r=secret.git");

    // now public
    let html = body_text(get(&app, "/summary?r=secret.git", None).await).await;
    assert!(html.contains("Top secret"));
    assert!(html.contains("docs?r=secret.git"));
}

#[tokio::test]
async fn test_edit_rejects_invalid_input() {
    let app = create_test_app();
    let response = post_form(
        &app,
        "/edit?r=secret.git",
        "description=x&owner=alice&access_restriction=everyone",
        Some(("alice", "wonderland")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_text(response)
        .await
        .contains("Unknown access restriction"));
}

// ==================== Syndication ====================

#[tokio::test]
async fn test_feed() {
    let app = create_test_app();
    let response = get(&app, "/feed/project.git", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("application/rss+xml"));
    let xml = body_text(response).await;
    assert!(xml.contains("<title>project.git</title>"));
    assert_eq!(xml.matches("<item>").count(), 2);

    let xml = body_text(get(&app, "/feed/project.git?l=1", None).await).await;
    assert_eq!(xml.matches("<item>").count(), 1);

    let response = get(&app, "/feed/secret.git", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
