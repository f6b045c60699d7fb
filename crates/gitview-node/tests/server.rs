//! End-to-end tests for the assembled node router.

use axum::{body::Body, http::Request, Router};
use gitview_node::config::NodeConfig;
use gitview_node::observability::REQUEST_ID_HEADER;
use gitview_node::{bootstrap, build_router};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use gitview_storage::{FileMode, GitObject, ObjectId, Tree, TreeEntry};
use gitview_types::{AccessRestriction, RepositoryModel};
use gitview_web::UserAccount;
use serde_json::Value;
use std::fs;
use std::io::Write;
use std::path::Path;
use tower::ServiceExt;

const IDENT: &str = "Dev <dev@example.com> 1700000000 +0000";

fn write_loose(repo_dir: &Path, object: &GitObject) {
    let hex = object.id.to_hex();
    let dir = repo_dir.join("objects").join(&hex[..2]);
    fs::create_dir_all(&dir).unwrap();

    let header = format!("{} {}\0", object.object_type.as_str(), object.data.len());
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(header.as_bytes()).unwrap();
    encoder.write_all(&object.data).unwrap();
    fs::write(dir.join(&hex[2..]), encoder.finish().unwrap()).unwrap();
}

/// Commits a README containing `message` on `main`, on top of `parent`.
fn write_commit(repo_dir: &Path, message: &str, parent: Option<ObjectId>) -> ObjectId {
    let blob = GitObject::blob(format!("{}\n", message).into_bytes());
    let tree = Tree::encode(vec![TreeEntry::new(FileMode::Regular, "README", blob.id)]);
    let parents: Vec<ObjectId> = parent.into_iter().collect();
    let commit = GitObject::commit(&tree.id, &parents, IDENT, IDENT, message);
    for object in [&blob, &tree, &commit] {
        write_loose(repo_dir, object);
    }
    fs::write(
        repo_dir.join("refs/heads/main"),
        format!("{}\n", commit.id.to_hex()),
    )
    .unwrap();
    commit.id
}

/// Writes a bare repository with one commit on `main`.
fn write_repository(base: &Path, name: &str, message: &str) -> ObjectId {
    let repo_dir = base.join(name);
    fs::create_dir_all(repo_dir.join("refs/heads")).unwrap();
    fs::create_dir_all(repo_dir.join("objects")).unwrap();
    fs::write(repo_dir.join("HEAD"), "ref: refs/heads/main\n").unwrap();
    write_commit(&repo_dir, message, None)
}

fn create_config(base: &Path) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.repositories.base_dir = base.to_path_buf();
    config.repositories.models = vec![RepositoryModel::new("team/private.git")
        .with_owner("alice")
        .with_access_restriction(AccessRestriction::View)];
    config.users = vec![UserAccount {
        username: "alice".into(),
        password: "secret".into(),
        display_name: Some("Alice".into()),
        email: None,
        can_admin: false,
        repositories: Vec::new(),
    }];
    config
}

fn create_test_app(base: &Path) -> Router {
    write_repository(base, "public.git", "hello from public");
    write_repository(base, "team/private.git", "hello from private");
    build_router(bootstrap(&create_config(base)).unwrap())
}

async fn get(app: &Router, uri: &str) -> axum::response::Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_reports_loaded_repositories() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let response = get(&app, "/health").await;
    assert_eq!(response.status(), 200);
    let health: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["repositories"], 2);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(REQUEST_ID_HEADER, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "req-42");

    let response = get(&app, "/health").await;
    let generated = response.headers()[REQUEST_ID_HEADER].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

#[tokio::test]
async fn test_serves_repositories_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());

    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("public.git"));
    assert!(!html.contains("team/private.git"));

    let response = get(&app, "/log?r=public.git").await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("hello from public"));

    let response = get(&app, "/raw?r=public.git&f=README").await;
    assert_eq!(body_text(response).await, "hello from public\n");

    let response = get(&app, "/summary?r=team%2Fprivate.git").await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_bootstrap_requires_base_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = create_config(&dir.path().join("missing"));
    assert!(bootstrap(&config).is_err());
}

#[tokio::test]
async fn test_follows_repositories_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_test_app(dir.path());
    let public = dir.path().join("public.git");

    let html = body_text(get(&app, "/log?r=public.git").await).await;
    assert!(!html.contains("pushed after start"));

    // a push after start-up
    let head = fs::read_to_string(public.join("refs/heads/main")).unwrap();
    let head = ObjectId::from_hex(head.trim()).unwrap();
    write_commit(&public, "pushed after start", Some(head));

    let html = body_text(get(&app, "/log?r=public.git").await).await;
    assert!(html.contains("pushed after start"));
    assert!(html.contains("hello from public"));

    // a repository created after start-up
    write_repository(dir.path(), "fresh.git", "brand new");
    let html = body_text(get(&app, "/").await).await;
    assert!(html.contains("fresh.git"));
    let response = get(&app, "/summary?r=fresh.git").await;
    assert_eq!(response.status(), 200);
    assert!(body_text(response).await.contains("brand new"));
}
