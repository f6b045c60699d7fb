//! Error types for the web front-end.

use axum::{
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use gitview_storage::StorageError;
use gitview_utils::escape_for_html;
use thiserror::Error;

/// Realm announced in Basic authentication challenges.
pub const AUTH_REALM: &str = "gitview";

/// Web front-end errors. Messages are shown to the user.
#[derive(Debug, Error)]
pub enum WebError {
    /// The request is missing a parameter or is malformed.
    #[error("{0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// The current user may not see the resource; logging in may help.
    #[error("{0}")]
    Unauthorized(String),

    /// The current user may not perform the action.
    #[error("{0}")]
    Forbidden(String),

    /// Template rendering error.
    #[error("template error: {0}")]
    Template(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WebError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            WebError::Forbidden(_) => StatusCode::FORBIDDEN,
            WebError::Template(_) | WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Error - gitview</title>
    <link rel="stylesheet" href="/static/gitview.css">
</head>
<body>
    <div class="error-page">
        <h1>{}</h1>
        <p class="error-message">{}</p>
        <a href="/">Back to repositories</a>
    </div>
</body>
</html>"#,
            status.as_u16(),
            escape_for_html(&self.to_string(), false)
        );

        if status == StatusCode::UNAUTHORIZED {
            let challenge = format!("Basic realm=\"{}\"", AUTH_REALM);
            return (status, [(header::WWW_AUTHENTICATE, challenge)], Html(html)).into_response();
        }
        (status, Html(html)).into_response()
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        WebError::Template(err.to_string())
    }
}

impl From<StorageError> for WebError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::ObjectNotFound(id) => WebError::NotFound(format!("Object {} not found", id)),
            StorageError::RepoNotFound(name) => {
                WebError::NotFound(format!("Can not load repository {}", name))
            }
            StorageError::NotFound(what) => WebError::NotFound(format!("{} not found", what)),
            other => WebError::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(WebError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(WebError::Unauthorized("x".into()).status(), StatusCode::UNAUTHORIZED);
        assert_eq!(WebError::Forbidden("x".into()).status(), StatusCode::FORBIDDEN);
        assert_eq!(
            WebError::Template("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_message_is_user_text() {
        let err = WebError::BadRequest("Repository not specified for log!".into());
        assert_eq!(err.to_string(), "Repository not specified for log!");
    }

    #[test]
    fn test_storage_error_mapping() {
        let err: WebError = StorageError::RepoNotFound("a.git".into()).into();
        assert!(matches!(err, WebError::NotFound(ref m) if m == "Can not load repository a.git"));

        let err: WebError = StorageError::InvalidObject("bad".into()).into();
        assert!(matches!(err, WebError::Internal(_)));
    }

    #[test]
    fn test_unauthorized_challenges() {
        let response = WebError::Unauthorized("no".into()).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    }
}
