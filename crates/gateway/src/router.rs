//! Two-level request router
//!
//! Requests address the API as `context/action` (e.g. `article/create`).
//! A static dispatch table declares which actions exist per method and
//! context; handlers are invoked lazily, only for the single matched
//! entry. Every context except `authentication` sits behind the
//! authentication gate, and a failed check returns a distinguished
//! unauthorized marker rather than an error.

use axum::response::{IntoResponse, Response};
use axum::Json;
use copydesk_common::ams::{Ams, ApiResponse};
use copydesk_common::auth::{Authenticator, Credentials};
use copydesk_common::errors::{AppError, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// The dispatch table: method, context, wired actions.
///
/// GET `article` is declared without actions; routing it reports that the
/// context has none.
const ROUTES: &[(&str, &str, &[&str])] = &[
    ("GET", "articles", &["list"]),
    ("GET", "editors", &["list", "by-email"]),
    ("GET", "authentication", &["authenticate"]),
    ("GET", "article", &[]),
    ("POST", "article", &["create", "update", "delete"]),
    ("POST", "editor", &["create", "update"]),
];

/// A parsed inbound request
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// Uppercased HTTP method
    pub method: String,
    /// Path with the leading slash stripped, e.g. `article/create`
    pub path: String,
    pub params: HashMap<String, String>,
    pub body: Option<Value>,
    pub credentials: Credentials,
}

impl ApiRequest {
    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    fn body<T: DeserializeOwned>(&self) -> Result<T> {
        let body = self.body.clone().ok_or_else(|| AppError::Validation {
            message: "Request body missing.".into(),
            field: None,
        })?;
        serde_json::from_value(body).map_err(|e| AppError::Validation {
            message: format!("Invalid request body: {}", e),
            field: None,
        })
    }
}

/// Result of routing a request
#[derive(Debug)]
pub enum RouteOutcome {
    /// No path segments were supplied
    Empty,
    /// Authentication failed; a marker, not an error
    Unauthorized,
    /// The matched handler's response
    Response(ApiResponse),
}

impl IntoResponse for RouteOutcome {
    fn into_response(self) -> Response {
        match self {
            RouteOutcome::Empty => Json(json!({})).into_response(),
            RouteOutcome::Unauthorized => (
                axum::http::StatusCode::UNAUTHORIZED,
                Json(json!("unauth")),
            )
                .into_response(),
            RouteOutcome::Response(response) => Json(response).into_response(),
        }
    }
}

impl RouteOutcome {
    /// HTTP status this outcome maps to
    pub fn status(&self) -> u16 {
        match self {
            RouteOutcome::Unauthorized => 401,
            _ => 200,
        }
    }
}

/// Routes requests to the action layer behind the authentication gate
pub struct Router {
    ams: Arc<Ams>,
    authenticator: Arc<Authenticator>,
}

impl Router {
    pub fn new(ams: Arc<Ams>, authenticator: Arc<Authenticator>) -> Self {
        Self { ams, authenticator }
    }

    /// Route a request.
    ///
    /// Bad paths are hard routing errors; everything the action layer
    /// reports comes back as a response or a structured error.
    pub async fn route(&self, request: ApiRequest) -> Result<RouteOutcome> {
        let segments: Vec<&str> = request
            .path
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        if segments.is_empty() {
            return Ok(RouteOutcome::Empty);
        }

        let context = segments[0];
        let action = segments.get(1).copied().unwrap_or_default();

        let actions = ROUTES
            .iter()
            .find(|(m, c, _)| *m == request.method && *c == context)
            .map(|(_, _, actions)| *actions)
            .ok_or_else(|| AppError::UnknownContext {
                context: context.to_string(),
            })?;

        if actions.is_empty() {
            return Err(AppError::ContextHasNoActions {
                context: context.to_string(),
            });
        }

        if !actions.contains(&action) {
            return Err(AppError::UnknownAction {
                context: context.to_string(),
                action: action.to_string(),
            });
        }

        // The authentication context bypasses the gate and answers with
        // the check's outcome directly.
        if context == "authentication" {
            let outcome = self.authenticator.authenticate(&request.credentials).await?;
            return Ok(RouteOutcome::Response(ApiResponse::of(outcome)?));
        }

        let outcome = self.authenticator.authenticate(&request.credentials).await?;
        if !outcome.authenticated {
            return Ok(RouteOutcome::Unauthorized);
        }

        // Authenticated tracks; only the matched handler runs
        let response = match (request.method.as_str(), context, action) {
            ("GET", "articles", "list") => {
                ApiResponse::of(self.ams.get_all_articles(request.param("q")).await?)?
            }
            ("GET", "editors", "list") => {
                ApiResponse::of(self.ams.get_all_editors(request.param("q")).await?)?
            }
            ("GET", "editors", "by-email") => {
                let email = request.param("email").ok_or_else(|| AppError::MissingField {
                    field: "email".into(),
                })?;
                ApiResponse::of(self.ams.get_editor_by_email(email).await?)?
            }
            ("POST", "article", "create") => self.ams.create_article(request.body()?).await?,
            ("POST", "article", "update") => self.ams.update_article(request.body()?).await?,
            ("POST", "article", "delete") => self.ams.delete_article(request.body()?).await?,
            ("POST", "editor", "create") => self.ams.create_editor(request.body()?).await?,
            ("POST", "editor", "update") => self.ams.update_editor(request.body()?).await?,
            (_, context, action) => {
                return Err(AppError::UnknownAction {
                    context: context.to_string(),
                    action: action.to_string(),
                })
            }
        };

        Ok(RouteOutcome::Response(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use copydesk_common::auth::hash_key;
    use copydesk_common::notify::MemoryNotifier;
    use copydesk_common::store::{tables, MemoryStore};

    struct Harness {
        store: Arc<MemoryStore>,
        router: Router,
    }

    async fn harness() -> Harness {
        let store = Arc::new(MemoryStore::new());
        store
            .seed(
                tables::KEYS,
                vec![vec!["ed@example.com".into(), hash_key("hunter2")]],
            )
            .await;

        let notifier = Arc::new(MemoryNotifier::new());
        let ams = Arc::new(Ams::new(store.clone(), notifier));
        let authenticator = Arc::new(Authenticator::new(store.clone(), 30));

        Harness {
            store,
            router: Router::new(ams, authenticator),
        }
    }

    fn valid_credentials() -> Credentials {
        Credentials {
            email: Some("ed@example.com".into()),
            key: Some("hunter2".into()),
            auth_token: None,
        }
    }

    fn create_body() -> Value {
        json!({
            "article": {
                "title": "Gene Editing in Wheat",
                "subject": "Biology",
                "type": "Original Research"
            },
            "author": { "name": "Ann", "email": "ann@example.com" },
            "data": { "document": "ref" }
        })
    }

    fn request(method: &str, path: &str, credentials: Credentials, body: Option<Value>) -> ApiRequest {
        ApiRequest {
            method: method.to_string(),
            path: path.to_string(),
            params: HashMap::new(),
            body,
            credentials,
        }
    }

    #[tokio::test]
    async fn test_empty_path_yields_empty_outcome() {
        let h = harness().await;
        let outcome = h
            .router
            .route(request("GET", "", Credentials::default(), None))
            .await
            .unwrap();
        assert!(matches!(outcome, RouteOutcome::Empty));
    }

    #[tokio::test]
    async fn test_unknown_context_is_a_routing_error() {
        let h = harness().await;
        let err = h
            .router
            .route(request("GET", "nonexistent/list", valid_credentials(), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownContext { .. }));
        assert!(err.to_string().contains("nonexistent"));
    }

    #[tokio::test]
    async fn test_context_without_actions() {
        let h = harness().await;
        let err = h
            .router
            .route(request("GET", "article/info", valid_credentials(), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ContextHasNoActions { .. }));
    }

    #[tokio::test]
    async fn test_unknown_action_names_context_and_action() {
        let h = harness().await;
        let err = h
            .router
            .route(request("POST", "article/archive", valid_credentials(), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnknownAction { .. }));
        let message = err.to_string();
        assert!(message.contains("article"));
        assert!(message.contains("archive"));
    }

    #[tokio::test]
    async fn test_invalid_credentials_return_unauthorized_marker() {
        let h = harness().await;

        let bad = Credentials {
            email: Some("ed@example.com".into()),
            key: Some("wrong".into()),
            auth_token: None,
        };
        let outcome = h
            .router
            .route(request("POST", "article/create", bad, Some(create_body())))
            .await
            .unwrap();

        assert!(matches!(outcome, RouteOutcome::Unauthorized));
        // The create handler never ran
        assert_eq!(h.store.row_count(tables::ARTICLES).await, 0);
    }

    #[tokio::test]
    async fn test_authentication_context_bypasses_gate() {
        let h = harness().await;

        let bad = Credentials {
            email: Some("ed@example.com".into()),
            key: Some("wrong".into()),
            auth_token: None,
        };
        let outcome = h
            .router
            .route(request("GET", "authentication/authenticate", bad, None))
            .await
            .unwrap();

        // Not the unauthorized marker: the check's outcome is the response
        let RouteOutcome::Response(response) = outcome else {
            panic!("expected a response outcome");
        };
        assert_eq!(response.message["authenticated"], json!(false));
    }

    #[tokio::test]
    async fn test_authenticated_create_dispatches() {
        let h = harness().await;

        let outcome = h
            .router
            .route(request(
                "POST",
                "article/create",
                valid_credentials(),
                Some(create_body()),
            ))
            .await
            .unwrap();

        assert!(matches!(outcome, RouteOutcome::Response(_)));
        assert_eq!(h.store.row_count(tables::ARTICLES).await, 1);
    }

    #[tokio::test]
    async fn test_missing_body_is_a_validation_error() {
        let h = harness().await;

        let err = h
            .router
            .route(request("POST", "article/create", valid_credentials(), None))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { .. }));
        assert!(err.to_string().contains("Request body missing."));
    }

    #[tokio::test]
    async fn test_get_editor_by_email_route() {
        let h = harness().await;
        h.store
            .seed(
                tables::EDITORS,
                vec![vec!["Ed".into(), "ed@example.com".into()]],
            )
            .await;

        let mut req = request("GET", "editors/by-email", valid_credentials(), None);
        req.params
            .insert("email".into(), "ed@example.com".into());

        let outcome = h.router.route(req).await.unwrap();
        let RouteOutcome::Response(response) = outcome else {
            panic!("expected a response outcome");
        };
        assert_eq!(response.message["name"], json!("Ed"));
    }
}
