//! Catch-all dispatch handler
//!
//! Turns an HTTP request into an `ApiRequest` and hands it to the router.
//! Credentials ride in the query parameters (`email`, `key`, `authToken`),
//! matching the original web client.

use axum::{
    extract::{Path, Query, State},
    http::Method,
    response::{IntoResponse, Response},
    Json,
};
use copydesk_common::auth::Credentials;
use copydesk_common::errors::Result;
use copydesk_common::metrics::RequestMetrics;
use serde_json::Value;
use std::collections::HashMap;

use crate::router::ApiRequest;
use crate::AppState;

/// Dispatch a request with no path segments
pub async fn dispatch_root(
    State(state): State<AppState>,
    method: Method,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response> {
    run(state, method, String::new(), params, None).await
}

/// Dispatch a request with only a context segment
pub async fn dispatch_context(
    State(state): State<AppState>,
    method: Method,
    Path(context): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Response> {
    run(state, method, context, params, body.map(|Json(b)| b)).await
}

/// Dispatch a full `context/action` request
pub async fn dispatch_action(
    State(state): State<AppState>,
    method: Method,
    Path((context, action)): Path<(String, String)>,
    Query(params): Query<HashMap<String, String>>,
    body: Option<Json<Value>>,
) -> Result<Response> {
    let path = format!("{}/{}", context, action);
    run(state, method, path, params, body.map(|Json(b)| b)).await
}

async fn run(
    state: AppState,
    method: Method,
    path: String,
    params: HashMap<String, String>,
    body: Option<Value>,
) -> Result<Response> {
    let metrics = RequestMetrics::start(method.as_str(), &format!("/{}", path));

    let credentials = Credentials {
        email: params.get("email").cloned(),
        key: params.get("key").cloned(),
        auth_token: params.get("authToken").cloned(),
    };

    let request = ApiRequest {
        method: method.as_str().to_uppercase(),
        path,
        params,
        body,
        credentials,
    };

    match state.router.route(request).await {
        Ok(outcome) => {
            metrics.finish(outcome.status());
            Ok(outcome.into_response())
        }
        Err(e) => {
            metrics.finish(e.status_code().as_u16());
            Err(e)
        }
    }
}
