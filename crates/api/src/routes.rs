//! Router and handlers.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::extract::{Path, Request, State};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use flowscope_debug::DebugNodeRegistry;
use http::{HeaderMap, StatusCode};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{Authorizer, DEBUG_WRITE};
use crate::error::ApiError;

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Nodes addressable by the control endpoint.
    pub registry: Arc<DebugNodeRegistry>,
    /// Permission checks.
    pub authorizer: Arc<dyn Authorizer>,
}

impl AppState {
    /// State over `registry`, checking requests with `authorizer`.
    pub fn new(registry: Arc<DebugNodeRegistry>, authorizer: Arc<dyn Authorizer>) -> Self {
        Self {
            registry,
            authorizer,
        }
    }
}

/// Build the application router.
///
/// # Routes
///
/// - `POST /debug/{id}/{state}` -- `state` is `enable` or `disable`
/// - `GET /debug/view/{*path}` -- files under `viewer_dir`, when given
pub fn router(state: AppState, viewer_dir: Option<PathBuf>) -> Router {
    let mut router = Router::new()
        .route("/debug/{id}/{state}", post(set_node_state))
        .with_state(state);

    if let Some(dir) = viewer_dir {
        let assets = Router::new()
            .fallback_service(ServeDir::new(dir))
            .layer(middleware::from_fn(deny_dotfiles));
        router = router.nest_service("/debug/view", assets);
    }

    router.layer(TraceLayer::new_for_http())
}

async fn set_node_state(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((id, node_state)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    state.authorizer.authorize(&headers, DEBUG_WRITE)?;
    let (active, status) = match node_state.as_str() {
        "enable" => (true, StatusCode::OK),
        "disable" => (false, StatusCode::CREATED),
        other => return Err(ApiError::NotFound(format!("unknown state {other:?}"))),
    };
    state.registry.set_active(&id, active)?;
    tracing::info!(node.id = %id, active, "debug node toggled");
    Ok(status)
}

/// Any path segment naming a hidden file is refused.
async fn deny_dotfiles(request: Request, next: Next) -> Response {
    if names_dotfile(request.uri().path()) {
        return StatusCode::FORBIDDEN.into_response();
    }
    next.run(request).await
}

fn names_dotfile(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.starts_with('.')
            || segment
                .get(..3)
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case("%2e"))
    })
}
