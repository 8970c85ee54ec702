//! Router behaviour over in-process requests.

use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use flowscope_api::{AllowAll, AppState, Authorizer, DEBUG_WRITE, TokenAuthorizer, router};
use flowscope_core::NodeId;
use flowscope_debug::{
    CommsMessage, DebugNode, DebugNodeConfig, DebugNodeRegistry, DebugPublisher, DebugSettings,
};
use flowscope_telemetry::{EventBus, MetricsRegistry};
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tower::ServiceExt;

fn registry() -> Arc<DebugNodeRegistry> {
    let metrics = MetricsRegistry::new();
    let bus = Arc::new(EventBus::<CommsMessage>::new(4));
    let publisher = Arc::new(DebugPublisher::new(DebugSettings::default(), bus, &metrics));
    let registry = Arc::new(DebugNodeRegistry::new(&metrics));
    let config = DebugNodeConfig::new(NodeId::new("n1").unwrap());
    registry
        .register(Arc::new(DebugNode::new(config, publisher)))
        .unwrap();
    registry
}

fn app(registry: Arc<DebugNodeRegistry>, authorizer: Arc<dyn Authorizer>, viewer: Option<PathBuf>) -> Router {
    router(AppState::new(registry, authorizer), viewer)
}

fn post(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn enable_and_disable_toggle_the_node() {
    let registry = registry();
    let app = app(Arc::clone(&registry), Arc::new(AllowAll), None);

    let response = app.clone().oneshot(post("/debug/n1/disable", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(!registry.get("n1").unwrap().is_active());

    let response = app.oneshot(post("/debug/n1/enable", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(registry.get("n1").unwrap().is_active());
}

#[rstest]
#[case("/debug/ghost/enable")]
#[case("/debug/n1/toggle")]
#[tokio::test]
async fn unknown_node_or_state_is_not_found(#[case] uri: &str) {
    let response = app(registry(), Arc::new(AllowAll), None)
        .oneshot(post(uri, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[rstest]
#[case(None, StatusCode::UNAUTHORIZED)]
#[case(Some("stranger"), StatusCode::UNAUTHORIZED)]
#[case(Some("reader"), StatusCode::FORBIDDEN)]
#[case(Some("writer"), StatusCode::CREATED)]
#[tokio::test]
async fn control_requires_debug_write(#[case] token: Option<&str>, #[case] expected: StatusCode) {
    let authorizer = TokenAuthorizer::new([
        ("writer".to_owned(), vec![DEBUG_WRITE.to_owned()]),
        ("reader".to_owned(), vec!["debug.read".to_owned()]),
    ]);
    let registry = registry();
    let response = app(Arc::clone(&registry), Arc::new(authorizer), None)
        .oneshot(post("/debug/n1/disable", token))
        .await
        .unwrap();
    assert_eq!(response.status(), expected);
    assert_eq!(registry.get("n1").unwrap().is_active(), expected != StatusCode::CREATED);
}

#[tokio::test]
async fn error_body_is_json() {
    let response = app(registry(), Arc::new(AllowAll), None)
        .oneshot(post("/debug/ghost/enable", None))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().contains("ghost"));
}

#[tokio::test]
async fn viewer_serves_files_and_denies_dotfiles() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("debug.js"), "console.log(1)").unwrap();
    std::fs::write(dir.path().join(".secret"), "token").unwrap();
    let app = app(registry(), Arc::new(AllowAll), Some(dir.path().to_path_buf()));

    let response = app.clone().oneshot(get("/debug/view/debug.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"console.log(1)");

    let response = app.clone().oneshot(get("/debug/view/.secret")).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.oneshot(get("/debug/view/missing.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn viewer_is_absent_without_a_directory() {
    let response = app(registry(), Arc::new(AllowAll), None)
        .oneshot(get("/debug/view/debug.js"))
        .await
        .unwrap();
    // Only the POST control route matches the path.
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
