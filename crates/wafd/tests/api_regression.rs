//! API regression tests.
//!
//! Drives the full router against an embedded store: deploy, delete,
//! conflicts, missing objects and request decoding.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use waf_api::build_router;
use waf_core::ManagerConfig;
use waf_manager::LifecycleManager;
use waf_store::{EmbeddedStore, ResourceStore};

fn test_router() -> (axum::Router, EmbeddedStore) {
    let store = EmbeddedStore::open_in_memory().unwrap();
    let shared: Arc<dyn ResourceStore> = Arc::new(store.clone());
    let manager = LifecycleManager::new(shared, ManagerConfig::new("tsuru/nginx-modsecurity:1.0"));
    (build_router(manager), store)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

async fn body_json(resp: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn svc1() -> serde_json::Value {
    serde_json::json!({
        "name": "svc1",
        "namespace": "ns",
        "replicas": 2,
        "proxy": "http://backend:80"
    })
}

#[tokio::test]
async fn deploy_creates_all_objects() {
    let (router, store) = test_router();

    let resp = router.oneshot(json_request("POST", "/deploy", svc1())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body = body_json(resp).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["resources"],
        serde_json::json!(["svc1-conf-extra", "svc1-conf", "svc1"])
    );

    assert!(store.get_config_bundle("ns", "svc1-conf-extra").unwrap().is_some());
    let main = store.get_config_bundle("ns", "svc1-conf").unwrap().unwrap();
    assert!(main.data["nginx.conf"].contains("proxy_pass http://backend:80;"));
    let proxy = store.get_proxy_resource("ns", "svc1").unwrap().unwrap();
    assert_eq!(proxy.replicas, 2);
    assert_eq!(proxy.image, "tsuru/nginx-modsecurity:1.0");
}

#[tokio::test]
async fn versioned_route_deploys_too() {
    let (router, store) = test_router();

    let resp = router
        .oneshot(json_request("POST", "/api/v1/deployments", svc1()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(store.list_proxy_resources("ns").unwrap().len(), 1);
}

#[tokio::test]
async fn deploy_then_delete_leaves_nothing() {
    let (router, store) = test_router();

    let resp = router
        .clone()
        .oneshot(json_request("POST", "/deploy", svc1()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = router
        .oneshot(json_request(
            "DELETE",
            "/delete",
            serde_json::json!({"name": "svc1", "namespace": "ns"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(store.list_config_bundles("ns").unwrap().is_empty());
    assert!(store.list_proxy_resources("ns").unwrap().is_empty());
}

#[tokio::test]
async fn delete_by_path() {
    let (router, store) = test_router();
    router
        .clone()
        .oneshot(json_request("POST", "/deploy", svc1()))
        .await
        .unwrap();

    let req = Request::builder()
        .method("DELETE")
        .uri("/api/v1/deployments/ns/svc1")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(store.list_proxy_resources("ns").unwrap().is_empty());
}

#[tokio::test]
async fn second_deploy_reports_extra_bundle_conflict() {
    let (router, _store) = test_router();
    router
        .clone()
        .oneshot(json_request("POST", "/deploy", svc1()))
        .await
        .unwrap();

    let resp = router.oneshot(json_request("POST", "/deploy", svc1())).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body = body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "configmap creation failed: configmap ns/svc1-conf-extra already exists"
    );
}

#[tokio::test]
async fn delete_missing_is_not_found() {
    let (router, _store) = test_router();

    let resp = router
        .oneshot(json_request(
            "DELETE",
            "/delete",
            serde_json::json!({"name": "ghost", "namespace": "ns"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body = body_json(resp).await;
    assert_eq!(
        body["error"],
        "configmap deletion failed: configmap ns/ghost-conf-extra not found"
    );
}

#[tokio::test]
async fn malformed_body_never_reaches_manager() {
    let (router, store) = test_router();

    let req = Request::builder()
        .method("POST")
        .uri("/deploy")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert!(resp.status().is_client_error());
    assert!(store.list_config_bundles("default").unwrap().is_empty());
}

#[tokio::test]
async fn missing_name_rejected() {
    let (router, _store) = test_router();

    let resp = router
        .oneshot(json_request("POST", "/deploy", serde_json::json!({"replicas": 1})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn slashed_namespace_rejected() {
    let (router, store) = test_router();

    let resp = router
        .oneshot(json_request(
            "POST",
            "/deploy",
            serde_json::json!({"name": "x", "namespace": "a/b"}),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(store.list_config_bundles("a").unwrap().is_empty());
}

#[tokio::test]
async fn empty_upstream_deploys() {
    let (router, store) = test_router();

    let resp = router
        .oneshot(json_request("POST", "/deploy", serde_json::json!({"name": "bare"})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let main = store.get_config_bundle("default", "bare-conf").unwrap().unwrap();
    assert!(main.data["nginx.conf"].contains("proxy_pass ;"));
}

#[tokio::test]
async fn healthz() {
    let (router, _store) = test_router();
    let req = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
