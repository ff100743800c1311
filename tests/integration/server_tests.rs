//! HTTP endpoints, driven through the router without a socket

use crate::common::{fake_service, local_service, mount_clean_checker, mount_page, FakePool};
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use sitelint::server::router;
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn json_post(uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("finished")));

    let response = router(service).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, r#"{"status":"ok"}"#);
}

#[tokio::test]
async fn test_spellcheck_missing_url() {
    let pool = Arc::new(FakePool::reporting("finished"));
    let (service, _) = fake_service(pool.clone());

    let response = router(service)
        .oneshot(json_post("/spellcheck", serde_json::json!({ "language": "en-us" })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error_code"], "INVALID_PARAMETERS");
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_spellcheck_non_json_body() {
    let pool = Arc::new(FakePool::reporting("finished"));
    let (service, _) = fake_service(pool.clone());

    let form = router(service.clone())
        .oneshot(form_post("/spellcheck", "language=en-us"))
        .await
        .unwrap();
    let untyped = router(service)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/spellcheck")
                .body(Body::from("url=http://x.com/"))
                .unwrap(),
        )
        .await
        .unwrap();

    for response in [form, untyped] {
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
        assert_eq!(body["error_code"], "INVALID_PARAMETERS");
    }
    assert_eq!(pool.scheduled_count(), 0);
}

#[tokio::test]
async fn test_spellcheck_malformed_json() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("finished")));

    let response = router(service)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/spellcheck")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"url\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["error_code"], "INVALID_PARAMETERS");
}

#[tokio::test]
async fn test_spellcheck_clean_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/page", "<p>Fine.</p>").await;
    mount_clean_checker(&server).await;
    let (service, _) = local_service(&server.uri());

    let response = router(service)
        .oneshot(json_post(
            "/spellcheck",
            serde_json::json!({ "url": format!("{}/page", server.uri()) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "finished");
    assert_eq!(body["size"], 0);
    assert_eq!(body["results"], serde_json::json!([]));
}

#[tokio::test]
async fn test_spellcheck_worker_failure() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("failed")));

    let response = router(service)
        .oneshot(json_post(
            "/spellcheck",
            serde_json::json!({ "url": "http://x.com/" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = serde_json::from_str(&body_string(response).await).unwrap();
    assert_eq!(body["status"], "failed");
}

#[tokio::test]
async fn test_spellcheck_pool_down() {
    let (service, _) = fake_service(Arc::new(FakePool::unreachable()));

    let response = router(service)
        .oneshot(json_post(
            "/spellcheck",
            serde_json::json!({ "url": "http://x.com/" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_spellcheck_timeout() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("pending")));

    let response = router(service)
        .oneshot(json_post(
            "/spellcheck",
            serde_json::json!({ "url": "http://x.com/" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
}

#[tokio::test]
async fn test_link_form() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("finished")));

    let response = router(service).oneshot(get("/links")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("<form"));
}

#[tokio::test]
async fn test_submit_links_invalid_url() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("finished")));

    let response = router(service)
        .oneshot(form_post("/links", "url=not+a+url"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await.contains("class=\"error\""));
}

#[tokio::test]
async fn test_results_for_unknown_task() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("")));

    let response = router(service)
        .oneshot(get(
            "/links/results?task_id=stale&job_id=00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_results_pending_view() {
    let (service, _) = fake_service(Arc::new(FakePool::reporting("running")));

    let response = router(service)
        .oneshot(get(
            "/links/results?task_id=t&job_id=00000000-0000-0000-0000-000000000000",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("http-equiv=\"refresh\""));
}

#[tokio::test]
async fn test_link_submit_redirect_then_results() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/blog",
        r#"<a href="/a">A</a><a>skip</a><a href="http://ext.com/b">B</a>"#,
    )
    .await;
    let (service, _) = local_service(&server.uri());

    let form = format!(
        "url={}",
        url::form_urlencoded::byte_serialize(format!("{}/blog", server.uri()).as_bytes())
            .collect::<String>()
    );
    let response = router(service.clone())
        .oneshot(form_post("/links", &form))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(location.starts_with("/links/results?task_id="));
    assert!(location.contains("&job_id="));

    let mut page = String::new();
    for _ in 0..200 {
        let response = router(service.clone()).oneshot(get(&location)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        page = body_string(response).await;
        if page.contains("<table>") {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    assert!(page.contains("Links (2)"));
    assert!(page.contains("http://ext.com/b"));
}
