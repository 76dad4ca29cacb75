//! The HTTP API driven through the router

use crate::helpers::{test_config, unzip};
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use ringtone_fetcher::server::{router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn app() -> Router {
    router(Arc::new(AppState::new(test_config()).unwrap()))
}

fn download_request(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/download")
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_download_returns_zip_attachment() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/classic.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"classic".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b/classic.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"other classic".to_vec()))
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [
                format!("{}/a/classic.mp3", server.uri()),
                7,
                format!("{}/b/classic.mp3", server.uri()),
            ],
            "whitelist": ["127.0.0.1"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/zip"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"ringtones.zip\""
    );

    let members = unzip(&body_bytes(response).await);
    assert_eq!(members.len(), 2);
    assert_eq!(members["0000_classic.mp3"], b"classic");
    assert_eq!(members["0001_classic.mp3"], b"other classic");
}

#[tokio::test]
async fn test_limit_caps_admitted_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/one.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"1".to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"2".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [
                format!("{}/one.mp3", server.uri()),
                format!("{}/two.mp3", server.uri()),
            ],
            "whitelist": ["127.0.0.1"],
            "limit": 1
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let members = unzip(&body_bytes(response).await);
    assert_eq!(members.len(), 1);
    assert!(members.contains_key("0000_one.mp3"));
}

#[tokio::test]
async fn test_failed_download_still_returns_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broken.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [
                format!("{}/broken.mp3", server.uri()),
                format!("{}/ok.mp3", server.uri()),
            ],
            "whitelist": ["127.0.0.1"],
            "concurrency": 2
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let members = unzip(&body_bytes(response).await);
    assert_eq!(members.len(), 1);
    assert_eq!(members["0001_ok.mp3"], b"ok");
}

#[tokio::test]
async fn test_all_downloads_failing_returns_empty_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken.mp3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [format!("{}/broken.mp3", server.uri())],
            "whitelist": ["127.0.0.1"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(unzip(&body_bytes(response).await).is_empty());
}

#[tokio::test]
async fn test_robots_timeout_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("User-agent: *\nDisallow: /\n")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"r".to_vec()))
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [format!("{}/r.mp3", server.uri())],
            "whitelist": ["127.0.0.1"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(unzip(&body_bytes(response).await)["0000_r.mp3"], b"r");
}

#[tokio::test]
async fn test_robots_disallowed_everything_is_400() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: TestBot\nDisallow: /\n"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/r.mp3"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [format!("{}/r.mp3", server.uri())],
            "whitelist": ["127.0.0.1"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(body["status"], 400);
    assert_eq!(
        body["detail"],
        "No valid URLs after whitelist/robots.txt filtering"
    );
}

#[tokio::test]
async fn test_domain_mismatch_is_never_contacted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [format!("{}/r.mp3", server.uri())],
            "whitelist": ["example.com"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_redirect_to_unlisted_host_is_not_followed() {
    let server = MockServer::start().await;
    let port = server.address().port();
    Mock::given(method("GET"))
        .and(path("/r.mp3"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("http://localhost:{}/evil.mp3", port).as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/evil.mp3"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"secret".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let response = app()
        .oneshot(download_request(json!({
            "urls": [format!("{}/r.mp3", server.uri())],
            "whitelist": ["127.0.0.1"]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(unzip(&body_bytes(response).await).is_empty());
}

#[tokio::test]
async fn test_empty_whitelist_is_400() {
    let response = app()
        .oneshot(download_request(json!({
            "urls": ["http://a.example.com/r.mp3"],
            "whitelist": []
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(
        body["detail"],
        "You must provide a non-empty 'whitelist' array of allowed domains."
    );
}
