//! Admission, download and archive stages chained together

use crate::helpers::{local_only, robots_timeout, unzip};
use reqwest::Client;
use ringtone_fetcher::admission::admit;
use ringtone_fetcher::archive::build_archive;
use ringtone_fetcher::fetcher::fetch_all;
use ringtone_fetcher::robots::RobotsChecker;
use ringtone_fetcher::staging::StagingArea;
use ringtone_fetcher::RequestError;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn checker() -> RobotsChecker {
    RobotsChecker::new(
        Client::new(),
        "TestBot",
        robots_timeout(),
        Duration::from_secs(60),
    )
}

async fn mount_file(server: &MockServer, p: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_pipeline_round_trips_bytes() {
    let server = MockServer::start().await;
    let first: Vec<u8> = (0..100_000u32).map(|i| (i % 253) as u8).collect();
    let second = b"short ringtone".to_vec();
    mount_file(&server, "/tones/first.mp3", &first).await;
    mount_file(&server, "/other/second.m4r", &second).await;

    let urls = vec![
        format!("{}/tones/first.mp3", server.uri()),
        format!("{}/other/second.m4r?sig=abc", server.uri()),
    ];
    let admitted = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap();
    assert_eq!(admitted.len(), 2);

    let staging = StagingArea::create().unwrap();
    let staging_path = staging.path().to_path_buf();
    let outcomes = fetch_all(&Client::new(), &admitted, &local_only(), 2, staging.path()).await;
    assert!(outcomes.iter().all(|o| o.is_success()));

    let archive = build_archive(&outcomes).unwrap();
    staging.close().unwrap();
    assert!(!staging_path.exists());

    let members = unzip(&archive);
    assert_eq!(members.len(), 2);
    assert_eq!(members["0000_first.mp3"], first);
    assert_eq!(members["0001_second.m4r"], second);
}

#[tokio::test]
async fn test_server_error_is_omitted_from_archive() {
    let server = MockServer::start().await;
    mount_file(&server, "/ok.mp3", b"fine").await;
    Mock::given(method("GET"))
        .and(path("/broken.mp3"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/broken.mp3", server.uri()),
        format!("{}/ok.mp3", server.uri()),
    ];
    let admitted = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap();

    let staging = StagingArea::create().unwrap();
    let outcomes = fetch_all(&Client::new(), &admitted, &local_only(), 5, staging.path()).await;

    assert_eq!(outcomes.len(), 2);
    assert!(!outcomes[0].is_success());
    assert!(outcomes[0].error().unwrap().contains("500"));
    assert!(outcomes[1].is_success());

    let members = unzip(&build_archive(&outcomes).unwrap());
    assert_eq!(members.len(), 1);
    assert_eq!(members["0001_ok.mp3"], b"fine");
}

#[tokio::test]
async fn test_robots_timeout_still_admits() {
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

    let urls = vec![format!("{}/r.mp3", server.uri())];
    let admitted = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap();

    assert_eq!(admitted.len(), 1);
}

#[tokio::test]
async fn test_robots_disallow_filters_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private/\n"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/private/a.mp3", server.uri()),
        format!("{}/public/b.mp3", server.uri()),
        format!("{}/public/c.mp3", server.uri()),
    ];
    let admitted = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap();

    let paths: Vec<&str> = admitted.iter().map(|a| a.url.path()).collect();
    assert_eq!(paths, vec!["/public/b.mp3", "/public/c.mp3"]);
    assert_eq!(admitted[0].index, 0);
    assert_eq!(admitted[1].index, 1);
}

#[tokio::test]
async fn test_everything_disallowed_is_a_request_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /\n"))
        .mount(&server)
        .await;

    let urls = vec![format!("{}/r.mp3", server.uri())];
    let err = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap_err();

    assert_eq!(err, RequestError::NothingAdmitted);
}

#[tokio::test]
async fn test_all_failed_downloads_give_empty_archive() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone.mp3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls = vec![format!("{}/gone.mp3", server.uri())];
    let admitted = admit(&urls, &["127.0.0.1"], 50, &checker()).await.unwrap();

    let staging = StagingArea::create().unwrap();
    let outcomes = fetch_all(&Client::new(), &admitted, &local_only(), 5, staging.path()).await;

    assert_eq!(outcomes.len(), 1);
    assert!(unzip(&build_archive(&outcomes).unwrap()).is_empty());
}
