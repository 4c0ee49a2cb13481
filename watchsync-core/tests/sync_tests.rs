// Tests for the sync engine: diffing the persisted URL list against the
// remote watch collection and creating what is missing.

use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;
use watchsync_core::sync::import_urls;
use watchsync_core::{WatchClient, YearFilter};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "test-key";
const TAG: &str = "campus";

async fn client(server: &MockServer) -> WatchClient {
    WatchClient::new(&server.uri(), API_KEY).unwrap()
}

fn url_list(urls: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for url in urls {
        writeln!(file, "{}", url).unwrap();
    }
    file.flush().unwrap();
    file
}

async fn mount_existing(server: &MockServer, urls: &[&str]) {
    let mut body = serde_json::Map::new();
    for (i, url) in urls.iter().enumerate() {
        body.insert(format!("id-{}", i), json!({"url": url, "tag": TAG}));
    }
    Mock::given(method("GET"))
        .and(path("/api/v1/watch"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Object(body)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn only_missing_urls_are_created() {
    let server = MockServer::start().await;
    mount_existing(&server, &["https://site/b"]).await;

    for missing in ["https://site/a", "https://site/c"] {
        Mock::given(method("POST"))
            .and(path("/api/v1/watch"))
            .and(body_partial_json(json!({"url": missing, "tag": TAG})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": "new"})))
            .expect(1)
            .mount(&server)
            .await;
    }

    let file = url_list(&["https://site/a", "https://site/b", "https://site/c"]);
    let report = import_urls(&client(&server).await, file.path(), TAG, None, None)
        .await
        .unwrap();

    assert_eq!(report.created, 2);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn year_filter_narrows_candidates_before_the_diff() {
    let server = MockServer::start().await;
    mount_existing(&server, &["https://site/b"]).await;

    // Only the undated URL survives the filter and is missing remotely.
    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .and(body_partial_json(json!({"url": "https://site/a"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let file = url_list(&["https://site/a", "https://site/b", "https://site/2019/c"]);
    let filter = YearFilter::new(["2024", "2025", "2026"].iter().map(|y| y.to_string()).collect());

    let report = import_urls(&client(&server).await, file.path(), TAG, Some(&filter), None)
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn no_candidates_means_no_creation_calls() {
    let server = MockServer::start().await;
    mount_existing(&server, &["https://site/a", "https://site/b"]).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let file = url_list(&["https://site/a", "https://site/b"]);
    let report = import_urls(&client(&server).await, file.path(), TAG, None, None)
        .await
        .unwrap();

    assert_eq!(report.created, 0);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped_existing, 2);
}

#[tokio::test]
async fn urls_already_watched_are_never_resent_regardless_of_tag() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id-0": {"url": "https://site/a", "tag": "somebody-elses-tag"},
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let file = url_list(&["https://site/a"]);
    let report = import_urls(&client(&server).await, file.path(), TAG, None, None)
        .await
        .unwrap();
    assert_eq!(report.created, 0);
}

#[tokio::test]
async fn failed_creation_is_counted_and_does_not_stop_the_rest() {
    let server = MockServer::start().await;
    mount_existing(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .and(body_partial_json(json!({"url": "https://site/bad"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .and(body_partial_json(json!({"url": "https://site/good"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let file = url_list(&["https://site/bad", "https://site/good"]);
    let report = import_urls(&client(&server).await, file.path(), TAG, None, None)
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.failed, 1);
}

#[tokio::test]
async fn missing_persisted_list_aborts_the_phase() {
    let server = MockServer::start().await;
    mount_existing(&server, &[]).await;

    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("collected_urls.txt");

    assert!(
        import_urls(&client(&server).await, &missing, TAG, None, None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn collection_fetch_failure_aborts_the_phase() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/watch"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let file = url_list(&["https://site/a"]);
    assert!(
        import_urls(&client(&server).await, file.path(), TAG, None, None)
            .await
            .is_err()
    );
}

#[tokio::test]
async fn progress_callback_reports_every_send() {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    let server = MockServer::start().await;
    mount_existing(&server, &[]).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/watch"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"uuid": "new"})))
        .expect(3)
        .mount(&server)
        .await;

    let seen = Arc::new(AtomicUsize::new(0));
    let seen_in_cb = seen.clone();
    let progress: watchsync_core::sync::SyncProgressCallback = Arc::new(move |done: usize, total: usize| {
        assert_eq!(total, 3);
        seen_in_cb.store(done, Ordering::SeqCst);
    });

    let file = url_list(&["https://site/a", "https://site/b", "https://site/c"]);
    let report = import_urls(&client(&server).await, file.path(), TAG, None, Some(progress))
        .await
        .unwrap();

    assert_eq!(report.created, 3);
    assert_eq!(seen.load(Ordering::SeqCst), 3);
}
