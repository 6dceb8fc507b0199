//! Integration tests for the download pipeline.
//!
//! These tests drive the service end to end against mock HTTP servers and
//! verify persisted files and emitted events.

use fetchd_core::{DownloadEvent, DownloadRequest, DownloadService, ServiceConfig};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a service rooted at a temp download directory.
fn service_for(temp: &TempDir) -> DownloadService {
    let config = ServiceConfig::new(temp.path(), temp.path()).expect("temp dir exists");
    DownloadService::new(config, 4).expect("valid concurrency")
}

/// Helper to create a mock server with a file endpoint.
async fn setup_mock_file(path_str: &str, content: &[u8]) -> MockServer {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(path_str))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&mock_server)
        .await;

    mock_server
}

/// Dispatches a request, waits for it, and returns the emitted event.
async fn run_request(service: &DownloadService, request: DownloadRequest) -> DownloadEvent {
    let mut rx = service.subscribe();
    service
        .dispatch(request)
        .await
        .expect("download task should not panic");
    rx.recv().await.expect("exactly one terminal event")
}

#[tokio::test]
async fn test_download_persists_body_and_fires_completed_event() {
    let mock_server = setup_mock_file("/test.txt", b"hello").await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    let url = format!("{}/test.txt", mock_server.uri());
    let event = run_request(&service, DownloadRequest::new(&url)).await;

    assert_eq!(
        event,
        DownloadEvent::DownloadCompleted {
            url: url.clone(),
            filename: "test.txt".to_string(),
        }
    );

    let file_path = temp.path().join("test.txt");
    assert!(file_path.exists(), "downloaded file should exist");
    let content = std::fs::read(&file_path).expect("should read file");
    assert_eq!(content, b"hello");
}

#[tokio::test]
async fn test_repeated_download_disambiguates_with_numeric_suffix() {
    let mock_server = setup_mock_file("/test.txt", b"hello").await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    let url = format!("{}/test.txt", mock_server.uri());

    let first = run_request(&service, DownloadRequest::new(&url)).await;
    assert_eq!(
        first,
        DownloadEvent::DownloadCompleted {
            url: url.clone(),
            filename: "test.txt".to_string(),
        }
    );

    let second = run_request(&service, DownloadRequest::new(&url)).await;
    assert_eq!(
        second,
        DownloadEvent::DownloadCompleted {
            url: url.clone(),
            filename: "test.txt".to_string(),
        }
    );

    let third = run_request(&service, DownloadRequest::new(&url)).await;
    assert!(matches!(third, DownloadEvent::DownloadCompleted { .. }));

    for name in ["test.txt", "test_2.txt", "test_3.txt"] {
        let file_path = temp.path().join(name);
        assert!(file_path.exists(), "{name} should exist");
        assert_eq!(
            std::fs::read(&file_path).expect("should read file"),
            b"hello",
            "{name} content should match"
        );
    }
}

#[tokio::test]
async fn test_overwrite_converges_on_single_file() {
    let mock_server = setup_mock_file("/test.txt", b"hello").await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    let url = format!("{}/test.txt", mock_server.uri());
    let request = DownloadRequest {
        url: url.clone(),
        subdir: None,
        filename: None,
        overwrite: true,
    };

    run_request(&service, request.clone()).await;
    run_request(&service, request).await;

    let entries: Vec<_> = std::fs::read_dir(temp.path())
        .expect("should list download dir")
        .collect();
    assert_eq!(entries.len(), 1, "exactly one file after overwriting runs");
    assert_eq!(
        std::fs::read(temp.path().join("test.txt")).expect("should read file"),
        b"hello"
    );
}

#[tokio::test]
async fn test_explicit_filename_overrides_content_disposition() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    Mock::given(method("GET"))
        .and(path("/api/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    r#"attachment; filename="served-name.pdf""#,
                )
                .set_body_bytes(b"PDF bytes"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/download", mock_server.uri());
    let request = DownloadRequest {
        url: url.clone(),
        subdir: None,
        filename: Some("chosen-name.pdf".to_string()),
        overwrite: false,
    };
    let event = run_request(&service, request).await;

    assert_eq!(
        event,
        DownloadEvent::DownloadCompleted {
            url,
            filename: "chosen-name.pdf".to_string(),
        }
    );
    assert!(temp.path().join("chosen-name.pdf").exists());
    assert!(!temp.path().join("served-name.pdf").exists());
}

#[tokio::test]
async fn test_content_disposition_filename_overrides_url_basename() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    Mock::given(method("GET"))
        .and(path("/api/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "Content-Disposition",
                    r#"attachment; filename="important-paper.pdf""#,
                )
                .set_body_bytes(b"PDF bytes"),
        )
        .mount(&mock_server)
        .await;

    let url = format!("{}/api/download", mock_server.uri());
    let event = run_request(&service, DownloadRequest::new(&url)).await;

    assert_eq!(
        event,
        DownloadEvent::DownloadCompleted {
            url,
            filename: "important-paper.pdf".to_string(),
        }
    );
    assert!(temp.path().join("important-paper.pdf").exists());
}

#[tokio::test]
async fn test_url_basename_used_when_no_header() {
    let mock_server = setup_mock_file("/papers/research-2024.pdf", b"content").await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    let url = format!("{}/papers/research-2024.pdf", mock_server.uri());
    let event = run_request(&service, DownloadRequest::new(&url)).await;

    assert!(matches!(
        event,
        DownloadEvent::DownloadCompleted { filename, .. } if filename == "research-2024.pdf"
    ));
    assert!(temp.path().join("research-2024.pdf").exists());
}

#[tokio::test]
async fn test_subdir_is_created_under_download_dir() {
    let mock_server = setup_mock_file("/a.txt", b"nested").await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    let url = format!("{}/a.txt", mock_server.uri());
    let request = DownloadRequest {
        url,
        subdir: Some("reports/2024".to_string()),
        filename: None,
        overwrite: false,
    };
    let event = run_request(&service, request).await;

    assert!(matches!(event, DownloadEvent::DownloadCompleted { .. }));
    let file_path = temp.path().join("reports/2024/a.txt");
    assert!(file_path.exists(), "file should land inside the subdir");
    assert_eq!(
        std::fs::read(&file_path).expect("should read file"),
        b"nested"
    );
}

#[tokio::test]
async fn test_concurrent_dispatches_all_complete() {
    let mock_server = MockServer::start().await;
    let temp = TempDir::new().expect("failed to create temp dir");
    let service = service_for(&temp);

    for name in ["a.txt", "b.txt", "c.txt"] {
        Mock::given(method("GET"))
            .and(path(format!("/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes()))
            .mount(&mock_server)
            .await;
    }

    let handles: Vec<_> = ["a.txt", "b.txt", "c.txt"]
        .iter()
        .map(|name| {
            service.dispatch(DownloadRequest::new(format!(
                "{}/{name}",
                mock_server.uri()
            )))
        })
        .collect();

    for handle in handles {
        handle.await.expect("task should not panic");
    }

    for name in ["a.txt", "b.txt", "c.txt"] {
        assert!(temp.path().join(name).exists(), "{name} should exist");
    }
}
