use std::path::Path;
use std::time::Duration;

use simple_file_retriever::{
    config::ServerConfig, AfterAcknowledge, Connection, DownloadCoordinator, HttpBackend,
    OriginContext, Screen, TransferBackend, TransferError,
};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

//===============
// Test Helpers
//===============
fn server_config(url: String) -> ServerConfig {
    ServerConfig {
        url: Some(url),
        ..ServerConfig::default()
    }
}

async fn mock_head(server: &mut mockito::ServerGuard, path: &str) -> mockito::Mock {
    server
        .mock("HEAD", path)
        .with_status(200)
        .create_async()
        .await
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).expect("Failed to read downloaded file")
}

fn dir_entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to list download directory")
        .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Serves HEAD normally; every GET announces `declared_len` bytes, sends only
/// `prefix`, waits `stall` and hangs up.
async fn spawn_short_body_server(prefix: &'static [u8], declared_len: usize, stall: Duration) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test server");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut head = Vec::new();
                let mut buf = [0u8; 1024];
                while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => head.extend_from_slice(&buf[..n]),
                    }
                }

                if head.starts_with(b"HEAD") {
                    let _ = socket
                        .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n")
                        .await;
                    return;
                }

                let header = format!(
                    "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    declared_len
                );
                let _ = socket.write_all(header.as_bytes()).await;
                let _ = socket.write_all(prefix).await;
                let _ = socket.flush().await;
                tokio::time::sleep(stall).await;
            });
        }
    });

    format!("http://{}", addr)
}

//===============
// Tests
//===============
#[tokio::test]
async fn retrieve_writes_file_into_download_dir() {
    let mut server = mockito::Server::new_async().await;
    let head = mock_head(&mut server, "/pub/").await;
    let file = server
        .mock("GET", "/pub/report.pdf")
        .with_status(200)
        .with_body("quarterly numbers")
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let backend = HttpBackend::connect(&server_config(format!("{}/pub", server.url())), dir.path())
        .await
        .expect("connect");

    backend
        .retrieve("local-copy.pdf", "report.pdf")
        .await
        .expect("retrieve");

    head.assert_async().await;
    file.assert_async().await;
    assert_eq!(read(&dir.path().join("local-copy.pdf")), "quarterly numbers");
}

#[tokio::test]
async fn coordinator_through_open_connection_navigates_to_origin() {
    let mut server = mockito::Server::new_async().await;
    let _head = mock_head(&mut server, "/").await;
    let file = server
        .mock("GET", "/report.pdf")
        .with_status(200)
        .with_body("pdf")
        .expect(2)
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let connection = Connection::new();
    connection
        .open(
            HttpBackend::connect(&server_config(server.url()), dir.path())
                .await
                .expect("connect"),
        )
        .await;
    let coordinator = DownloadCoordinator::new(connection);

    let directive = coordinator
        .handle_download(" report.pdf ", "report.pdf", OriginContext::Main)
        .await;
    assert_eq!(directive.message, "Download successfully!");
    assert_eq!(directive.acknowledge(), AfterAcknowledge::NavigateTo(Screen::Main));

    let directive = coordinator
        .handle_download("report.pdf", "report.pdf", OriginContext::User)
        .await;
    assert_eq!(directive.acknowledge(), AfterAcknowledge::NavigateTo(Screen::User));

    file.assert_async().await;
    assert_eq!(read(&dir.path().join("report.pdf")), "pdf");
}

#[tokio::test]
async fn closed_connection_reports_not_connected() {
    let coordinator = DownloadCoordinator::new(Connection::new());

    let directive = coordinator
        .handle_download("report.pdf", "report.pdf", OriginContext::Main)
        .await;

    assert_eq!(
        directive.message,
        "Not connected to a server. Please log in first."
    );
    assert_eq!(directive.acknowledge(), AfterAcknowledge::Stay);
}

#[tokio::test]
async fn missing_remote_file_leaves_local_file_untouched() {
    let mut server = mockito::Server::new_async().await;
    let _head = mock_head(&mut server, "/").await;
    let _missing = server
        .mock("GET", "/missing.txt")
        .with_status(404)
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let existing = dir.path().join("notes.txt");
    std::fs::write(&existing, "keep me").expect("Failed to seed local file");

    let backend = HttpBackend::connect(&server_config(server.url()), dir.path())
        .await
        .expect("connect");
    let result = backend.retrieve("notes.txt", "missing.txt").await;

    assert_eq!(result, Err(TransferError::NotFound("missing.txt".to_string())));
    assert_eq!(read(&existing), "keep me");

    let coordinator = DownloadCoordinator::new(backend);
    let directive = coordinator
        .handle_download("other.txt", "missing.txt", OriginContext::Main)
        .await;
    assert_eq!(directive.message, "File not found on server: missing.txt");
    assert_eq!(directive.acknowledge(), AfterAcknowledge::Stay);
    assert!(!dir.path().join("other.txt").exists());
}

#[tokio::test]
async fn rejected_login_fails_to_connect() {
    let mut server = mockito::Server::new_async().await;
    let _head = server
        .mock("HEAD", "/")
        .with_status(401)
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let result = HttpBackend::connect(&server_config(server.url()), dir.path()).await;

    assert!(matches!(result, Err(TransferError::PermissionDenied(_))));
}

#[tokio::test]
async fn credentials_are_sent_with_every_request() {
    let mut server = mockito::Server::new_async().await;
    // "user:pass"
    let auth = "Basic dXNlcjpwYXNz";
    let head = server
        .mock("HEAD", "/")
        .match_header("authorization", auth)
        .with_status(200)
        .create_async()
        .await;
    let file = server
        .mock("GET", "/a.txt")
        .match_header("authorization", auth)
        .with_status(200)
        .with_body("a")
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = ServerConfig {
        url: Some(server.url()),
        username: Some("user".to_string()),
        password: Some("pass".to_string()),
        ..ServerConfig::default()
    };
    let backend = HttpBackend::connect(&config, dir.path())
        .await
        .expect("connect");
    backend.retrieve("a.txt", "/a.txt").await.expect("retrieve");

    head.assert_async().await;
    file.assert_async().await;
}

#[tokio::test]
async fn remote_name_cannot_leave_server_root() {
    let mut server = mockito::Server::new_async().await;
    let _head = mock_head(&mut server, "/pub/").await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let backend = HttpBackend::connect(&server_config(format!("{}/pub/", server.url())), dir.path())
        .await
        .expect("connect");

    let result = backend.retrieve("secret.txt", "../secret.txt").await;
    assert!(matches!(result, Err(TransferError::PermissionDenied(_))));
}

#[tokio::test]
async fn server_error_is_a_network_failure() {
    let mut server = mockito::Server::new_async().await;
    let _head = mock_head(&mut server, "/").await;
    let _busy = server
        .mock("GET", "/busy.bin")
        .with_status(503)
        .create_async()
        .await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let backend = HttpBackend::connect(&server_config(server.url()), dir.path())
        .await
        .expect("connect");

    let result = backend.retrieve("busy.bin", "busy.bin").await;
    assert!(matches!(result, Err(TransferError::Network(_))));
    assert!(!dir.path().join("busy.bin").exists());
}

#[tokio::test]
async fn body_failing_midway_keeps_previous_local_copy() {
    let url = spawn_short_body_server(b"partial", 1000, Duration::ZERO).await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let existing = dir.path().join("report.pdf");
    std::fs::write(&existing, "old copy").expect("Failed to seed local file");

    let backend = HttpBackend::connect(&server_config(url), dir.path())
        .await
        .expect("connect");
    let result = backend.retrieve("report.pdf", "report.pdf").await;

    assert!(matches!(result, Err(TransferError::Network(_))), "{:?}", result);
    assert_eq!(read(&existing), "old copy");
    assert_eq!(dir_entries(dir.path()), vec!["report.pdf".to_string()]);
}

#[tokio::test]
async fn timed_out_download_leaves_no_partial_file() {
    let url = spawn_short_body_server(b"partial-bytes", 1000, Duration::from_secs(3)).await;

    let dir = TempDir::new().expect("Failed to create temp directory");
    let existing = dir.path().join("report.pdf");
    std::fs::write(&existing, "old copy").expect("Failed to seed local file");

    let backend = HttpBackend::connect(&server_config(url), dir.path())
        .await
        .expect("connect");
    let coordinator =
        DownloadCoordinator::new(backend).with_timeout(Some(Duration::from_millis(800)));

    let directive = coordinator
        .handle_download("report.pdf", "report.pdf", OriginContext::Main)
        .await;
    assert_eq!(directive.message, "Download timed out after 1 second.");
    assert_eq!(directive.acknowledge(), AfterAcknowledge::Stay);

    let fresh = coordinator
        .handle_download("fresh.pdf", "report.pdf", OriginContext::Main)
        .await;
    assert_eq!(fresh.acknowledge(), AfterAcknowledge::Stay);

    assert_eq!(read(&existing), "old copy");
    assert_eq!(dir_entries(dir.path()), vec!["report.pdf".to_string()]);
}
