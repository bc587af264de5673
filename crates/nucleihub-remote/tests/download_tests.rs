use nucleihub::{FetchError, FileDownloader};
use nucleihub_remote::HttpDownloader;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TEMPLATE: &str = "id: example\ninfo:\n  name: Example\n  severity: info\n";

#[tokio::test]
async fn writes_body_to_destination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a/b/main/example.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(TEMPLATE))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a-b").join("example.yaml");
    let url = format!("{}/a/b/main/example.yaml", server.uri());

    let written = HttpDownloader::new().download(&url, &dest).await.unwrap();

    assert_eq!(written, TEMPLATE.len() as u64);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), TEMPLATE);
}

#[tokio::test]
async fn overwrites_existing_file() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("new"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("example.yaml");
    std::fs::write(&dest, "old content that is longer").unwrap();

    HttpDownloader::new()
        .download(&format!("{}/example.yaml", server.uri()), &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "new");
}

#[tokio::test]
async fn non_success_status_writes_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("missing.yaml");

    let result = HttpDownloader::new()
        .download(&format!("{}/missing.yaml", server.uri()), &dest)
        .await;

    assert!(matches!(result, Err(FetchError::Status { status: 404 })));
    assert!(!dest.exists());
}

#[tokio::test]
async fn unreachable_host_is_a_network_error() {
    let dir = tempfile::tempdir().unwrap();

    let result = HttpDownloader::new()
        .download("http://127.0.0.1:1/x.yaml", &dir.path().join("x.yaml"))
        .await;

    assert!(matches!(result, Err(FetchError::Network(_))));
}
