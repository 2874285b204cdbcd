use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use custom_lists::api::router;
use custom_lists::engine::{FileParser, FilterStore, ReloadController, TaskScheduler};
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tower::ServiceExt;

struct TestApp {
    _dir: tempfile::TempDir,
    file: std::path::PathBuf,
    controller: Arc<ReloadController>,
    path_rx: watch::Receiver<String>,
    app: Router,
}

fn test_app(content: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("list.txt");
    if let Some(content) = content {
        fs::write(&file, content).unwrap();
    }

    let (path_tx, path_rx) = watch::channel(file.display().to_string());
    let controller = Arc::new(ReloadController::new(
        Arc::new(FilterStore::new()),
        Arc::new(FileParser::new()),
        Arc::new(path_rx.clone()),
        TaskScheduler::new(),
        Duration::from_secs(60),
    ));
    let app = router(controller.clone(), path_tx);

    TestApp {
        _dir: dir,
        file,
        controller,
        path_rx,
        app,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_update_endpoint_loads_list() {
    let t = test_app(Some("US\nAS64496\n198.51.100.1\nexample.co.uk\n"));

    let (status, body) = send(&t.app, post_empty("/api/customlists/update")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Custom filter list loaded successfully.");

    let (_, body) = send(&t.app, get("/api/customlists/status")).await;
    assert_eq!(body["list"]["domains"], 1);
    assert_eq!(body["list"]["asns"], 1);
    assert_eq!(body["list"]["file_path"], t.file.display().to_string());
    assert!(body["next_check_secs"].as_u64().unwrap() <= 60);
}

#[tokio::test]
async fn test_update_endpoint_reports_success_when_file_missing() {
    let t = test_app(None);

    let (status, body) = send(&t.app, post_empty("/api/customlists/update")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(t.controller.store().snapshot().is_empty());
}

#[tokio::test]
async fn test_lookup_endpoint() {
    let t = test_app(Some("NL\nAS64496\n198.51.100.1\nexample.co.uk\n"));
    t.controller.check_and_update().await;

    let (_, body) = send(
        &t.app,
        get("/api/customlists/lookup?domain=a.example.co.uk&subdomains=true"),
    )
    .await;
    assert_eq!(body["listed"], true);
    assert_eq!(body["matched"], "example.co.uk.");

    let (_, body) = send(&t.app, get("/api/customlists/lookup?domain=a.example.co.uk")).await;
    assert_eq!(body["listed"], false);
    assert!(body["matched"].is_null());

    let (_, body) = send(&t.app, get("/api/customlists/lookup?ip=198.51.100.1")).await;
    assert_eq!(body["listed"], true);

    let (_, body) = send(&t.app, get("/api/customlists/lookup?asn=64496")).await;
    assert_eq!(body["listed"], true);

    let (_, body) = send(&t.app, get("/api/customlists/lookup?country=DE")).await;
    assert_eq!(body["listed"], false);

    let (status, _) = send(&t.app, get("/api/customlists/lookup")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_config_endpoint_publishes_path() {
    let t = test_app(None);

    let request = Request::post("/api/customlists/config")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"file_path": " /srv/lists/custom.txt "}"#))
        .unwrap();
    let (status, body) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["file_path"], "/srv/lists/custom.txt");
    assert_eq!(*t.path_rx.borrow(), "/srv/lists/custom.txt");
}
