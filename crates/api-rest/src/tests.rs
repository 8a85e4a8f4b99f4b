use super::*;
use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use panel_core::{config::prepare_storage_base, CoreConfig, TenantId, UploadPayload};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const SECRET: &str = "test-secret-key-at-least-32-characters-long";
const BOUNDARY: &str = "panel-test-boundary";

struct Harness {
    _temp: TempDir,
    app: Router,
    storage: StorageService,
    tokens: TokenService,
}

impl Harness {
    fn new() -> Self {
        Self::with_upload_limit(1024 * 1024)
    }

    fn with_upload_limit(upload_limit_bytes: usize) -> Self {
        let temp = TempDir::new().unwrap();
        let base = temp.path().canonicalize().unwrap().join("storage");
        prepare_storage_base(&base).unwrap();
        let cfg = Arc::new(CoreConfig::new(base, None).unwrap());
        let storage = StorageService::new(cfg).unwrap();
        let tokens = TokenService::new(SECRET, 7);

        let api = ApiConfig {
            upload_limit_bytes,
            json_limit_bytes: 64 * 1024,
            frontend_origin: "http://localhost:5173".into(),
        };
        let state = AppState {
            storage: storage.clone(),
            tokens: tokens.clone(),
        };
        let app = router(state, &api).unwrap();

        Self {
            _temp: temp,
            app,
            storage,
            tokens,
        }
    }

    fn bearer(&self, tenant: &TenantId) -> String {
        format!("Bearer {}", self.tokens.issue(tenant, "owner@example.com").unwrap())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, headers, body.to_vec())
    }

    async fn send_json(&self, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let (status, _, body) = self.send(request).await;
        let json = if body.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&body).unwrap()
        };
        (status, json)
    }
}

fn get(uri: &str, auth: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", auth)
        .body(Body::empty())
        .unwrap()
}

fn post_json(uri: &str, auth: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", auth)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn upload_request(uri: &str, auth: &str, field: &str, file_name: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", auth)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("content-length", body.len())
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_needs_no_token() {
    let h = Harness::new();
    let request = Request::builder()
        .uri("/healthz")
        .body(Body::empty())
        .unwrap();
    let (status, json) = h.send_json(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_missing_or_bad_token_is_unauthorized() {
    let h = Harness::new();

    let request = Request::builder()
        .uri("/api/files")
        .body(Body::empty())
        .unwrap();
    let (status, json) = h.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Unauthorized");

    let (status, json) = h.send_json(get("/api/files", "Bearer not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(json["message"], "Invalid token");

    let foreign = TokenService::new("some-other-secret-of-adequate-length", 7)
        .issue(&TenantId::new(), "x@y.z")
        .unwrap();
    let (status, _) = h
        .send_json(get("/api/files", &format!("Bearer {foreign}")))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_root_listing_starts_empty() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let (status, json) = h.send_json(get("/api/files", &h.bearer(&tenant))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["path"], "");
    assert_eq!(json["items"], serde_json::json!([]));
}

#[tokio::test]
async fn test_mkdir_upload_list_download() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);

    let (status, json) = h
        .send_json(post_json(
            "/api/files/mkdir",
            &auth,
            serde_json::json!({ "name": "photos" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["name"], "photos");

    let (status, json) = h
        .send_json(upload_request(
            "/api/files/upload?dir=photos",
            &auth,
            "file",
            "cat.png",
            b"meow",
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["filename"], "cat.png");

    let (status, json) = h.send_json(get("/api/files/photos/", &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["path"], "photos");
    assert_eq!(json["items"][0]["name"], "cat.png");
    assert_eq!(json["items"][0]["type"], "file");
    assert_eq!(json["items"][0]["size"], 4);

    let (status, headers, body) = h
        .send(get("/api/files/download/photos/cat.png", &auth))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"meow");
    assert_eq!(
        headers["content-disposition"],
        "attachment; filename=\"cat.png\""
    );
    assert_eq!(headers["content-type"], "application/octet-stream");
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let h = Harness::new();
    let auth = h.bearer(&TenantId::new());
    let (status, json) = h
        .send_json(upload_request(
            "/api/files/upload",
            &auth,
            "attachment",
            "a.txt",
            b"x",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "No file uploaded");
}

#[tokio::test]
async fn test_upload_over_limit_is_rejected() {
    let h = Harness::with_upload_limit(16);
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    let (status, _, _) = h
        .send(upload_request(
            "/api/files/upload",
            &auth,
            "file",
            "big.bin",
            &[7u8; 1024],
        ))
        .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(h.storage.files(tenant).list("").unwrap().items.is_empty());
}

#[tokio::test]
async fn test_traversal_is_bad_request() {
    let h = Harness::new();
    let auth = h.bearer(&TenantId::new());

    let (status, json) = h
        .send_json(upload_request(
            "/api/files/upload?dir=../../",
            &auth,
            "file",
            "evil.txt",
            b"x",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].as_str().unwrap().contains("traversal"));

    let (status, _) = h
        .send_json(post_json(
            "/api/files/move",
            &auth,
            serde_json::json!({ "from": "../other", "toDir": "" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rename_move_copy() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    let files = h.storage.files(tenant);
    files
        .save_upload("", "a.txt", UploadPayload::Memory(b"hello".to_vec()))
        .unwrap();

    let (status, json) = h
        .send_json(post_json(
            "/api/files/rename",
            &auth,
            serde_json::json!({ "path": "a.txt", "newName": "b.txt" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);

    let (status, _) = h
        .send_json(post_json(
            "/api/files/copy",
            &auth,
            serde_json::json!({ "from": "b.txt", "toDir": "backup" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = h
        .send_json(post_json(
            "/api/files/move",
            &auth,
            serde_json::json!({ "from": "b.txt", "toDir": "archive" }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);

    let root = files.root().to_path_buf();
    assert!(!root.join("a.txt").exists());
    assert!(!root.join("b.txt").exists());
    assert_eq!(std::fs::read(root.join("backup/b.txt")).unwrap(), b"hello");
    assert_eq!(std::fs::read(root.join("archive/b.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_missing_fields_and_missing_source() {
    let h = Harness::new();
    let auth = h.bearer(&TenantId::new());

    let (status, json) = h
        .send_json(post_json(
            "/api/files/rename",
            &auth,
            serde_json::json!({ "path": "a.txt" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "path and newName are required");

    let (status, json) = h
        .send_json(post_json("/api/files/copy", &auth, serde_json::json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "from is required");

    let (status, json) = h
        .send_json(post_json(
            "/api/files/mkdir",
            &auth,
            serde_json::json!({}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Folder name is required");

    let (status, _) = h
        .send_json(post_json(
            "/api/files/rename",
            &auth,
            serde_json::json!({ "path": "ghost.txt", "newName": "b.txt" }),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_is_idempotent() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    h.storage
        .files(tenant)
        .make_directory("", "old")
        .unwrap();

    for _ in 0..2 {
        let request = Request::builder()
            .method("DELETE")
            .uri("/api/files/old")
            .header("authorization", &auth)
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = h.send(request).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());
    }
    assert!(h.storage.files(tenant).list("").unwrap().items.is_empty());
}

#[tokio::test]
async fn test_download_directory_and_missing() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    h.storage.files(tenant).make_directory("", "docs").unwrap();

    let (status, _) = h
        .send_json(get("/api/files/download/docs", &auth))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h
        .send_json(get("/api/files/download/nope.txt", &auth))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let h = Harness::new();
    let alice = TenantId::new();
    let bob = TenantId::new();
    h.storage
        .files(alice)
        .save_upload("", "secret.txt", UploadPayload::Memory(b"s".to_vec()))
        .unwrap();

    let (status, json) = h.send_json(get("/api/files", &h.bearer(&bob))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"], serde_json::json!([]));

    let (status, _) = h
        .send_json(get("/api/files/download/secret.txt", &h.bearer(&bob)))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_field_without_filename_is_unsupported() {
    let h = Harness::new();
    let auth = h.bearer(&TenantId::new());
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"\r\n\r\nplain text\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header("authorization", &auth)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, json) = h.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Unsupported upload payload");
}

#[tokio::test]
async fn test_trailing_slash_root() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    h.storage.files(tenant).make_directory("", "keep").unwrap();

    let (status, json) = h.send_json(get("/api/files/", &auth)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["path"], "");
    assert_eq!(json["items"][0]["name"], "keep");

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/files/")
        .header("authorization", &auth)
        .body(Body::empty())
        .unwrap();
    let (status, json) = h.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Path is required");
    assert!(h.storage.files(tenant).root().join("keep").is_dir());

    let request = Request::builder()
        .method("DELETE")
        .uri("/api/files/")
        .body(Body::empty())
        .unwrap();
    let (status, _) = h.send_json(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bad_json_bodies_answer_with_message() {
    let h = Harness::new();
    let auth = h.bearer(&TenantId::new());

    let (status, json) = h
        .send_json(post_json(
            "/api/files/rename",
            &auth,
            serde_json::json!({ "path": "a.txt", "newName": 5 }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/mkdir")
        .header("authorization", &auth)
        .header("content-type", "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();
    let (status, json) = h.send_json(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["message"].is_string());
}

#[tokio::test]
async fn test_null_to_dir_means_root() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    let files = h.storage.files(tenant);
    files
        .save_upload("d", "a.txt", UploadPayload::Memory(b"a".to_vec()))
        .unwrap();

    let (status, json) = h
        .send_json(post_json(
            "/api/files/move",
            &auth,
            serde_json::json!({ "from": "d/a.txt", "toDir": null }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert!(files.root().join("a.txt").is_file());
    assert!(!files.root().join("d/a.txt").exists());
}

#[tokio::test]
async fn test_file_used_as_directory_is_bad_request() {
    let h = Harness::new();
    let tenant = TenantId::new();
    let auth = h.bearer(&tenant);
    h.storage
        .files(tenant)
        .save_upload("", "a.txt", UploadPayload::Memory(b"a".to_vec()))
        .unwrap();

    let (status, json) = h
        .send_json(upload_request(
            "/api/files/upload?dir=a.txt",
            &auth,
            "file",
            "b.txt",
            b"b",
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["message"], "Not a directory: 'a.txt'");

    let (status, _) = h
        .send_json(post_json(
            "/api/files/mkdir?dir=a.txt",
            &auth,
            serde_json::json!({ "name": "sub" }),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = h.send_json(get("/api/files/a.txt/x", &auth)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
