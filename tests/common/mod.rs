//! Shared helpers for the HTTP integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;

use voice_audio_api::profile::collections;
use voice_audio_api::serve::{build_router, AppState};
use voice_audio_api::storage::LocalStorage;
use voice_audio_api::store::AssetStore;

pub const TEST_UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

/// A running API server backed by a temporary SQLite file and upload directory
pub struct TestServer {
    pub url: String,
    pub store: AssetStore,
    pub upload_dir: PathBuf,
    _db_guard: tempfile::TempDir,
    _upload_guard: tempfile::TempDir,
    _handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url, path)
    }

    /// Names of the files currently in the upload directory
    pub fn stored_files(&self) -> Vec<String> {
        list_files(&self.upload_dir)
    }
}

pub fn list_files(dir: &Path) -> Vec<String> {
    match std::fs::read_dir(dir) {
        Ok(entries) => {
            let mut names: Vec<String> = entries
                .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                .collect();
            names.sort();
            names
        }
        Err(_) => Vec::new(),
    }
}

pub async fn start_test_server() -> TestServer {
    start_test_server_with_limit(TEST_UPLOAD_LIMIT).await
}

/// Start the full router on an ephemeral port
pub async fn start_test_server_with_limit(max_upload_bytes: usize) -> TestServer {
    let (pool, db_guard) = voice_audio_api::db::create_test_connection_in_temporary_file()
        .await
        .unwrap();
    let store = AssetStore::Sqlite(pool);
    store.init_schema(&collections()).await.unwrap();

    // Upload dir does not exist yet; the upload handler creates it
    let upload_guard = tempfile::tempdir().unwrap();
    let upload_dir = upload_guard.path().join("public").join("uploads").join("audio");
    let storage = LocalStorage::new(upload_dir.clone(), "/uploads/audio");

    let state = Arc::new(AppState {
        store: store.clone(),
        storage,
    });
    let app = build_router(state, max_upload_bytes);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let url = format!("http://{}", addr);

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

    TestServer {
        url,
        store,
        upload_dir,
        _db_guard: db_guard,
        _upload_guard: upload_guard,
        _handle: handle,
    }
}

/// Multipart form with an `audioFile` part and a `language` value
pub fn audio_form(file_name: &str, data: &[u8], language: &str) -> reqwest::multipart::Form {
    let part = reqwest::multipart::Part::bytes(data.to_vec())
        .file_name(file_name.to_string())
        .mime_str("audio/mpeg")
        .unwrap();
    reqwest::multipart::Form::new()
        .part("audioFile", part)
        .text("language", language.to_string())
}

/// Upload through `route` and return the stored URL
pub async fn upload(server: &TestServer, route: &str, file_name: &str, language: &str) -> String {
    let response = reqwest::Client::new()
        .post(server.endpoint(route))
        .multipart(audio_form(file_name, b"fake audio bytes", language))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201, "Upload should return 201 Created");

    let body: serde_json::Value = response.json().await.unwrap();
    body["url"].as_str().unwrap().to_string()
}
