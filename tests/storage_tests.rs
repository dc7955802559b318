mod common;

use axum::http::{StatusCode, header};
use bytes::Bytes;
use common::{InMemoryRepository, MultipartBody, TestApp, admin_bearer, admin_delete, get};
use recruit_portal::storage::{
    CACHE_CONTROL, Folder, MediaStorage, MemoryObjectStore, StorageError,
};
use std::{collections::HashSet, sync::Arc};

// --- ADAPTER ---

#[tokio::test]
async fn upload_key_and_url_follow_the_folder_scheme() {
    let store = Arc::new(MemoryObjectStore::new());
    let media = MediaStorage::new(store.clone(), "uploads");

    let stored = media
        .upload(Bytes::from_static(b"%PDF"), "cv.pdf", "application/pdf", Folder::Applications)
        .await
        .unwrap();

    assert!(stored.filename.ends_with(".pdf"));
    assert_eq!(stored.object_path, format!("public/applications/{}", stored.filename));
    assert_eq!(stored.url, format!("/storage/applications/{}", stored.filename));

    let (data, content_type) = store.get(&stored.object_path).unwrap();
    assert_eq!(&data[..], b"%PDF");
    assert_eq!(content_type, "application/pdf");
}

#[tokio::test]
async fn same_name_uploads_get_distinct_keys() {
    let store = Arc::new(MemoryObjectStore::new());
    let media = MediaStorage::new(store.clone(), "uploads");

    let mut keys = HashSet::new();
    for _ in 0..20 {
        let stored = media
            .upload(Bytes::from_static(b"x"), "photo.png", "image/png", Folder::Content)
            .await
            .unwrap();
        keys.insert(stored.object_path);
    }
    assert_eq!(keys.len(), 20);
    assert_eq!(store.keys().len(), 20);
}

#[tokio::test]
async fn provider_failure_surfaces_as_provider_error() {
    let media = MediaStorage::new(Arc::new(MemoryObjectStore::new_failing()), "uploads");
    let err = media
        .upload(Bytes::from_static(b"x"), "a.png", "image/png", Folder::Uploads)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Provider(_)));
}

#[tokio::test]
async fn delete_maps_both_public_forms_to_the_same_key() {
    let store = Arc::new(MemoryObjectStore::new());
    let media = MediaStorage::new(store.clone(), "uploads");

    let a = media
        .upload(Bytes::from_static(b"a"), "a.png", "image/png", Folder::Content)
        .await
        .unwrap();
    let b = media
        .upload(Bytes::from_static(b"b"), "b.png", "image/png", Folder::Content)
        .await
        .unwrap();

    media.delete(&a.url).await;
    media
        .delete(&b.url.replacen("/storage/", "/objects/", 1))
        .await;

    assert!(!store.contains(&a.object_path));
    assert!(!store.contains(&b.object_path));
}

#[tokio::test]
async fn delete_never_fails() {
    // No bucket: silent no-op.
    MediaStorage::unconfigured("uploads")
        .delete("/storage/content/1-1.png")
        .await;

    // Provider failure: logged and swallowed.
    MediaStorage::new(Arc::new(MemoryObjectStore::new_failing()), "uploads")
        .delete("/storage/content/1-1.png")
        .await;

    // External URL: ignored.
    let store = Arc::new(MemoryObjectStore::new());
    MediaStorage::new(store.clone(), "uploads")
        .delete("https://cdn.example.com/x.png")
        .await;
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn legacy_upload_paths_are_removed_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("old.png");
    std::fs::write(&file, b"legacy").unwrap();

    let media = MediaStorage::unconfigured(dir.path());
    media.delete("/uploads/old.png").await;
    assert!(!file.exists());

    // Names with path separators are refused.
    let kept = dir.path().join("keep.txt");
    std::fs::write(&kept, b"keep").unwrap();
    media.delete("/uploads/../keep.txt").await;
    assert!(kept.exists());
}

// --- READ ROUTE ---

#[tokio::test]
async fn uploaded_image_streams_back_with_its_content_type() {
    let app = TestApp::new();
    let png = b"\x89PNG\r\n\x1a\nfake-image-bytes";

    let res = app
        .send(
            MultipartBody::new()
                .text("title", "Launch")
                .text("type", "news")
                .file("image", "photo.PNG", "image/png", png)
                .into_request("/api/content/upload", Some(&admin_bearer())),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let url = res.json()["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/storage/content/"));
    assert!(url.ends_with(".PNG"));

    let res = app.send(get(&url)).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header(header::CONTENT_TYPE), "image/png");
    assert_eq!(res.header(header::CACHE_CONTROL), CACHE_CONTROL);
    assert_eq!(res.header(header::CONTENT_LENGTH), png.len().to_string());
    assert_eq!(&res.body[..], png);
}

#[tokio::test]
async fn missing_object_is_404() {
    let app = TestApp::new();
    let res = app.send(get("/storage/content/nope.png")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.json()["message"], "File not found");
}

#[tokio::test]
async fn unknown_folder_is_404() {
    let app = TestApp::new();
    let res = app.send(get("/storage/secrets/1-1.png")).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn read_without_bucket_is_500() {
    let app = TestApp::without_storage();
    let res = app.send(get("/storage/content/1-1.png")).await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Object storage not configured");
}

#[tokio::test]
async fn upload_without_bucket_is_500_and_creates_no_row() {
    let app = TestApp::without_storage();
    let res = app
        .send(
            MultipartBody::new()
                .text("title", "Offer")
                .file("file", "offer.pdf", "application/pdf", b"%PDF")
                .into_request("/api/templates/upload", Some(&admin_bearer())),
        )
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Object storage not configured");
    assert!(app.repo.tables().templates.is_empty());
}

#[tokio::test]
async fn provider_failure_on_upload_is_a_generic_500() {
    let app = TestApp::build(
        InMemoryRepository::new(),
        Some(MemoryObjectStore::new_failing()),
        "uploads",
    );
    let res = app
        .send(
            MultipartBody::new()
                .text("fullName", "Ada")
                .text("title", "Engineer")
                .text("bio", "Vetted")
                .file("image", "ada.jpg", "image/jpeg", b"jpg")
                .into_request("/api/verified-candidates/upload", Some(&admin_bearer())),
        )
        .await;
    assert_eq!(res.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.json()["message"], "Server error");
}

#[tokio::test]
async fn disallowed_mime_type_is_rejected_before_storing() {
    let app = TestApp::new();
    let res = app
        .send(
            MultipartBody::new()
                .text("title", "Script")
                .file("file", "x.html", "text/html", b"<script>")
                .into_request("/api/templates/upload", Some(&admin_bearer())),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(app.store().keys().is_empty());
}

#[tokio::test]
async fn deleting_a_template_removes_its_object() {
    let app = TestApp::new();
    let res = app
        .send(
            MultipartBody::new()
                .text("title", "Offer")
                .file("file", "offer.docx", "application/vnd.openxmlformats-officedocument.wordprocessingml.document", b"PK")
                .into_request("/api/templates/upload", Some(&admin_bearer())),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);
    let body = res.json();
    assert_eq!(body["fileType"], "docx");
    assert_eq!(app.store().keys().len(), 1);

    let id = body["id"].as_i64().unwrap();
    let res = app.send(admin_delete(&format!("/api/templates/{id}"))).await;
    assert_eq!(res.status, StatusCode::NO_CONTENT);
    assert!(app.store().keys().is_empty());
}
