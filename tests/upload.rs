mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};
use shop_backend::service::files::{MAX_FILE_NAME_LEN, MAX_UPLOAD_SIZE};
use shop_backend::entities::file::{FileStatus, FileType};
use shop_backend::storage::StorageCall;
use shop_backend::store::FileStore;
use std::time::Duration;

use common::{jpeg, message, pdf, png, spawn_app, spawn_app_with, webp, Settings, BUCKET_URL};

async fn image_url(response: reqwest::Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse upload response");
    body["image_url"]
        .as_str()
        .expect("No image_url in upload response")
        .to_owned()
}

#[tokio::test]
async fn allowed_images_are_stored_and_linked() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let cases = [
        ("photo.png", png(512), "image/png"),
        ("photo.jpg", jpeg(), "image/jpeg"),
        ("photo.webp", webp(), "image/webp"),
    ];

    for (name, data, content_type) in cases {
        let id = app
            .create_product(&token, json!({ "title": "T", "price": 100 }))
            .await;

        let response = app.upload(&token, Some(&id), Some((name, data))).await;
        assert_eq!(response.status(), StatusCode::OK, "{name}");
        let url = image_url(response).await;

        assert!(url.starts_with(&format!("{BUCKET_URL}/images/")), "{url}");
        assert!(url.ends_with(&format!(".{name}")), "{url}");

        let calls = app.storage.calls().await;
        assert!(
            matches!(
                calls.last(),
                Some(StorageCall::Upload { content_type: sent, .. }) if sent == content_type
            ),
            "{calls:?}"
        );

        let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
        assert_eq!(product["data"]["image"], url.as_str());
    }
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn pdf_is_refused_without_calling_storage() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, json!({ "title": "T", "price": 100 }))
        .await;

    let response = app.upload(&token, Some(&id), Some(("doc.png", pdf()))).await;

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(app.storage.calls().await.is_empty());
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn size_limit_is_inclusive() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, json!({ "title": "T", "price": 100 }))
        .await;

    let too_large = app
        .upload(&token, Some(&id), Some(("big.png", png(MAX_UPLOAD_SIZE + 1))))
        .await;
    assert_eq!(too_large.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(app.storage.calls().await.is_empty());
    assert_eq!(app.staged_files(), 0);

    let exact = app
        .upload(&token, Some(&id), Some(("big.png", png(MAX_UPLOAD_SIZE))))
        .await;
    assert_eq!(exact.status(), StatusCode::OK);
    assert!(matches!(
        app.storage.calls().await.as_slice(),
        [StorageCall::Upload { size, .. }] if *size == MAX_UPLOAD_SIZE as u64
    ));
}

#[tokio::test]
async fn very_long_file_name_is_shortened() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, json!({ "title": "T", "price": 100 }))
        .await;
    let name = format!("{}.png", "n".repeat(300));

    let response = app.upload(&token, Some(&id), Some((&name, png(64)))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let url = image_url(response).await;
    assert!(url.ends_with("n.png"), "{url}");
    let key_name = url.rsplit('/').next().unwrap_or_default();
    // `<file id>.<name>`
    assert!(key_name.len() <= 37 + MAX_FILE_NAME_LEN, "{key_name}");
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn previous_image_is_deleted_before_the_new_one_is_saved() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(
            &token,
            json!({ "title": "T", "price": 100, "image": "https://host/images/abc.png" }),
        )
        .await;

    let response = app
        .upload(&token, Some(&id), Some(("new.png", png(64))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let url = image_url(response).await;

    let calls = app.storage.calls().await;
    assert_eq!(calls.len(), 2, "{calls:?}");
    assert!(matches!(calls[0], StorageCall::Upload { .. }));
    assert_eq!(
        calls[1],
        StorageCall::Delete {
            key: "images/abc.png".to_owned()
        }
    );

    let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
    assert_eq!(product["data"]["image"], url.as_str());

    let records = FileStore::new(app.db.clone())
        .for_product(&id)
        .await
        .expect("Failed to load upload records");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].url, url);
    assert_eq!(records[0].name, "new.png");
    assert_eq!(records[0].kind, FileType::Image);
    assert_eq!(records[0].content_type, "image/png");
    assert_eq!(records[0].size, 64);
    assert_eq!(records[0].status, FileStatus::UploadedToStorage);
}

#[tokio::test]
async fn previous_url_without_an_object_name_is_not_deleted() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(
            &token,
            json!({ "title": "T", "price": 100, "image": "https://host/images/.." }),
        )
        .await;

    let response = app
        .upload(&token, Some(&id), Some(("new.png", png(64))))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let url = image_url(response).await;

    let calls = app.storage.calls().await;
    assert!(
        matches!(calls.as_slice(), [StorageCall::Upload { .. }]),
        "{calls:?}"
    );
    let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
    assert_eq!(product["data"]["image"], url.as_str());
}

#[tokio::test]
async fn failed_delete_of_previous_image_keeps_it_linked() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(
            &token,
            json!({ "title": "T", "price": 100, "image": "https://host/images/abc.png" }),
        )
        .await;
    app.storage.fail_deletes(true).await;

    let response = app
        .upload(&token, Some(&id), Some(("new.png", png(64))))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message(response).await, "internal server error");
    let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
    assert_eq!(product["data"]["image"], "https://host/images/abc.png");
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn product_id_is_required() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let missing = app.upload(&token, None, Some(("a.png", png(64)))).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    assert_eq!(message(missing).await, "select product id");

    let empty = app.upload(&token, Some(""), Some(("a.png", png(64)))).await;
    assert_eq!(empty.status(), StatusCode::BAD_REQUEST);

    let no_file = app.upload(&token, Some("p-1"), None).await;
    assert_eq!(no_file.status(), StatusCode::BAD_REQUEST);

    assert!(app.storage.calls().await.is_empty());
}

#[tokio::test]
async fn unknown_product_discards_the_new_object() {
    let app = spawn_app().await;
    let token = app.admin_token().await;

    let response = app
        .upload(&token, Some("missing"), Some(("a.png", png(64))))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let calls = app.storage.calls().await;
    let uploaded = match calls.first() {
        Some(StorageCall::Upload { key, .. }) => key.clone(),
        other => panic!("expected an upload first, got {other:?}"),
    };
    assert_eq!(calls.get(1), Some(&StorageCall::Delete { key: uploaded.clone() }));
    assert!(!app.storage.contains(&uploaded).await);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn storage_failure_is_recoverable() {
    let app = spawn_app().await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, json!({ "title": "T", "price": 100 }))
        .await;

    app.storage.fail_uploads(true).await;
    let failed = app.upload(&token, Some(&id), Some(("a.png", png(64)))).await;
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(app.staged_files(), 0);

    let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
    assert_eq!(product["data"]["image"], "");

    app.storage.fail_uploads(false).await;
    let retried = app.upload(&token, Some(&id), Some(("a.png", png(64)))).await;
    assert_eq!(retried.status(), StatusCode::OK);
    assert_eq!(app.staged_files(), 0);
}

#[tokio::test]
async fn stalled_storage_times_out_and_leaves_the_product_alone() {
    let app = spawn_app_with(Settings {
        upload_timeout: Duration::from_millis(50),
        ..Settings::default()
    })
    .await;
    let token = app.admin_token().await;
    let id = app
        .create_product(&token, json!({ "title": "T", "price": 100 }))
        .await;
    app.storage.stall_uploads(Some(Duration::from_millis(500))).await;

    let response = app
        .upload(&token, Some(&id), Some(("slow.png", png(64))))
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(message(response).await, "internal server error");
    let (_, product) = app.get_json(&format!("/api/products/{id}")).await;
    assert_eq!(product["data"]["image"], "");
    assert_eq!(app.staged_files(), 0);

    // The aborted task never reaches the bucket.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(app.storage.calls().await.is_empty());
}

#[tokio::test]
async fn upload_requires_an_admin() {
    let app = spawn_app().await;
    let user_token = app.user_token().await;

    let response = app
        .upload(&user_token, Some("p-1"), Some(("a.png", png(64))))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(response).await, "you don't have admin role");
    assert!(app.storage.calls().await.is_empty());
}
