#![allow(dead_code)]

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{json, Value};
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tempfile::TempDir;

use shop_backend::audit::{AuditClient, AuditError, HttpAuditClient, LogItem, TracingAuditClient};
use shop_backend::config::AdminSeed;
use shop_backend::entities::setup_schema;
use shop_backend::storage::MemoryStorage;
use shop_backend::{create_api_router, AppState, Config};

pub const ADMIN_EMAIL: &str = "admin@shop.test";
pub const ADMIN_PASSWORD: &str = "admin-password";
pub const BUCKET_URL: &str = "https://host";

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub db: Arc<DatabaseConnection>,
    pub storage: Arc<MemoryStorage>,
    pub staging_dir: PathBuf,
    _dir: TempDir,
}

/// Knobs for [`spawn_app_with`].
pub struct Settings {
    pub audit: Arc<dyn AuditClient>,
    pub upload_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            audit: Arc::new(TracingAuditClient),
            upload_timeout: Duration::from_secs(30),
        }
    }
}

/// Serves the full router on an ephemeral port, backed by a fresh sqlite
/// file and an in-memory bucket.
pub async fn spawn_app() -> TestApp {
    spawn_app_with(Settings::default()).await
}

pub async fn spawn_app_with(settings: Settings) -> TestApp {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let staging_dir = dir.path().join("staging");

    let config = Config {
        database_url: format!("sqlite://{}?mode=rwc", dir.path().join("shop.db").display()),
        bind_addr: "127.0.0.1:0".to_owned(),
        secret: "test-secret".to_owned(),
        password_pepper: "test-pepper".to_owned(),
        token_ttl: chrono::Duration::hours(1),
        storage_dir: dir.path().join("bucket"),
        public_url: "http://localhost".to_owned(),
        staging_dir: staging_dir.clone(),
        upload_timeout: settings.upload_timeout,
        audit_url: None,
        admin: Some(AdminSeed {
            email: ADMIN_EMAIL.to_owned(),
            password: ADMIN_PASSWORD.to_owned(),
        }),
    };

    let db = Database::connect(&config.database_url)
        .await
        .expect("Failed to connect to sqlite");
    setup_schema(&db).await.expect("Failed to create schema");

    let db = Arc::new(db);
    let storage = Arc::new(MemoryStorage::new(BUCKET_URL));
    let state = AppState::new(&config, db.clone(), storage.clone(), settings.audit);
    if let Some(seed) = &config.admin {
        state.auth.ensure_admin(seed).await.expect("Failed to seed admin");
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind");
    let address = format!("http://{}", listener.local_addr().expect("No local addr"));
    tokio::spawn(async move {
        axum::serve(listener, create_api_router(state))
            .await
            .expect("Server failed");
    });

    TestApp {
        address,
        client: Client::new(),
        db,
        storage,
        staging_dir,
        _dir: dir,
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/auth/sign-up"))
            .json(&json!({
                "name": "Ann",
                "surname": "Lee",
                "email": email,
                "phone": "+100000000",
                "password": password
            }))
            .send()
            .await
            .expect("Failed to send sign-up request")
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Response {
        self.client
            .post(self.url("/auth/sign-in"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to send sign-in request")
    }

    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let body: Value = self
            .sign_in(email, password)
            .await
            .json()
            .await
            .expect("Failed to parse sign-in response");
        body["access_token"]
            .as_str()
            .expect("Token not found in sign-in response")
            .to_owned()
    }

    pub async fn admin_token(&self) -> String {
        self.token_for(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Signs up a plain user and returns their token.
    pub async fn user_token(&self) -> String {
        self.sign_up("user@shop.test", "user-password").await;
        self.token_for("user@shop.test", "user-password").await
    }

    pub async fn create_product(&self, token: &str, body: Value) -> String {
        let response = self
            .client
            .post(self.url("/api/products"))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .expect("Failed to send create product request");
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        let body: Value = response.json().await.expect("Failed to parse create response");
        body["id"].as_str().expect("No id in create response").to_owned()
    }

    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request");
        let status = response.status();
        let body = response.json().await.expect("Failed to parse response");
        (status, body)
    }

    pub async fn upload(
        &self,
        token: &str,
        product_id: Option<&str>,
        file: Option<(&str, Vec<u8>)>,
    ) -> Response {
        let mut form = multipart::Form::new();
        if let Some(product_id) = product_id {
            form = form.text("productId", product_id.to_owned());
        }
        if let Some((name, data)) = file {
            form = form.part("file", multipart::Part::bytes(data).file_name(name.to_owned()));
        }

        self.client
            .post(self.url("/api/file/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .expect("Failed to send upload request")
    }

    /// Files left in the staging directory.
    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(&self.staging_dir)
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}

/// Audit sidecar that is never reachable. Counts the attempts.
pub struct UnreachableAudit {
    inner: HttpAuditClient,
    attempts: AtomicUsize,
}

impl UnreachableAudit {
    pub fn new() -> Self {
        // Nothing listens on a port whose listener was already dropped.
        let addr = std::net::TcpListener::bind("127.0.0.1:0")
            .and_then(|listener| listener.local_addr())
            .expect("Failed to reserve a port");
        Self {
            inner: HttpAuditClient::new(format!("http://{addr}/audit"), Duration::from_secs(1))
                .expect("Failed to build audit client"),
            attempts: AtomicUsize::new(0),
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AuditClient for UnreachableAudit {
    async fn record(&self, item: LogItem) -> Result<(), AuditError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.inner.record(item).await
    }
}

pub async fn message(response: Response) -> String {
    let body: Value = response.json().await.expect("Failed to parse error body");
    body["message"].as_str().unwrap_or_default().to_owned()
}

/// PNG signature followed by an IDAT chunk header, padded to `len` bytes.
pub fn png(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0, b'I', b'D', b'A', b'T'];
    data.resize(len, 0);
    data
}

pub fn jpeg() -> Vec<u8> {
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F', 0];
    data.resize(256, 0);
    data
}

pub fn webp() -> Vec<u8> {
    let mut data = b"RIFF\x24\0\0\0WEBPVP8 ".to_vec();
    data.resize(256, 0);
    data
}

pub fn pdf() -> Vec<u8> {
    b"%PDF-1.7\n%\xE2\xE3\xCF\xD3\n1 0 obj\n<<>>\nendobj\n".to_vec()
}
