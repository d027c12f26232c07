#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Value, json};
use tempfile::TempDir;

use keyline::auth::issue_token;
use keyline::config::ServerConfig;
use keyline::notify::{Mailer, Notifier, NotifyError, OutgoingEmail};
use keyline::realtime::MessageHub;
use keyline::server::{AppState, create_router};
use keyline::storage::FileStorage;
use keyline::store::{SqliteStore, Store};
use keyline::types::{ApprovalStatus, IntakeSubmission, Role, User};
use keyline::workflow::register_user;

/// A 1x1 PNG as a data URL, enough for signature validation.
pub const SIGNATURE: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Keeps every email instead of sending it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<Value, NotifyError> {
        self.sent.lock().unwrap().push(email.clone());
        Ok(json!({ "id": "test-email" }))
    }
}

impl RecordingMailer {
    pub fn subjects(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.subject.clone())
            .collect()
    }

    pub fn emails(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().unwrap().clone()
    }

    /// Notifications go out on background tasks, so wait for them to land.
    pub async fn wait_for(&self, count: usize) -> Vec<OutgoingEmail> {
        for _ in 0..100 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        self.emails()
    }
}

/// The real router served in-process on an ephemeral port.
pub struct TestServer {
    pub temp_dir: TempDir,
    pub base_url: String,
    pub admin_token: String,
    pub admin: User,
    pub store: Arc<dyn Store>,
    pub mailer: Arc<RecordingMailer>,
    pub client: reqwest::Client,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    pub async fn start() -> Self {
        let temp_dir = TempDir::new().expect("create temp dir");
        let config = ServerConfig::load(temp_dir.path()).expect("load config");

        let sqlite = SqliteStore::new(config.db_path()).expect("open store");
        sqlite.initialize().expect("initialize store");
        let store: Arc<dyn Store> = Arc::new(sqlite);

        let admin = register_user(
            store.as_ref(),
            "studio@example.com",
            Role::Admin,
            Some("Studio Admin".to_string()),
            None,
        )
        .expect("create admin");
        let (admin_token, _) = issue_token(store.as_ref(), admin.id(), None).expect("issue token");

        let mailer = Arc::new(RecordingMailer::default());
        let notifier = Arc::new(Notifier::new(
            store.clone(),
            mailer.clone(),
            &config.notify,
        ));

        let state = Arc::new(AppState {
            store: store.clone(),
            storage: FileStorage::new(&config.data_dir),
            hub: MessageHub::new(),
            notifier,
            config,
        });

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let port = listener.local_addr().expect("local addr").port();
        let app = create_router(state);
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });

        Self {
            temp_dir,
            base_url: format!("http://127.0.0.1:{port}"),
            admin_token,
            admin,
            store,
            mailer,
            client: reqwest::Client::new(),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token)
    }

    pub fn post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token)
    }

    pub fn put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token)
    }

    pub fn patch(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.patch(self.url(path)).bearer_auth(token)
    }

    pub fn delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token)
    }

    /// Creates a client account with a pending onboarding row and a token.
    pub fn create_client(&self, email: &str, full_name: &str) -> (User, String) {
        let user = register_user(
            self.store.as_ref(),
            email,
            Role::Client,
            Some(full_name.to_string()),
            None,
        )
        .expect("create client");
        let (token, _) = issue_token(self.store.as_ref(), user.id(), None).expect("issue token");
        (user, token)
    }

    /// Client that has submitted intake and been approved, but has no contract yet.
    pub fn approved_client(&self, email: &str, full_name: &str) -> (User, String) {
        let (user, token) = self.create_client(email, full_name);
        let intake = IntakeSubmission {
            company_name: "Acme".to_string(),
            project_description: "Brand refresh".to_string(),
            ..Default::default()
        };
        self.store
            .submit_onboarding(user.id(), &intake, Utc::now())
            .expect("submit intake");
        self.store
            .set_approval_status(user.id(), ApprovalStatus::Approved, Some(Utc::now()))
            .expect("approve");
        (user, token)
    }

    /// Approved client with a signed contract and its project, sent through the API.
    pub async fn active_client(&self, email: &str, full_name: &str) -> (User, String, String) {
        let (user, token) = self.approved_client(email, full_name);

        let contract: Value = self
            .post("/api/v1/admin/contracts", &self.admin_token)
            .json(&json!({
                "client_id": user.id(),
                "title": "Website Redesign",
                "content": "Scope and terms",
                "project_name": "Website",
            }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let contract_id = contract["data"]["id"].as_str().unwrap().to_string();
        let project_id = contract["data"]["project_id"].as_str().unwrap().to_string();

        let res = self
            .post(&format!("/api/v1/contracts/{contract_id}/sign"), &token)
            .json(&json!({ "signature_data": SIGNATURE }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), 200);

        (user, token, project_id)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
