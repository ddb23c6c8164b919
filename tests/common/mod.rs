// tests/common/mod.rs

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde_json::{Value, json};
use vitacare::{
    config::{Config, PaymentConfig},
    db::{InquiryStore, MemoryStore, OrderStore, SharedStore, UserStore},
    models::user::{NewUser, Role},
    routes,
    services::payment::HttpPaymentGateway,
    state::AppState,
    utils::hash::hash_password,
};

pub const PASSWORD: &str = "password123";

/// A running server plus handles the tests can inspect.
pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub store: Arc<MemoryStore>,
    /// Number of confirm requests the mock gateway has received.
    pub gateway_calls: Arc<AtomicUsize>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub fn gateway_calls(&self) -> usize {
        self.gateway_calls.load(Ordering::SeqCst)
    }

    /// Inserts a user directly and returns a bearer token for it.
    pub async fn user_with(&self, email: &str, role: Role, tweak: impl FnOnce(&mut NewUser)) -> (i64, String) {
        let mut user = NewUser::member(
            format!("Tester {email}"),
            email.to_string(),
            hash_password(PASSWORD).expect("hash"),
            None,
        );
        user.role = role;
        tweak(&mut user);
        let user = self.store.insert_user(user).await.expect("insert user");

        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request");
        assert_eq!(response.status().as_u16(), 200);
        let body: Value = response.json().await.expect("login body");
        let token = body["token"].as_str().expect("token").to_string();

        (user.id, token)
    }

    /// View count as stored, bypassing the HTTP gate.
    pub async fn store_inquiry_views(&self, id: i64) -> i64 {
        self.store
            .inquiry_by_id(id)
            .await
            .expect("store")
            .expect("inquiry exists")
            .view_count
    }

    /// Order status as stored.
    pub async fn stored_order_status(&self, id: i64) -> String {
        self.store
            .order_by_id(id)
            .await
            .expect("store")
            .expect("order exists")
            .status
            .to_string()
    }

    pub async fn member(&self, email: &str) -> (i64, String) {
        self.user_with(email, Role::User, |_| {}).await
    }

    pub async fn admin(&self, email: &str) -> (i64, String) {
        self.user_with(email, Role::Admin, |_| {}).await
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        token: Option<&str>,
        body: &Value,
    ) -> reqwest::Response {
        let mut request = self.client.request(method, self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.send(reqwest::Method::POST, path, token, body).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> reqwest::Response {
        self.send(reqwest::Method::PATCH, path, token, body).await
    }

    pub async fn delete(&self, path: &str, token: Option<&str>) -> reqwest::Response {
        let mut request = self.client.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request.send().await.expect("Failed to execute request")
    }
}

/// Confirm endpoint stand-in. Payment keys starting with `fail` are rejected.
async fn mock_confirm(
    State(calls): State<Arc<AtomicUsize>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    calls.fetch_add(1, Ordering::SeqCst);

    let key = body["paymentKey"].as_str().unwrap_or_default();
    if key.starts_with("fail") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "code": "REJECT_CARD_PAYMENT", "message": "card declined" })),
        );
    }
    (StatusCode::OK, Json(json!({ "status": "DONE", "paymentKey": key })))
}

async fn spawn_gateway() -> (SocketAddr, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/v1/payments/confirm", post(mock_confirm))
        .with_state(calls.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, calls)
}

/// App state over a fresh in-memory store, with the gateway client pointed at `confirm_url`.
pub fn test_state(confirm_url: String) -> (AppState, Arc<MemoryStore>) {
    let config = Config {
        database_url: "memory://".to_string(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        cors_origins: vec!["http://localhost:3000".to_string()],
        upload_dir: PathBuf::from("uploads"),
        admin_email: None,
        admin_password: None,
        payment: PaymentConfig {
            secret_key: "test_sk_mock".to_string(),
            confirm_url,
            timeout_secs: 5,
        },
    };

    let store = Arc::new(MemoryStore::new());
    let shared: SharedStore = store.clone();
    let gateway = HttpPaymentGateway::new(&config.payment).expect("gateway client");
    let state = AppState {
        store: shared,
        gateway: Arc::new(gateway),
        config,
    };

    (state, store)
}

/// Helper function to spawn the app on a random port for testing.
/// Uses the in-memory store and a local mock payment gateway.
pub async fn spawn_app() -> TestApp {
    // 1. Mock gateway
    let (gateway_addr, gateway_calls) = spawn_gateway().await;

    // 2. State
    let (state, store) = test_state(format!("http://{gateway_addr}/v1/payments/confirm"));
    let app = routes::create_router(state);

    // 3. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 4. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        store,
        gateway_calls,
    }
}
