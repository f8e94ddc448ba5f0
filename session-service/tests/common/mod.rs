use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use session_service::config::{DuplicatePolicy, MongoConfig, SessionConfig, StoreConfig};
use session_service::models::SessionItem;
use session_service::services::InMemorySessionStore;
use session_service::startup::{build_router, AppState};
use std::sync::Arc;
use tower::ServiceExt;

pub const TEST_SECRET: &str = "test-shared-secret";

pub fn test_config(duplicate_policy: DuplicatePolicy) -> SessionConfig {
    SessionConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "error".to_string(),
        },
        store: StoreConfig::MongoDb(MongoConfig {
            uri: Secret::new("mongodb://localhost:27017".to_string()),
            database: "session_test".to_string(),
            collection: "sessions".to_string(),
        }),
        signature_secret: Secret::new(TEST_SECRET.to_string()),
        duplicate_policy,
        otlp_endpoint: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemorySessionStore>,
}

impl TestApp {
    pub fn spawn() -> Self {
        Self::with_policy(DuplicatePolicy::LastWins)
    }

    pub fn with_policy(duplicate_policy: DuplicatePolicy) -> Self {
        let store = Arc::new(InMemorySessionStore::new());
        let state = AppState::new(&test_config(duplicate_policy), store.clone());
        TestApp {
            router: build_router(state),
            store,
        }
    }

    pub async fn seed(&self, item: serde_json::Value) {
        let item: SessionItem = serde_json::from_value(item).expect("Invalid session item");
        self.store.insert(item).await;
    }

    /// Issue a GET and return the status with the body parsed as JSON (Null when empty).
    pub async fn get(&self, uri: &str, signature: Option<&str>) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(signature) = signature {
            builder = builder.header("X-Signature", signature);
        }

        let response = self
            .router
            .clone()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, body)
    }

    pub async fn lookup(&self, reference: &str) -> (StatusCode, serde_json::Value) {
        self.get(&format!("/dbservice/{}", reference), Some(TEST_SECRET))
            .await
    }
}
