//! Application startup and lifecycle management.

use crate::config::{SessionConfig, StoreConfig};
use crate::handlers;
use crate::services::{
    MongoSessionStore, PostgresSessionStore, ResponseAggregator, SessionFetcher, SessionStore,
};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    security_headers::security_headers_middleware,
    signature::{signature_validation_middleware, SignatureConfig},
    tracing::{request_id_middleware, REQUEST_ID_HEADER},
};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: SessionFetcher,
    pub aggregator: ResponseAggregator,
    pub signature_config: SignatureConfig,
}

impl AppState {
    pub fn new(config: &SessionConfig, store: Arc<dyn SessionStore>) -> Self {
        let signature_config = SignatureConfig::new(config.signature_secret.clone())
            .exclude("/health")
            .exclude("/ready")
            .exclude("/metrics");

        Self {
            fetcher: SessionFetcher::new(store),
            aggregator: ResponseAggregator::new(config.duplicate_policy),
            signature_config,
        }
    }
}

impl AsRef<SignatureConfig> for AppState {
    fn as_ref(&self) -> &SignatureConfig {
        &self.signature_config
    }
}

/// Connect the configured backend once; the client lives as long as the process.
pub async fn connect_store(config: &StoreConfig) -> Result<Arc<dyn SessionStore>, AppError> {
    match config {
        StoreConfig::MongoDb(mongo) => {
            let store = MongoSessionStore::connect(
                mongo.uri.expose_secret(),
                &mongo.database,
                &mongo.collection,
            )
            .await?;
            store.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
        StoreConfig::Postgres(postgres) => {
            let store = PostgresSessionStore::new(
                postgres.url.expose_secret(),
                &postgres.table,
                postgres.max_connections,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to PostgreSQL: {}", e);
                e
            })?;
            Ok(Arc::new(store))
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/dbservice/:reference", get(handlers::get_session))
        .layer(from_fn_with_state(
            state.clone(),
            signature_validation_middleware::<AppState>,
        ))
        .layer(from_fn(metrics_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: SessionConfig) -> Result<Self, AppError> {
        let store = connect_store(&config.store).await?;
        Self::with_store(config, store).await
    }

    /// Build around an already constructed store.
    pub async fn with_store(
        config: SessionConfig,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(&config, store);
        let router = build_router(state);

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Session service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run_until_stopped(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
