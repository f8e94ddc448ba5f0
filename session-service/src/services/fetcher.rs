use crate::models::SessionItem;
use crate::services::store::SessionStore;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

/// Reads the items of one verification session and turns "no items" into NotFound.
#[derive(Clone)]
pub struct SessionFetcher {
    store: Arc<dyn SessionStore>,
}

impl SessionFetcher {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self), fields(backend = self.store.backend()))]
    pub async fn fetch(&self, reference: &str) -> Result<Vec<SessionItem>, AppError> {
        if reference.trim().is_empty() {
            return Err(AppError::NotFound(anyhow::anyhow!("Session not found")));
        }

        let items = self.store.find_by_reference(reference).await.map_err(|e| {
            tracing::error!("Session lookup failed: {}", e);
            e
        })?;

        tracing::info!(count = items.len(), "Found session items");

        if items.is_empty() {
            return Err(AppError::NotFound(anyhow::anyhow!("Session not found")));
        }

        Ok(items)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::memory::InMemorySessionStore;

    fn item(reference: &str, path: &str) -> SessionItem {
        serde_json::from_value(serde_json::json!({
            "externalDatabaseRefID": reference,
            "httpCallInfo": { "path": path },
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn returns_items_in_insertion_order() {
        let store = Arc::new(InMemorySessionStore::new());
        store.insert(item("abc123", "/liveness")).await;
        store.insert(item("other", "/liveness")).await;
        store.insert(item("abc123", "/enrollment-3d")).await;

        let fetcher = SessionFetcher::new(store);
        let items = fetcher.fetch("abc123").await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].path().to_string(), "/liveness");
        assert_eq!(items[1].path().to_string(), "/enrollment-3d");
    }

    #[tokio::test]
    async fn empty_result_is_not_found() {
        let fetcher = SessionFetcher::new(Arc::new(InMemorySessionStore::new()));
        let err = fetcher.fetch("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn blank_reference_is_not_found() {
        let fetcher = SessionFetcher::new(Arc::new(InMemorySessionStore::new()));
        let err = fetcher.fetch("   ").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn store_failure_is_distinct_from_not_found() {
        let store = Arc::new(InMemorySessionStore::new());
        store.set_unavailable(true);

        let fetcher = SessionFetcher::new(store);
        let err = fetcher.fetch("abc123").await.unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
