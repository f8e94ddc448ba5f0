use crate::models::SessionItem;
use crate::services::store::SessionStore;
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// In-process store keeping items in insertion order; backs the router in tests.
#[derive(Default)]
pub struct InMemorySessionStore {
    items: RwLock<Vec<SessionItem>>,
    unavailable: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, item: SessionItem) {
        self.items.write().await.push(item);
    }

    /// Make every subsequent call fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "In-memory store marked unavailable"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn find_by_reference(&self, reference: &str) -> Result<Vec<SessionItem>, AppError> {
        self.ensure_available()?;
        Ok(self
            .items
            .read()
            .await
            .iter()
            .filter(|item| item.external_database_ref_id.as_deref() == Some(reference))
            .cloned()
            .collect())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.ensure_available()
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
