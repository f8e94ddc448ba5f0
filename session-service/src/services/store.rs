//! Storage abstraction for session items.
//!
//! The service only ever reads; each backend answers one question: which items
//! belong to a given external reference, in the store's natural order.

use crate::models::SessionItem;
use async_trait::async_trait;
use service_core::error::AppError;

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// All items whose `externalDatabaseRefID` equals `reference`, in fetch order.
    async fn find_by_reference(&self, reference: &str) -> Result<Vec<SessionItem>, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;

    fn backend(&self) -> &'static str;
}
