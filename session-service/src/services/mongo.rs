use crate::models::SessionItem;
use crate::services::store::SessionStore;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::IndexOptions,
    Client as MongoClient, Collection, IndexModel,
};
use serde_json::Value;
use service_core::error::AppError;

/// Session items stored as documents, one per verification call.
#[derive(Clone)]
pub struct MongoSessionStore {
    client: MongoClient,
    collection: Collection<Document>,
}

impl MongoSessionStore {
    pub async fn connect(uri: &str, database: &str, collection: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, collection = %collection, "Connecting to MongoDB");
        let client = MongoClient::with_uri_str(uri).await.map_err(|e| {
            tracing::error!("Failed to connect to MongoDB: {}", e);
            AppError::from(e)
        })?;
        let collection = client.database(database).collection(collection);
        tracing::info!(database = %database, "Successfully connected to MongoDB database");
        Ok(Self { client, collection })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        let reference_index = IndexModel::builder()
            .keys(doc! { "externalDatabaseRefID": 1 })
            .options(
                IndexOptions::builder()
                    .name("external_reference_lookup".to_string())
                    .build(),
            )
            .build();

        self.collection
            .create_index(reference_index, None)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create externalDatabaseRefID index: {}", e);
                AppError::from(e)
            })?;
        tracing::info!("Created index on sessions.externalDatabaseRefID");

        Ok(())
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn find_by_reference(&self, reference: &str) -> Result<Vec<SessionItem>, AppError> {
        let cursor = self
            .collection
            .find(doc! { "externalDatabaseRefID": reference }, None)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;

        documents
            .into_iter()
            .map(|document| {
                serde_json::from_value(bson_to_json(Bson::Document(document))).map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Malformed session document: {}", e))
                })
            })
            .collect()
    }

    async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::from(e)
            })?;
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "mongodb"
    }
}

/// Convert a BSON value into plain JSON, with datetimes as RFC 3339 strings and
/// object ids as hex.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::Document(document) => Value::Object(
            document
                .into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::DateTime(date) => date
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(date.timestamp_millis())),
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{oid::ObjectId, DateTime};
    use serde_json::json;

    #[test]
    fn converts_datetimes_and_object_ids() {
        let id = ObjectId::new();
        let date = DateTime::from_millis(1_704_067_200_000);
        let document = doc! {
            "_id": id,
            "externalDatabaseRefID": "abc123",
            "callData": { "date": date },
            "success": true,
            "result": { "auditTrailImage": "img.png", "scores": [1, 2] },
        };

        let value = bson_to_json(Bson::Document(document));

        assert_eq!(value["_id"], Value::String(id.to_hex()));
        assert_eq!(value["callData"]["date"], "2024-01-01T00:00:00Z");
        assert_eq!(value["success"], true);
        assert_eq!(value["result"]["scores"], json!([1, 2]));
    }

    #[test]
    fn converted_document_reads_as_session_item() {
        let document = doc! {
            "httpCallInfo": { "path": "/liveness-3d" },
            "externalDatabaseRefID": "abc123",
            "success": false,
        };

        let item: SessionItem =
            serde_json::from_value(bson_to_json(Bson::Document(document))).unwrap();
        assert_eq!(item.external_database_ref_id.as_deref(), Some("abc123"));
        assert_eq!(item.success, Some(false));
    }

    #[test]
    fn mistyped_document_still_reads_as_session_item() {
        let document = doc! {
            "httpCallInfo": { "path": "/liveness" },
            "externalDatabaseRefID": "abc123",
            "success": 1,
        };
        let item: SessionItem =
            serde_json::from_value(bson_to_json(Bson::Document(document))).unwrap();
        assert!(item.success.is_none());

        let document = doc! {
            "httpCallInfo": { "path": 5 },
            "externalDatabaseRefID": "abc123",
        };
        let item: SessionItem =
            serde_json::from_value(bson_to_json(Bson::Document(document))).unwrap();
        assert_eq!(item.raw_path(), "");
    }
}
