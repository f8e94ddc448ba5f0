use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

/// Accept any JSON for the field and keep it only when it has the expected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| serde_json::from_value(v).ok()))
}

/// Which verification step produced a session item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPath {
    Liveness,
    Enrollment3d,
    Match3d2dIdScan,
    Unrecognized(String),
}

impl From<&str> for SessionPath {
    fn from(path: &str) -> Self {
        match path {
            "/liveness" | "/liveness-3d" => SessionPath::Liveness,
            "/enrollment-3d" => SessionPath::Enrollment3d,
            "/match-3d-2d-idscan" => SessionPath::Match3d2dIdScan,
            other => SessionPath::Unrecognized(other.to_string()),
        }
    }
}

impl fmt::Display for SessionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPath::Liveness => f.write_str("/liveness"),
            SessionPath::Enrollment3d => f.write_str("/enrollment-3d"),
            SessionPath::Match3d2dIdScan => f.write_str("/match-3d-2d-idscan"),
            SessionPath::Unrecognized(path) => f.write_str(path),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HttpCallInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallData {
    pub date: Option<Value>,
}

/// One record written by the verification backend for a single call.
///
/// Every field is optional; the aggregator fills in defaults for whatever is missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionItem {
    #[serde(default, deserialize_with = "lenient")]
    pub http_call_info: Option<HttpCallInfo>,
    #[serde(
        rename = "externalDatabaseRefID",
        default,
        deserialize_with = "lenient"
    )]
    pub external_database_ref_id: Option<String>,
    pub result: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub call_data: Option<CallData>,
    pub additional_session_data: Option<Value>,
    pub age_estimation: Option<Value>,
    pub id_scan_results_so_far: Option<Value>,
    pub data: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub success: Option<bool>,
}

impl SessionItem {
    /// The path exactly as stored; missing or non-string paths read as "".
    pub fn raw_path(&self) -> &str {
        self.http_call_info
            .as_ref()
            .and_then(|info| info.path.as_deref())
            .unwrap_or_default()
    }

    /// A missing path reads as the empty string, which is unrecognized.
    pub fn path(&self) -> SessionPath {
        SessionPath::from(self.raw_path())
    }

    pub fn date(&self) -> Option<Value> {
        self.call_data.as_ref().and_then(|c| c.date.clone())
    }

    pub fn audit_trail_image(&self) -> String {
        self.result
            .as_ref()
            .and_then(|r| r.get("auditTrailImage"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Look up a key inside the nested `data` blob.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.as_ref().and_then(|d| d.get(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_known_paths() {
        assert_eq!(SessionPath::from("/liveness"), SessionPath::Liveness);
        assert_eq!(SessionPath::from("/liveness-3d"), SessionPath::Liveness);
        assert_eq!(SessionPath::from("/enrollment-3d"), SessionPath::Enrollment3d);
        assert_eq!(
            SessionPath::from("/match-3d-2d-idscan"),
            SessionPath::Match3d2dIdScan
        );
        assert_eq!(
            SessionPath::from("/unknown-path"),
            SessionPath::Unrecognized("/unknown-path".to_string())
        );
    }

    #[test]
    fn deserializes_sparse_item() {
        let item: SessionItem = serde_json::from_value(json!({
            "httpCallInfo": { "path": "/enrollment-3d" },
            "externalDatabaseRefID": "abc123"
        }))
        .unwrap();

        assert_eq!(item.path(), SessionPath::Enrollment3d);
        assert_eq!(item.external_database_ref_id.as_deref(), Some("abc123"));
        assert!(item.result.is_none());
        assert!(item.date().is_none());
        assert_eq!(item.audit_trail_image(), "");
    }

    #[test]
    fn mistyped_fields_read_as_absent() {
        let item: SessionItem = serde_json::from_value(json!({
            "httpCallInfo": { "path": 5 },
            "externalDatabaseRefID": 42,
            "callData": "yesterday",
            "success": "true"
        }))
        .unwrap();

        assert_eq!(item.path(), SessionPath::Unrecognized(String::new()));
        assert!(item.external_database_ref_id.is_none());
        assert!(item.date().is_none());
        assert!(item.success.is_none());

        let item: SessionItem = serde_json::from_value(json!({
            "httpCallInfo": "/liveness",
            "success": 1
        }))
        .unwrap();
        assert_eq!(item.path(), SessionPath::Unrecognized(String::new()));
        assert!(item.success.is_none());
    }

    #[test]
    fn raw_path_keeps_liveness_variant() {
        let item: SessionItem = serde_json::from_value(json!({
            "httpCallInfo": { "path": "/liveness-3d" }
        }))
        .unwrap();

        assert_eq!(item.path(), SessionPath::Liveness);
        assert_eq!(item.raw_path(), "/liveness-3d");
    }

    #[test]
    fn missing_call_info_is_unrecognized() {
        let item = SessionItem::default();
        assert_eq!(item.path(), SessionPath::Unrecognized(String::new()));
    }
}
