use crate::models::SessionItem;
use serde::Serialize;
use serde_json::{Map, Value};

/// The fixed three-slot body returned by `GET /dbservice/{reference}`.
///
/// Empty slots serialize as `null`; the key set never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregateResponse {
    pub liveness: Option<LivenessResult>,
    pub enrollment3d: Option<EnrollmentResult>,
    #[serde(rename = "match3d2dIdscan")]
    pub match3d2d_idscan: Option<IdScanMatchResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessResult {
    pub date: Option<Value>,
    pub additional_session_data: Option<Value>,
    pub result: Option<Value>,
    pub audit_trail_image: String,
    pub age_estimation: Option<Value>,
    pub success: bool,
}

impl From<&SessionItem> for LivenessResult {
    fn from(item: &SessionItem) -> Self {
        Self {
            date: item.date(),
            additional_session_data: item.additional_session_data.clone(),
            result: item.result.clone(),
            audit_trail_image: item.audit_trail_image(),
            age_estimation: item.age_estimation.clone(),
            success: item.success.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollmentResult {
    pub date: Option<Value>,
    pub additional_session_data: Option<Value>,
    pub result: Option<Value>,
    #[serde(rename = "externalDatabaseRefID")]
    pub external_database_ref_id: Option<String>,
    pub audit_trail_image: String,
    pub success: bool,
}

impl From<&SessionItem> for EnrollmentResult {
    fn from(item: &SessionItem) -> Self {
        Self {
            date: item.date(),
            additional_session_data: item.additional_session_data.clone(),
            result: item.result.clone(),
            external_database_ref_id: item.external_database_ref_id.clone(),
            audit_trail_image: item.audit_trail_image(),
            success: item.success.unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdScanMatchResult {
    #[serde(rename = "idScanResultsSoFar")]
    pub id_scan_results_so_far: Option<Value>,
    #[serde(rename = "templateInfo")]
    pub template_info: Value,
    #[serde(rename = "photoIDTamperingEvidenceFrontImage")]
    pub tampering_evidence_front_image: Value,
    #[serde(rename = "photoIDTamperingEvidenceBackImage")]
    pub tampering_evidence_back_image: Value,
    #[serde(rename = "userConfirmedExtractedData")]
    pub user_confirmed_extracted_data: Value,
    #[serde(rename = "photoIDSecondarySignatureCrop")]
    pub secondary_signature_crop: Value,
    #[serde(rename = "extractedNFCImage")]
    pub extracted_nfc_image: Value,
    #[serde(rename = "autoExtractedOCRData")]
    pub auto_extracted_ocr_data: Value,
    #[serde(rename = "photoIDPrimarySignatureCrop")]
    pub primary_signature_crop: Value,
    #[serde(rename = "photoIDFaceCrop")]
    pub face_crop: Value,
    #[serde(rename = "photoIDFrontImage")]
    pub front_image: Value,
    #[serde(rename = "photoIDFrontCrop")]
    pub front_crop: Value,
    #[serde(rename = "photoIDBackImage")]
    pub back_image: Value,
    #[serde(rename = "photoIDBackCrop")]
    pub back_crop: Value,
}

impl From<&SessionItem> for IdScanMatchResult {
    fn from(item: &SessionItem) -> Self {
        let image = |key: &str| {
            item.data_field(key)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()))
        };
        let object = |key: &str| {
            item.data_field(key)
                .cloned()
                .unwrap_or_else(|| Value::Object(Map::new()))
        };

        Self {
            id_scan_results_so_far: item.id_scan_results_so_far.clone(),
            template_info: object("templateInfo"),
            tampering_evidence_front_image: image("photoIDTamperingEvidenceFrontImage"),
            tampering_evidence_back_image: image("photoIDTamperingEvidenceBackImage"),
            user_confirmed_extracted_data: object("userConfirmedExtractedData"),
            secondary_signature_crop: image("photoIDSecondarySignatureCrop"),
            extracted_nfc_image: image("extractedNFCImage"),
            auto_extracted_ocr_data: object("autoExtractedOCRData"),
            primary_signature_crop: image("photoIDPrimarySignatureCrop"),
            face_crop: image("photoIDFaceCrop"),
            front_image: image("photoIDFrontImage"),
            front_crop: image("photoIDFrontCrop"),
            back_image: image("photoIDBackImage"),
            back_crop: image("photoIDBackCrop"),
        }
    }
}
