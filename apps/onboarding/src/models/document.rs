use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Review outcome the backend has assigned to an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

/// A document the candidate has uploaded, as returned by
/// `GET /candidate-documents/candidate/{id}`.
///
/// The client holds a read-only projection of this record and refetches the
/// full list after every mutating action; it never merges locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    pub id: Uuid,
    /// Matches a `DocumentTypeSpec::key` from the active checklist.
    pub document_type: String,
    pub document_name: String,
    pub verification_status: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub uploaded_date: DateTime<Utc>,
}
