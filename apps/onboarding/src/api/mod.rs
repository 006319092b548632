//! Portal API client — the single point of entry for all backend HTTP calls.
//!
//! ARCHITECTURAL RULE: no other module may issue requests directly. The
//! workflow holds the API as `Arc<dyn PortalApi>`, so tests can swap in an
//! in-memory fake without touching session or coordinator code.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDate;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::OnboardingError;
use crate::models::{OfferStatus, SelectedCandidate, UploadedDocument};

/// Chunk size for streamed upload bodies. Small enough that progress moves
/// visibly on multi-megabyte files.
const UPLOAD_CHUNK_BYTES: usize = 64 * 1024;

// ────────────────────────────────────────────────────────────────────────────
// Session context
// ────────────────────────────────────────────────────────────────────────────

/// Explicit carrier for the auth token, passed to the client at construction.
///
/// The token has a set/clear lifecycle; it is never read from ambient state.
/// Candidate-facing endpoints work anonymously, so an empty context is valid.
#[derive(Clone, Debug, Default)]
pub struct SessionContext {
    token: Arc<RwLock<Option<String>>>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let ctx = Self::default();
        ctx.set_token(token);
        ctx
    }

    pub fn set_token(&self, token: impl Into<String>) {
        *self.token.write().expect("session token lock poisoned") = Some(token.into());
    }

    pub fn clear_token(&self) {
        *self.token.write().expect("session token lock poisoned") = None;
    }

    fn bearer(&self) -> Option<String> {
        self.token.read().expect("session token lock poisoned").clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Upload payloads and progress
// ────────────────────────────────────────────────────────────────────────────

/// An in-memory file selected for upload.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub file_name: String,
    /// Declared MIME type; validated against the allowed set before any
    /// network call.
    pub content_type: String,
    pub bytes: Bytes,
}

impl FileUpload {
    /// Reads a file from disk, sniffing the content type from its bytes.
    ///
    /// Unrecognized content falls back to `application/octet-stream`, which
    /// the coordinator's type check then rejects with the user-facing
    /// message.
    pub async fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, OnboardingError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| OnboardingError::Validation(format!("Could not read file: {e}")))?;
        let content_type = infer::get(&bytes)
            .map(|kind| kind.mime_type().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        Ok(FileUpload {
            file_name,
            content_type,
            bytes: Bytes::from(bytes),
        })
    }
}

/// Everything the backend's multipart upload endpoint needs.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub selected_candidate_id: Uuid,
    pub document_type: String,
    pub document_name: String,
    pub file: FileUpload,
}

/// Progress handle for one upload slot, 0–100.
///
/// `report` is a `fetch_max`, so progress is monotonically non-decreasing for
/// the lifetime of an upload no matter who reports; only `reset` moves it
/// back to zero (new upload, or failure).
#[derive(Clone, Debug, Default)]
pub struct SlotProgress(Arc<AtomicU8>);

impl SlotProgress {
    pub fn report(&self, percent: u8) {
        self.0.fetch_max(percent.min(100), Ordering::Relaxed);
    }

    pub fn value(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// The backend REST contract as consumed by the workflow.
///
/// Carried as `Arc<dyn PortalApi>` so the session and resolver are testable
/// against an in-memory fake.
#[async_trait]
pub trait PortalApi: Send + Sync {
    async fn get_candidate(&self, id: Uuid) -> Result<SelectedCandidate, OnboardingError>;

    /// 404 from the backend maps to `OnboardingError::NotFound`.
    async fn find_candidate_by_email(
        &self,
        email: &str,
    ) -> Result<SelectedCandidate, OnboardingError>;

    async fn update_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
        offer_accepted_date: Option<NaiveDate>,
    ) -> Result<SelectedCandidate, OnboardingError>;

    async fn list_documents(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<UploadedDocument>, OnboardingError>;

    async fn upload_document(
        &self,
        request: UploadRequest,
        progress: SlotProgress,
    ) -> Result<UploadedDocument, OnboardingError>;

    async fn delete_document(&self, document_id: Uuid) -> Result<(), OnboardingError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HTTP implementation
// ────────────────────────────────────────────────────────────────────────────

/// The reqwest-backed `PortalApi` implementation.
#[derive(Clone)]
pub struct PortalClient {
    client: Client,
    base_url: String,
    session: SessionContext,
}

impl PortalClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64, session: SessionContext) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            session,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.bearer() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Status triage plus typed decode. Non-2xx bodies are mined for the
    /// backend's error envelope; 404 becomes `NotFound` so callers can route
    /// it (identity lookup misses are a normal state transition, not a
    /// failure of the session).
    async fn read_json<T: DeserializeOwned>(
        &self,
        response: Response,
    ) -> Result<T, OnboardingError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Portal API returned {status}: {body}");
            return Err(error_from_response(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| OnboardingError::Decode(e.to_string()))
    }

    async fn read_empty(&self, response: Response) -> Result<(), OnboardingError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Portal API returned {status}: {body}");
            return Err(error_from_response(status.as_u16(), &body));
        }
        Ok(())
    }
}

#[async_trait]
impl PortalApi for PortalClient {
    async fn get_candidate(&self, id: Uuid) -> Result<SelectedCandidate, OnboardingError> {
        debug!("GET candidate {id}");
        let response = self
            .authed(self.client.get(self.url(&format!("/selected-candidates/{id}"))))
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn find_candidate_by_email(
        &self,
        email: &str,
    ) -> Result<SelectedCandidate, OnboardingError> {
        debug!("GET candidate by email");
        let response = self
            .authed(
                self.client
                    .get(self.url(&format!("/selected-candidates/by-email/{email}"))),
            )
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn update_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
        offer_accepted_date: Option<NaiveDate>,
    ) -> Result<SelectedCandidate, OnboardingError> {
        debug!("PUT candidate {id} status {status:?}");
        let response = self
            .authed(self.client.put(self.url(&format!("/selected-candidates/{id}"))))
            .json(&serde_json::json!({
                "status": status,
                "offerAcceptedDate": offer_accepted_date,
            }))
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn list_documents(
        &self,
        candidate_id: Uuid,
    ) -> Result<Vec<UploadedDocument>, OnboardingError> {
        debug!("GET documents for candidate {candidate_id}");
        let response = self
            .authed(
                self.client
                    .get(self.url(&format!("/candidate-documents/candidate/{candidate_id}"))),
            )
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn upload_document(
        &self,
        request: UploadRequest,
        progress: SlotProgress,
    ) -> Result<UploadedDocument, OnboardingError> {
        let total = request.file.bytes.len() as u64;
        debug!(
            "POST upload '{}' ({} bytes) as {}",
            request.document_name, total, request.document_type
        );

        // Stream the file in chunks so the slot's progress advances as the
        // body goes out. Hold at 99 until the server confirms; the
        // coordinator reports 100 on success.
        let mut sent: u64 = 0;
        let slot = progress.clone();
        let chunks: Vec<Bytes> = request
            .file
            .bytes
            .chunks(UPLOAD_CHUNK_BYTES)
            .map(Bytes::copy_from_slice)
            .collect();
        let stream = futures::stream::iter(chunks.into_iter().map(move |chunk| {
            sent += chunk.len() as u64;
            if total > 0 {
                slot.report((sent * 99 / total) as u8);
            }
            Ok::<Bytes, std::io::Error>(chunk)
        }));

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
            .file_name(request.file.file_name.clone())
            .mime_str(&request.file.content_type)?;

        let form = Form::new()
            .text("documentType", request.document_type.clone())
            .text(
                "selectedCandidateId",
                request.selected_candidate_id.to_string(),
            )
            .text("documentName", request.document_name.clone())
            .part("document", part);

        let response = self
            .authed(self.client.post(self.url("/candidate-documents/upload")))
            .multipart(form)
            .send()
            .await?;
        self.read_json(response).await
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), OnboardingError> {
        debug!("DELETE document {document_id}");
        let response = self
            .authed(
                self.client
                    .delete(self.url(&format!("/candidate-documents/{document_id}"))),
            )
            .send()
            .await?;
        self.read_empty(response).await
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Error envelope parsing
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct BareMessage {
    message: String,
}

/// Pulls the human-readable message out of an error body, tolerating the
/// standard `{"error": {"code", "message"}}` envelope, a bare `{"message"}`,
/// or plain text.
fn extract_error_message(body: &str) -> Option<String> {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body) {
        return Some(envelope.error.message);
    }
    if let Ok(bare) = serde_json::from_str::<BareMessage>(body) {
        return Some(bare.message);
    }
    let trimmed = body.trim();
    if trimmed.is_empty() || trimmed.starts_with('{') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn error_from_response(status: u16, body: &str) -> OnboardingError {
    let message = extract_error_message(body);
    if status == 404 {
        OnboardingError::NotFound(
            message.unwrap_or_else(|| "The requested record was not found".to_string()),
        )
    } else {
        OnboardingError::Server {
            status,
            message: message.unwrap_or_default(),
        }
    }
}
