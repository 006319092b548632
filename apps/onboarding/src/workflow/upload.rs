//! Upload Coordinator — per-document-type submission, precondition checks,
//! progress tracking, and error surfacing.
//!
//! Preconditions run before any network call: an invalid file never leaves
//! the client. Each document-type slot tracks its own progress and accepts
//! one upload at a time; distinct slots are fully independent.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::warn;
use uuid::Uuid;

use crate::api::{FileUpload, PortalApi, SlotProgress, UploadRequest};
use crate::errors::OnboardingError;
use crate::models::UploadedDocument;

/// 5MB, exactly.
pub const MAX_UPLOAD_BYTES: usize = 5_242_880;

pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/jpg",
    "image/png",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

pub const FILE_MISSING_MESSAGE: &str = "Please choose a file to upload";
pub const FILE_TOO_LARGE_MESSAGE: &str = "File size must be less than 5MB";
pub const FILE_TYPE_MESSAGE: &str = "File type must be PDF, JPG, JPEG, PNG, DOC, or DOCX";
pub const DELETE_UNCONFIRMED_MESSAGE: &str = "Deletion must be confirmed first";

/// Checks the upload preconditions, one specific message per violated rule.
pub fn validate_file(file: &FileUpload) -> Result<(), OnboardingError> {
    if file.bytes.is_empty() {
        return Err(OnboardingError::Validation(FILE_MISSING_MESSAGE.to_string()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(OnboardingError::Validation(FILE_TOO_LARGE_MESSAGE.to_string()));
    }
    let content_type = file.content_type.to_ascii_lowercase();
    if !ALLOWED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return Err(OnboardingError::Validation(FILE_TYPE_MESSAGE.to_string()));
    }
    Ok(())
}

#[derive(Default)]
struct Slot {
    progress: SlotProgress,
    in_flight: bool,
}

/// Coordinates uploads across the checklist's document-type slots.
#[derive(Default)]
pub struct UploadCoordinator {
    slots: Mutex<HashMap<String, Slot>>,
}

impl UploadCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current progress fraction (0–100) for a slot. Unknown slots read 0.
    pub fn progress(&self, document_type: &str) -> u8 {
        self.slots
            .lock()
            .expect("upload slot lock poisoned")
            .get(document_type)
            .map(|slot| slot.progress.value())
            .unwrap_or(0)
    }

    /// Marks the slot in-flight and resets its progress for the new upload.
    fn acquire(&self, document_type: &str) -> Result<SlotProgress, OnboardingError> {
        let mut slots = self.slots.lock().expect("upload slot lock poisoned");
        let slot = slots.entry(document_type.to_string()).or_default();
        if slot.in_flight {
            return Err(OnboardingError::UploadInFlight(document_type.to_string()));
        }
        slot.in_flight = true;
        slot.progress.reset();
        Ok(slot.progress.clone())
    }

    fn release(&self, document_type: &str) {
        let mut slots = self.slots.lock().expect("upload slot lock poisoned");
        if let Some(slot) = slots.get_mut(document_type) {
            slot.in_flight = false;
        }
    }

    /// Submits one document. On success the caller refetches the document
    /// list; on failure the slot's progress resets and the previously fetched
    /// state (including a rejected document awaiting replacement) stays as it
    /// was.
    pub async fn submit(
        &self,
        api: &dyn PortalApi,
        candidate_id: Uuid,
        document_type: &str,
        file: FileUpload,
    ) -> Result<UploadedDocument, OnboardingError> {
        validate_file(&file)?;
        let progress = self.acquire(document_type)?;

        let request = UploadRequest {
            selected_candidate_id: candidate_id,
            document_type: document_type.to_string(),
            document_name: file.file_name.clone(),
            file,
        };
        let result = api.upload_document(request, progress.clone()).await;

        match &result {
            Ok(_) => progress.report(100),
            Err(err) => {
                warn!("Upload failed for '{document_type}': {err}");
                progress.reset();
            }
        }
        self.release(document_type);
        result
    }

    /// Deletes a document. Gated on the explicit confirmation the UI
    /// collects; an unconfirmed call never reaches the network.
    pub async fn delete(
        &self,
        api: &dyn PortalApi,
        document_id: Uuid,
        confirmed: bool,
    ) -> Result<(), OnboardingError> {
        if !confirmed {
            return Err(OnboardingError::Validation(
                DELETE_UNCONFIRMED_MESSAGE.to_string(),
            ));
        }
        api.delete_document(document_id).await
    }
}
