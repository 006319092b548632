//! In-memory `PortalApi` fake for workflow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

use crate::api::{PortalApi, SlotProgress, UploadRequest};
use crate::errors::OnboardingError;
use crate::models::{OfferStatus, SelectedCandidate, UploadedDocument, VerificationStatus};

#[derive(Default)]
pub(crate) struct FakePortal {
    pub candidates: Mutex<Vec<SelectedCandidate>>,
    pub documents: Mutex<Vec<UploadedDocument>>,
    /// When set, uploads fail with a 422 carrying this message.
    pub reject_uploads: Mutex<Option<String>>,
    /// Artificial latency, so tests can interleave a reset with an in-flight
    /// call.
    pub list_latency: Mutex<Option<Duration>>,
    pub upload_latency: Mutex<Option<Duration>>,
    pub upload_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl FakePortal {
    pub fn with_candidate(candidate: SelectedCandidate) -> Self {
        let fake = FakePortal::default();
        fake.candidates.lock().unwrap().push(candidate);
        fake
    }
}

pub(crate) fn sample_candidate(email: &str) -> SelectedCandidate {
    SelectedCandidate {
        id: Uuid::new_v4(),
        full_name: "Asha Verma".to_string(),
        email: email.to_string(),
        phone: None,
        position: Some("Backend Engineer".to_string()),
        status: OfferStatus::OfferExtended,
        offer_accepted_date: None,
        created_at: Some(Utc::now()),
    }
}

pub(crate) fn sample_document(
    document_type: &str,
    status: VerificationStatus,
) -> UploadedDocument {
    UploadedDocument {
        id: Uuid::new_v4(),
        document_type: document_type.to_string(),
        document_name: format!("{document_type}.pdf"),
        verification_status: status,
        rejection_reason: match status {
            VerificationStatus::Rejected => Some("Document is illegible".to_string()),
            _ => None,
        },
        uploaded_date: Utc.with_ymd_and_hms(2026, 8, 1, 10, 0, 0).unwrap(),
    }
}

#[async_trait]
impl PortalApi for FakePortal {
    async fn get_candidate(&self, id: Uuid) -> Result<SelectedCandidate, OnboardingError> {
        self.candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| OnboardingError::NotFound(format!("Candidate {id} not found")))
    }

    async fn find_candidate_by_email(
        &self,
        email: &str,
    ) -> Result<SelectedCandidate, OnboardingError> {
        self.candidates
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned()
            .ok_or_else(|| {
                OnboardingError::NotFound(
                    "No candidate record matches this email address".to_string(),
                )
            })
    }

    async fn update_offer_status(
        &self,
        id: Uuid,
        status: OfferStatus,
        offer_accepted_date: Option<NaiveDate>,
    ) -> Result<SelectedCandidate, OnboardingError> {
        let mut candidates = self.candidates.lock().unwrap();
        let candidate = candidates
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| OnboardingError::NotFound(format!("Candidate {id} not found")))?;
        candidate.status = status;
        candidate.offer_accepted_date = offer_accepted_date;
        Ok(candidate.clone())
    }

    async fn list_documents(
        &self,
        _candidate_id: Uuid,
    ) -> Result<Vec<UploadedDocument>, OnboardingError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.list_latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        Ok(self.documents.lock().unwrap().clone())
    }

    async fn upload_document(
        &self,
        request: UploadRequest,
        progress: SlotProgress,
    ) -> Result<UploadedDocument, OnboardingError> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let latency = *self.upload_latency.lock().unwrap();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        if let Some(message) = self.reject_uploads.lock().unwrap().clone() {
            return Err(OnboardingError::Server {
                status: 422,
                message,
            });
        }
        progress.report(50);
        let document = UploadedDocument {
            id: Uuid::new_v4(),
            document_type: request.document_type,
            document_name: request.document_name,
            verification_status: VerificationStatus::Pending,
            rejection_reason: None,
            uploaded_date: Utc::now(),
        };
        self.documents.lock().unwrap().push(document.clone());
        Ok(document)
    }

    async fn delete_document(&self, document_id: Uuid) -> Result<(), OnboardingError> {
        let mut documents = self.documents.lock().unwrap();
        let before = documents.len();
        documents.retain(|d| d.id != document_id);
        if documents.len() == before {
            return Err(OnboardingError::NotFound(format!(
                "Document {document_id} not found"
            )));
        }
        Ok(())
    }
}
