//! OnboardingSession — ties the resolver, the upload coordinator, and the
//! aggregator together around the backend API.
//!
//! The session owns the only shared mutable state of the workflow: the
//! resolved identity, the fetched document list, and a fetch epoch. Every
//! mutating remote action is followed by a full refetch of the document list;
//! the report is derived from server-confirmed state, never from an
//! optimistic local merge.

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use tracing::{debug, info};
use uuid::Uuid;

use crate::api::{FileUpload, PortalApi};
use crate::checklist::{checklist, ChecklistVariant};
use crate::errors::OnboardingError;
use crate::models::{OfferStatus, SelectedCandidate, UploadedDocument};
use crate::workflow::identity::{IdentityResolver, IdentitySource, ResolveAction, ResolverState};
use crate::workflow::status::{build_report, ChecklistReport};
use crate::workflow::upload::UploadCoordinator;

struct SessionState {
    resolver: IdentityResolver,
    documents: Vec<UploadedDocument>,
    /// Bumped by every identity reset. A document-list fetch issued under an
    /// older epoch is discarded when it completes, so a stale candidate's
    /// documents are never reported.
    fetch_epoch: u64,
}

pub struct OnboardingSession {
    api: Arc<dyn PortalApi>,
    variant: ChecklistVariant,
    uploader: UploadCoordinator,
    state: Mutex<SessionState>,
}

impl OnboardingSession {
    pub fn new(api: Arc<dyn PortalApi>, variant: ChecklistVariant) -> Self {
        OnboardingSession {
            api,
            variant,
            uploader: UploadCoordinator::new(),
            state: Mutex::new(SessionState {
                resolver: IdentityResolver::new(),
                documents: Vec::new(),
                fetch_epoch: 0,
            }),
        }
    }

    pub fn checklist_variant(&self) -> ChecklistVariant {
        self.variant
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    /// The resolved candidate id, or `NotResolved` before resolution.
    pub fn candidate_id(&self) -> Result<Uuid, OnboardingError> {
        self.lock()
            .resolver
            .candidate_id()
            .ok_or(OnboardingError::NotResolved)
    }

    pub fn is_resolved(&self) -> bool {
        self.lock().resolver.is_resolved()
    }

    pub fn profile(&self) -> Option<SelectedCandidate> {
        self.lock().resolver.profile().cloned()
    }

    /// True while the resolver sits in its failed state, waiting for the
    /// re-entry form.
    pub fn resolution_failed(&self) -> Option<String> {
        match self.lock().resolver.state() {
            ResolverState::Failed { message } => Some(message.clone()),
            _ => None,
        }
    }

    /// Resolves the candidate identity and, on success, performs the initial
    /// document fetch.
    pub async fn resolve_identity(
        &self,
        source: IdentitySource,
    ) -> Result<Uuid, OnboardingError> {
        let action = self.lock().resolver.begin(source)?;

        let id = match action {
            ResolveAction::Ready(id) => id,
            ResolveAction::Lookup(email) => {
                match self.api.find_candidate_by_email(&email).await {
                    Ok(profile) => self.lock().resolver.complete(profile),
                    Err(err) => {
                        self.lock().resolver.fail(err.user_message());
                        return Err(err);
                    }
                }
            }
        };

        self.refresh_documents().await?;
        Ok(id)
    }

    /// Acknowledges a failed lookup, returning the resolver to its input
    /// state for the retry loop.
    pub fn acknowledge_failure(&self) {
        self.lock().resolver.reenter();
    }

    /// The user-invoked "change email" reset: discards the resolved identity
    /// and all downstream state, and invalidates in-flight fetches.
    pub fn reset_identity(&self) {
        let mut state = self.lock();
        state.fetch_epoch += 1;
        state.documents.clear();
        state.resolver.change_email();
        info!("Identity reset; downstream document state cleared");
    }

    /// Fetches the candidate profile by id (used after a path-id resolution,
    /// where no lookup ran) and attaches it to the resolved identity.
    pub async fn load_profile(&self) -> Result<SelectedCandidate, OnboardingError> {
        let id = self.candidate_id()?;
        let profile = self.api.get_candidate(id).await?;
        self.lock().resolver.attach_profile(profile.clone());
        Ok(profile)
    }

    /// Full refetch of the candidate's documents. A result that raced an
    /// identity reset is discarded.
    pub async fn refresh_documents(&self) -> Result<(), OnboardingError> {
        let (id, epoch) = {
            let state = self.lock();
            let id = state
                .resolver
                .candidate_id()
                .ok_or(OnboardingError::NotResolved)?;
            (id, state.fetch_epoch)
        };

        let documents = self.api.list_documents(id).await?;

        let mut state = self.lock();
        if state.fetch_epoch != epoch {
            debug!("Discarding stale document list fetched under epoch {epoch}");
            return Ok(());
        }
        state.documents = documents;
        Ok(())
    }

    /// Uploads one document and refetches the list on success.
    pub async fn upload(
        &self,
        document_type: &str,
        file: FileUpload,
    ) -> Result<UploadedDocument, OnboardingError> {
        let id = self.candidate_id()?;
        let document = self
            .uploader
            .submit(self.api.as_ref(), id, document_type, file)
            .await?;
        self.refresh_documents().await?;
        Ok(document)
    }

    /// Deletes a document (confirmation-gated) and refetches the list.
    pub async fn delete_document(
        &self,
        document_id: Uuid,
        confirmed: bool,
    ) -> Result<(), OnboardingError> {
        self.candidate_id()?;
        self.uploader
            .delete(self.api.as_ref(), document_id, confirmed)
            .await?;
        self.refresh_documents().await
    }

    /// Marks the offer accepted on the backend and updates the held profile.
    pub async fn accept_offer(
        &self,
        accepted_on: NaiveDate,
    ) -> Result<SelectedCandidate, OnboardingError> {
        let id = self.candidate_id()?;
        let updated = self
            .api
            .update_offer_status(id, OfferStatus::OfferAccepted, Some(accepted_on))
            .await?;
        self.lock().resolver.attach_profile(updated.clone());
        Ok(updated)
    }

    /// Derives the checklist report from the current document set. Recomputed
    /// on every call.
    pub fn report(&self) -> ChecklistReport {
        let state = self.lock();
        build_report(checklist(self.variant), &state.documents)
    }

    /// Upload progress (0–100) for one document-type slot.
    pub fn upload_progress(&self, document_type: &str) -> u8 {
        self.uploader.progress(document_type)
    }
}
