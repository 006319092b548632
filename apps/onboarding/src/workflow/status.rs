//! Status/Progress Aggregator — a pure function from (checklist, fetched
//! documents) to per-type display status and overall completion.
//!
//! Always recomputed from the current document set; nothing here is cached.

use serde::Serialize;

use crate::checklist::DocumentTypeSpec;
use crate::models::{UploadedDocument, VerificationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStatus {
    NotUploaded,
    Pending,
    Verified,
    Rejected,
}

impl DisplayStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DisplayStatus::NotUploaded => "Not Uploaded",
            DisplayStatus::Pending => "Pending Review",
            DisplayStatus::Verified => "Verified",
            DisplayStatus::Rejected => "Rejected",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            DisplayStatus::NotUploaded => "grey",
            DisplayStatus::Pending => "amber",
            DisplayStatus::Verified => "green",
            DisplayStatus::Rejected => "red",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            DisplayStatus::NotUploaded => "upload",
            DisplayStatus::Pending => "hourglass",
            DisplayStatus::Verified => "check-circle",
            DisplayStatus::Rejected => "x-circle",
        }
    }
}

/// One checklist line as the UI renders it.
#[derive(Debug, Clone, Serialize)]
pub struct ChecklistRow {
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
    pub status: DisplayStatus,
    pub document: Option<UploadedDocument>,
    pub rejection_reason: Option<String>,
    /// Upload affordance: an empty slot, or a rejected document awaiting
    /// replacement.
    pub can_upload: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChecklistReport {
    pub rows: Vec<ChecklistRow>,
    pub required_total: usize,
    pub required_uploaded: usize,
    /// `round(100 · required_uploaded / required_total)`, in [0, 100].
    pub completion_percent: u8,
    /// Every required type has an uploaded document, whatever its
    /// verification status.
    pub all_required_uploaded: bool,
    /// Every required type's document is verified. Implies
    /// `all_required_uploaded`; drives the separate completion banner.
    pub all_verified: bool,
}

/// Builds the display report for a checklist against the fetched documents.
///
/// When the backend briefly holds more than one document for a type key, the
/// most recently uploaded one is displayed.
pub fn build_report(
    specs: &[DocumentTypeSpec],
    documents: &[UploadedDocument],
) -> ChecklistReport {
    let mut rows = Vec::with_capacity(specs.len());

    for spec in specs {
        let document = documents
            .iter()
            .filter(|d| d.document_type == spec.key)
            .max_by_key(|d| d.uploaded_date)
            .cloned();

        let status = match &document {
            None => DisplayStatus::NotUploaded,
            Some(d) => match d.verification_status {
                VerificationStatus::Pending => DisplayStatus::Pending,
                VerificationStatus::Verified => DisplayStatus::Verified,
                VerificationStatus::Rejected => DisplayStatus::Rejected,
            },
        };

        rows.push(ChecklistRow {
            key: spec.key,
            label: spec.label,
            required: spec.required,
            rejection_reason: document
                .as_ref()
                .and_then(|d| d.rejection_reason.clone()),
            can_upload: matches!(
                status,
                DisplayStatus::NotUploaded | DisplayStatus::Rejected
            ),
            status,
            document,
        });
    }

    let required_total = rows.iter().filter(|r| r.required).count();
    let required_uploaded = rows
        .iter()
        .filter(|r| r.required && r.document.is_some())
        .count();

    let completion_percent = if required_total == 0 {
        // An empty required set has nothing outstanding.
        100
    } else {
        (100.0 * required_uploaded as f64 / required_total as f64).round() as u8
    };

    let all_required_uploaded = required_uploaded == required_total;
    let all_verified = rows
        .iter()
        .filter(|r| r.required)
        .all(|r| r.status == DisplayStatus::Verified);

    ChecklistReport {
        rows,
        required_total,
        required_uploaded,
        completion_percent,
        all_required_uploaded,
        all_verified,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checklist::{checklist, ChecklistVariant};
    use crate::workflow::testing::sample_document;

    const THREE_REQUIRED: &[DocumentTypeSpec] = &[
        DocumentTypeSpec {
            key: "a",
            label: "A",
            required: true,
        },
        DocumentTypeSpec {
            key: "b",
            label: "B",
            required: true,
        },
        DocumentTypeSpec {
            key: "c",
            label: "C",
            required: true,
        },
        DocumentTypeSpec {
            key: "extra",
            label: "Extra",
            required: false,
        },
    ];

    #[test]
    fn test_empty_document_set() {
        let report = build_report(THREE_REQUIRED, &[]);
        assert_eq!(report.completion_percent, 0);
        assert!(!report.all_required_uploaded);
        assert!(!report.all_verified);
        for row in &report.rows {
            assert_eq!(row.status, DisplayStatus::NotUploaded);
            assert!(row.can_upload);
        }
    }

    #[test]
    fn test_percentage_rounds_to_nearest_integer() {
        let docs = vec![sample_document("a", VerificationStatus::Pending)];
        assert_eq!(build_report(THREE_REQUIRED, &docs).completion_percent, 33);

        let docs = vec![
            sample_document("a", VerificationStatus::Pending),
            sample_document("b", VerificationStatus::Pending),
        ];
        assert_eq!(build_report(THREE_REQUIRED, &docs).completion_percent, 67);
    }

    #[test]
    fn test_optional_documents_do_not_move_the_percentage() {
        let docs = vec![sample_document("extra", VerificationStatus::Verified)];
        let report = build_report(THREE_REQUIRED, &docs);
        assert_eq!(report.completion_percent, 0);
        assert_eq!(report.rows[3].status, DisplayStatus::Verified);
    }

    #[test]
    fn test_pending_counts_toward_completion() {
        // Uploaded counts regardless of verification outcome.
        let docs = vec![
            sample_document("a", VerificationStatus::Pending),
            sample_document("b", VerificationStatus::Rejected),
            sample_document("c", VerificationStatus::Verified),
        ];
        let report = build_report(THREE_REQUIRED, &docs);
        assert_eq!(report.completion_percent, 100);
        assert!(report.all_required_uploaded);
        assert!(!report.all_verified);
    }

    #[test]
    fn test_all_verified_is_stricter_than_all_uploaded() {
        let docs = vec![
            sample_document("a", VerificationStatus::Verified),
            sample_document("b", VerificationStatus::Verified),
            sample_document("c", VerificationStatus::Verified),
        ];
        let report = build_report(THREE_REQUIRED, &docs);
        assert!(report.all_required_uploaded);
        assert!(report.all_verified);
    }

    #[test]
    fn test_rejected_row_carries_reason_and_reupload_affordance() {
        let docs = vec![sample_document("a", VerificationStatus::Rejected)];
        let report = build_report(THREE_REQUIRED, &docs);
        let row = &report.rows[0];
        assert_eq!(row.status, DisplayStatus::Rejected);
        assert_eq!(row.rejection_reason.as_deref(), Some("Document is illegible"));
        assert!(row.can_upload);
        // Pending and verified slots show no upload affordance.
        let docs = vec![sample_document("a", VerificationStatus::Pending)];
        assert!(!build_report(THREE_REQUIRED, &docs).rows[0].can_upload);
    }

    #[test]
    fn test_duplicate_type_shows_most_recent_upload() {
        let mut old = sample_document("a", VerificationStatus::Rejected);
        let mut new = sample_document("a", VerificationStatus::Pending);
        old.uploaded_date = old.uploaded_date - chrono::Duration::days(2);
        new.uploaded_date = new.uploaded_date + chrono::Duration::hours(1);
        let report = build_report(THREE_REQUIRED, &[old, new.clone()]);
        assert_eq!(report.rows[0].status, DisplayStatus::Pending);
        assert_eq!(report.rows[0].document.as_ref().unwrap().id, new.id);
    }

    #[test]
    fn test_percentage_stays_in_range_for_all_subset_sizes() {
        let keys = ["a", "b", "c"];
        for uploaded in 0..=keys.len() {
            let docs: Vec<_> = keys[..uploaded]
                .iter()
                .map(|k| sample_document(k, VerificationStatus::Pending))
                .collect();
            let report = build_report(THREE_REQUIRED, &docs);
            assert!(report.completion_percent <= 100);
            assert_eq!(
                report.completion_percent,
                (100.0 * uploaded as f64 / keys.len() as f64).round() as u8
            );
        }
    }

    #[test]
    fn test_status_display_triples_are_fixed() {
        assert_eq!(DisplayStatus::Pending.color(), "amber");
        assert_eq!(DisplayStatus::Pending.label(), "Pending Review");
        assert_eq!(DisplayStatus::Verified.color(), "green");
        assert_eq!(DisplayStatus::Verified.label(), "Verified");
        assert_eq!(DisplayStatus::Rejected.color(), "red");
        assert_eq!(DisplayStatus::Rejected.label(), "Rejected");
    }

    #[test]
    fn test_variant_parameterization_changes_the_report() {
        let docs = vec![
            sample_document("signed_offer_letter", VerificationStatus::Pending),
            sample_document("identity_proof", VerificationStatus::Pending),
        ];
        let offer = build_report(checklist(ChecklistVariant::OfferAcceptance), &docs);
        let onboarding = build_report(checklist(ChecklistVariant::Onboarding), &docs);
        assert_eq!(offer.completion_percent, 100);
        assert!(onboarding.completion_percent < 100);
    }

    #[test]
    fn test_zero_required_types_is_vacuously_complete() {
        let optional_only: &[DocumentTypeSpec] = &[DocumentTypeSpec {
            key: "extra",
            label: "Extra",
            required: false,
        }];
        let report = build_report(optional_only, &[]);
        assert_eq!(report.completion_percent, 100);
        assert!(report.all_required_uploaded);
        assert!(report.all_verified);
    }
}
