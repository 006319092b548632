//! Document checklists — the static catalogs of onboarding paperwork.
//!
//! Two variants exist: the short set collected at offer acceptance, and the
//! full onboarding set. Which one is active is a configuration input; the
//! aggregator is parameterized by it. Ordering is display order.

use serde::{Deserialize, Serialize};

/// One kind of document the candidate may be asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentTypeSpec {
    /// Unique key; `UploadedDocument::document_type` matches against this.
    pub key: &'static str,
    pub label: &'static str,
    pub required: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistVariant {
    OfferAcceptance,
    #[default]
    Onboarding,
}

const OFFER_ACCEPTANCE_CHECKLIST: &[DocumentTypeSpec] = &[
    DocumentTypeSpec {
        key: "signed_offer_letter",
        label: "Signed Offer Letter",
        required: true,
    },
    DocumentTypeSpec {
        key: "identity_proof",
        label: "Identity Proof",
        required: true,
    },
    DocumentTypeSpec {
        key: "photo",
        label: "Passport-size Photograph",
        required: false,
    },
];

const ONBOARDING_CHECKLIST: &[DocumentTypeSpec] = &[
    DocumentTypeSpec {
        key: "resume",
        label: "Resume",
        required: true,
    },
    DocumentTypeSpec {
        key: "photo",
        label: "Passport-size Photograph",
        required: true,
    },
    DocumentTypeSpec {
        key: "identity_proof",
        label: "Identity Proof",
        required: true,
    },
    DocumentTypeSpec {
        key: "address_proof",
        label: "Address Proof",
        required: true,
    },
    DocumentTypeSpec {
        key: "education_certificate",
        label: "Education Certificates",
        required: true,
    },
    DocumentTypeSpec {
        key: "experience_letter",
        label: "Experience Letters",
        required: false,
    },
    DocumentTypeSpec {
        key: "bank_statement",
        label: "Cancelled Cheque / Bank Statement",
        required: false,
    },
];

/// Returns the ordered checklist for a variant.
pub fn checklist(variant: ChecklistVariant) -> &'static [DocumentTypeSpec] {
    match variant {
        ChecklistVariant::OfferAcceptance => OFFER_ACCEPTANCE_CHECKLIST,
        ChecklistVariant::Onboarding => ONBOARDING_CHECKLIST,
    }
}

/// Looks a type key up in the active checklist.
pub fn find_spec(variant: ChecklistVariant, key: &str) -> Option<&'static DocumentTypeSpec> {
    checklist(variant).iter().find(|spec| spec.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique_per_variant() {
        for variant in [ChecklistVariant::OfferAcceptance, ChecklistVariant::Onboarding] {
            let specs = checklist(variant);
            let mut keys: Vec<_> = specs.iter().map(|s| s.key).collect();
            keys.sort();
            keys.dedup();
            assert_eq!(keys.len(), specs.len(), "duplicate key in {variant:?}");
        }
    }

    #[test]
    fn test_variants_differ_in_membership_and_required_flags() {
        assert!(find_spec(ChecklistVariant::Onboarding, "resume").is_some());
        assert!(find_spec(ChecklistVariant::OfferAcceptance, "resume").is_none());
        // Same key, different required flag across variants.
        assert!(find_spec(ChecklistVariant::Onboarding, "photo").unwrap().required);
        assert!(!find_spec(ChecklistVariant::OfferAcceptance, "photo").unwrap().required);
    }

    #[test]
    fn test_every_variant_has_at_least_one_required_type() {
        for variant in [ChecklistVariant::OfferAcceptance, ChecklistVariant::Onboarding] {
            assert!(checklist(variant).iter().any(|s| s.required));
        }
    }

    #[test]
    fn test_variant_parses_from_config_string() {
        let v: ChecklistVariant = serde_json::from_str("\"offer_acceptance\"").unwrap();
        assert_eq!(v, ChecklistVariant::OfferAcceptance);
    }
}
