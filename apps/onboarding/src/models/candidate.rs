use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Offer lifecycle state of a selected candidate, as reported by the backend.
/// Closed enum: an unknown status string is a decode error at the boundary,
/// never silently carried along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OfferStatus {
    OfferExtended,
    OfferAccepted,
    OfferDeclined,
    Onboarding,
}

/// A selected candidate as returned by `GET /selected-candidates/...`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedCandidate {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub status: OfferStatus,
    pub offer_accepted_date: Option<NaiveDate>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The identity the workflow session is operating under.
///
/// Starts from whatever the route/query provided; once `resolved` it is not
/// mutated again for the session except by the explicit re-entry transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateIdentity {
    pub id: Option<Uuid>,
    pub email: Option<String>,
    pub resolved: bool,
}

impl CandidateIdentity {
    pub fn from_id(id: Uuid) -> Self {
        CandidateIdentity {
            id: Some(id),
            email: None,
            resolved: true,
        }
    }

    pub fn from_profile(profile: &SelectedCandidate) -> Self {
        CandidateIdentity {
            id: Some(profile.id),
            email: Some(profile.email.clone()),
            resolved: true,
        }
    }
}
