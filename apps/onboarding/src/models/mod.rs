pub mod candidate;
pub mod document;

pub use candidate::{CandidateIdentity, OfferStatus, SelectedCandidate};
pub use document::{UploadedDocument, VerificationStatus};
