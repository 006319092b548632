//! Identity Resolver — maps ambiguous input (a path-embedded candidate id, a
//! query-string email, or a manually entered email) to a confirmed candidate.
//!
//! Pure state machine: transitions are synchronous methods, and the session
//! performs the actual lookup between `begin` and `complete`/`fail`. States:
//! `NeedInput → Resolving → Resolved` (terminal for the session), or
//! `Resolving → Failed → NeedInput` (retry loop).

use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::OnboardingError;
use crate::models::{CandidateIdentity, SelectedCandidate};

/// Where the identity input came from. Path ids and emails are the only two
/// shapes; query-string and manually entered emails behave identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentitySource {
    CandidateId(Uuid),
    Email(String),
}

#[derive(Debug)]
pub enum ResolverState {
    NeedInput,
    Resolving,
    Resolved {
        identity: CandidateIdentity,
        profile: Option<SelectedCandidate>,
    },
    Failed {
        message: String,
    },
}

/// What the caller must do after `begin`.
#[derive(Debug)]
pub enum ResolveAction {
    /// A path id was supplied; the machine is already `Resolved` and no
    /// lookup is needed.
    Ready(Uuid),
    /// An email was supplied; perform the remote lookup, then call
    /// `complete` or `fail` with the outcome.
    Lookup(String),
}

#[derive(Debug)]
pub struct IdentityResolver {
    state: ResolverState,
}

impl Default for IdentityResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityResolver {
    /// With neither id nor email available at start, the machine begins in
    /// `NeedInput` and waits for user input.
    pub fn new() -> Self {
        IdentityResolver {
            state: ResolverState::NeedInput,
        }
    }

    pub fn state(&self) -> &ResolverState {
        &self.state
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.state, ResolverState::Resolved { .. })
    }

    pub fn candidate_id(&self) -> Option<Uuid> {
        match &self.state {
            ResolverState::Resolved { identity, .. } => identity.id,
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<CandidateIdentity> {
        match &self.state {
            ResolverState::Resolved { identity, .. } => Some(identity.clone()),
            _ => None,
        }
    }

    pub fn profile(&self) -> Option<&SelectedCandidate> {
        match &self.state {
            ResolverState::Resolved { profile, .. } => profile.as_ref(),
            _ => None,
        }
    }

    /// `NeedInput → Resolving` (or straight to `Resolved` for a path id).
    /// Re-entry after a failure is the same transition, so `Failed` is also
    /// accepted here.
    pub fn begin(&mut self, source: IdentitySource) -> Result<ResolveAction, OnboardingError> {
        match self.state {
            ResolverState::NeedInput | ResolverState::Failed { .. } => {}
            ResolverState::Resolving => {
                return Err(OnboardingError::Validation(
                    "A lookup is already in progress".to_string(),
                ));
            }
            ResolverState::Resolved { .. } => {
                return Err(OnboardingError::Validation(
                    "Identity is already confirmed; change the email to start over".to_string(),
                ));
            }
        }

        match source {
            IdentitySource::CandidateId(id) => {
                info!("Candidate id {id} supplied directly; skipping lookup");
                self.state = ResolverState::Resolved {
                    identity: CandidateIdentity::from_id(id),
                    profile: None,
                };
                Ok(ResolveAction::Ready(id))
            }
            IdentitySource::Email(email) => {
                debug!("Resolving candidate by email");
                self.state = ResolverState::Resolving;
                Ok(ResolveAction::Lookup(email))
            }
        }
    }

    /// `Resolving → Resolved`: the lookup returned a candidate.
    pub fn complete(&mut self, profile: SelectedCandidate) -> Uuid {
        let id = profile.id;
        info!("Candidate resolved: {id}");
        self.state = ResolverState::Resolved {
            identity: CandidateIdentity::from_profile(&profile),
            profile: Some(profile),
        };
        id
    }

    /// `Resolving → Failed`: lookup miss or error. No cached id survives.
    pub fn fail(&mut self, message: String) {
        info!("Identity resolution failed: {message}");
        self.state = ResolverState::Failed { message };
    }

    /// `Failed → NeedInput`: the user is shown the re-entry form.
    pub fn reenter(&mut self) {
        if matches!(self.state, ResolverState::Failed { .. }) {
            self.state = ResolverState::NeedInput;
        }
    }

    /// The user-invoked "change email" action: forces `NeedInput` and
    /// discards the previously resolved identity. The session is responsible
    /// for clearing downstream state alongside this.
    pub fn change_email(&mut self) {
        self.state = ResolverState::NeedInput;
    }

    /// Attaches a separately fetched profile to the resolved identity.
    /// Ignored unless the machine is still resolved to the same candidate,
    /// so a profile fetched before a reset cannot resurface afterwards.
    pub fn attach_profile(&mut self, fetched: SelectedCandidate) {
        if let ResolverState::Resolved { identity, profile } = &mut self.state {
            if identity.id == Some(fetched.id) {
                if identity.email.is_none() {
                    identity.email = Some(fetched.email.clone());
                }
                *profile = Some(fetched);
            }
        }
    }
}
