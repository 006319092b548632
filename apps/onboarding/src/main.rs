use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use onboarding::api::{PortalClient, SessionContext};
use onboarding::config::Config;
use onboarding::workflow::identity::IdentitySource;
use onboarding::workflow::session::OnboardingSession;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting onboarding workflow v{}", env!("CARGO_PKG_VERSION"));
    info!("Portal API: {}", config.portal_api_url);

    let session_context = match &config.auth_token {
        Some(token) => SessionContext::with_token(token.clone()),
        None => SessionContext::anonymous(),
    };
    let api = Arc::new(PortalClient::new(
        config.portal_api_url.clone(),
        config.request_timeout_secs,
        session_context,
    ));
    let session = OnboardingSession::new(api, config.checklist_variant);

    let source = identity_source_from_env()?;
    let candidate_id = match session.resolve_identity(source).await {
        Ok(id) => id,
        Err(err) => anyhow::bail!("{}", err.user_message()),
    };
    info!("Resolved candidate {candidate_id}");

    match session.load_profile().await {
        Ok(profile) => info!("Candidate: {} ({:?})", profile.full_name, profile.status),
        Err(err) => warn!("Could not load candidate profile: {}", err.user_message()),
    }

    let report = session.report();
    for row in &report.rows {
        let kind = if row.required { "required" } else { "optional" };
        match &row.rejection_reason {
            Some(reason) => info!("[{kind}] {} — {} ({reason})", row.label, row.status.label()),
            None => info!("[{kind}] {} — {}", row.label, row.status.label()),
        }
    }
    info!(
        "Completion: {}% ({} of {} required uploaded; all verified: {})",
        report.completion_percent,
        report.required_uploaded,
        report.required_total,
        report.all_verified
    );

    Ok(())
}

/// The identity input for this run: a direct candidate id, or an email to
/// look up.
fn identity_source_from_env() -> Result<IdentitySource> {
    if let Ok(id) = std::env::var("CANDIDATE_ID") {
        return Ok(IdentitySource::CandidateId(
            id.parse().context("CANDIDATE_ID must be a UUID")?,
        ));
    }
    if let Ok(email) = std::env::var("CANDIDATE_EMAIL") {
        return Ok(IdentitySource::Email(email));
    }
    anyhow::bail!("Set CANDIDATE_ID or CANDIDATE_EMAIL to identify the candidate")
}
