use anyhow::{Context, Result};

use crate::checklist::ChecklistVariant;

/// Workflow configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub portal_api_url: String,
    pub request_timeout_secs: u64,
    pub checklist_variant: ChecklistVariant,
    pub auth_token: Option<String>,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let checklist_variant = match std::env::var("CHECKLIST_VARIANT").ok().as_deref() {
            None => ChecklistVariant::default(),
            Some("onboarding") => ChecklistVariant::Onboarding,
            Some("offer_acceptance") => ChecklistVariant::OfferAcceptance,
            Some(other) => anyhow::bail!(
                "CHECKLIST_VARIANT must be 'onboarding' or 'offer_acceptance', got '{other}'"
            ),
        };

        Ok(Config {
            portal_api_url: require_env("PORTAL_API_URL")?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
            checklist_variant,
            auth_token: std::env::var("PORTAL_AUTH_TOKEN").ok(),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}
