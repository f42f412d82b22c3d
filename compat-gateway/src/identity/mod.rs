//! Token verification against the external identity provider.
//!
//! The gateway only needs a pass/fail answer plus the decoded subject, so the
//! provider is reduced to a single `verify` call behind a trait. The remote
//! implementation uses the `accounts:lookup` endpoint, which accepts an ID
//! token and returns the account it belongs to.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::models::Identity;

#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    #[error("identity verification is not configured")]
    NotConfigured,

    #[error("token rejected by identity provider (status {0})")]
    Rejected(u16),

    #[error("identity provider returned no account for token")]
    UnknownAccount,

    #[error("identity provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError>;
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    email: Option<String>,
}

/// Verifies ID tokens with the identity provider's REST API
pub struct RemoteVerifier {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RemoteVerifier {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn lookup_url(&self) -> String {
        format!("{}/v1/accounts:lookup", self.base_url)
    }
}

#[async_trait]
impl IdentityVerifier for RemoteVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, VerifyError> {
        let response = self
            .client
            .post(self.lookup_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({ "idToken": token }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(VerifyError::Rejected(status.as_u16()));
        }

        let body: LookupResponse = response.json().await?;
        let user = body.users.into_iter().next().ok_or(VerifyError::UnknownAccount)?;

        Ok(Identity {
            uid: user.local_id,
            email: user.email,
        })
    }
}

/// Rejects every token. Used when no provider credentials are configured.
pub struct DisabledVerifier;

#[async_trait]
impl IdentityVerifier for DisabledVerifier {
    async fn verify(&self, _token: &str) -> Result<Identity, VerifyError> {
        Err(VerifyError::NotConfigured)
    }
}
