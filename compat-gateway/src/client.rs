//! Typed helpers over the gateway's app and auth routes.
//!
//! Requests are addressed to the legacy API host and reach the gateway
//! through [`InterceptingClient`]. `login` keeps the returned token and every
//! later call sends it as a bearer credential until `logout`.

use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::sync::RwLock;
use thiserror::Error;

use crate::interceptor::InterceptingClient;

/// Host the helpers address before interception
pub const LEGACY_API_BASE: &str = "https://app.base44.com";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response body: {0}")]
    UnexpectedBody(&'static str),
}

pub struct GatewayClient {
    http: InterceptingClient,
    api_base: String,
    token: RwLock<Option<String>>,
}

impl GatewayClient {
    pub fn new(http: InterceptingClient) -> Self {
        Self::with_api_base(http, LEGACY_API_BASE)
    }

    pub fn with_api_base(http: InterceptingClient, api_base: &str) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: RwLock::new(None),
        }
    }

    /// Token from the last successful login, if any
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(|p| p.into_inner()) = token;
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.open(method, &format!("{}{}", self.api_base, path));
        match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(builder: RequestBuilder) -> Result<Value, ClientError> {
        let resp = builder.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body: Option<Value> = resp.json().await.ok();
            let message = body
                .as_ref()
                .and_then(|b| b.get("error"))
                .and_then(|e| e.as_str())
                .or_else(|| status.canonical_reason())
                .unwrap_or("request failed")
                .to_string();
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json().await?)
    }

    /// Creates an app and returns its generated id
    pub async fn add_app(&self, data: &Value) -> Result<String, ClientError> {
        let body = Self::send(self.request(Method::POST, "/api/apps").json(data)).await?;
        let id = body
            .get("id")
            .and_then(|id| id.as_str())
            .ok_or(ClientError::UnexpectedBody("missing app id"))?;
        log::info!("App added with id {}", id);
        Ok(id.to_string())
    }

    /// `None` when the app does not exist
    pub async fn get_app(&self, id: &str) -> Result<Option<Value>, ClientError> {
        match Self::send(self.request(Method::GET, &format!("/api/apps/{}", id))).await {
            Ok(app) => Ok(Some(app)),
            Err(ClientError::Status { status, .. }) if status == StatusCode::NOT_FOUND.as_u16() => {
                log::debug!("No app {}", id);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Merge-updates an app
    pub async fn update_app(&self, id: &str, data: &Value) -> Result<bool, ClientError> {
        Self::send(self.request(Method::PUT, &format!("/api/apps/{}", id)).json(data)).await?;
        Ok(true)
    }

    pub async fn get_apps(&self, limit: usize) -> Result<Vec<Value>, ClientError> {
        let body = Self::send(self.request(Method::GET, &format!("/api/apps?limit={}", limit))).await?;
        match body.get("items") {
            Some(Value::Array(items)) => Ok(items.clone()),
            _ => Err(ClientError::UnexpectedBody("missing items")),
        }
    }

    pub async fn signup(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        let user = Self::send(
            self.request(Method::POST, "/api/auth/signup")
                .json(&json!({ "email": email, "password": password })),
        )
        .await?;
        log::info!("User signed up: {}", user.get("id").unwrap_or(&Value::Null));
        Ok(user)
    }

    /// Logs in and keeps the returned token for subsequent calls
    pub async fn login(&self, email: &str, password: &str) -> Result<Value, ClientError> {
        let mut body = Self::send(
            self.request(Method::POST, "/api/auth/login")
                .json(&json!({ "email": email, "password": password })),
        )
        .await?;

        let token = body
            .get("token")
            .and_then(|t| t.as_str())
            .ok_or(ClientError::UnexpectedBody("missing token"))?
            .to_string();
        self.set_token(Some(token));

        let user = body
            .get_mut("user")
            .map(Value::take)
            .ok_or(ClientError::UnexpectedBody("missing user"))?;
        log::info!("User logged in: {}", user.get("id").unwrap_or(&Value::Null));
        Ok(user)
    }

    /// Forgets the stored token. Local only; the gateway keeps no sessions.
    pub fn logout(&self) -> bool {
        self.set_token(None);
        log::info!("User logged out");
        true
    }
}
