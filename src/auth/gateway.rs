//! HTTP gateway to the authentication backend
//!
//! Stateless request wrappers for register, login and current-user. Every
//! failure is classified here into an [`AuthError`]; callers never inspect
//! raw status codes or response bodies.

use super::error::AuthError;
use super::types::{CurrentUserBody, LoginPayload, RegisterPayload, TokenResponse, UserProfile};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Requests the session store needs from the backend
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn register(&self, payload: &RegisterPayload) -> Result<TokenResponse, AuthError>;

    async fn login(&self, payload: &LoginPayload) -> Result<TokenResponse, AuthError>;

    /// Fetch the profile of the user owning `token`
    async fn current_user(&self, token: &str) -> Result<UserProfile, AuthError>;
}

/// Endpoint paths, relative to the API base URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub register: String,
    pub login: String,
    pub current_user: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: "/auth/register/".to_string(),
            login: "/auth/login/".to_string(),
            current_user: "/auth/user/".to_string(),
        }
    }
}

/// [`AuthGateway`] over HTTP/JSON
#[derive(Debug, Clone)]
pub struct HttpAuthGateway {
    base_url: String,
    endpoints: Endpoints,
    http_client: Client,
}

impl HttpAuthGateway {
    /// Create a gateway with default endpoints and timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthError> {
        Self::with_options(base_url, Endpoints::default(), DEFAULT_TIMEOUT)
    }

    pub fn with_options(
        base_url: impl Into<String>,
        endpoints: Endpoints,
        timeout: Duration,
    ) -> Result<Self, AuthError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("sessiongate/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AuthError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            endpoints,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn register(&self, payload: &RegisterPayload) -> Result<TokenResponse, AuthError> {
        let url = self.url(&self.endpoints.register);
        debug!("Sending registration request to: {}", url);
        let response = self.http_client.post(&url).json(payload).send().await?;
        read_json(response).await
    }

    async fn login(&self, payload: &LoginPayload) -> Result<TokenResponse, AuthError> {
        let url = self.url(&self.endpoints.login);
        debug!("Sending login request to: {}", url);
        let response = self.http_client.post(&url).json(payload).send().await?;
        read_json(response).await
    }

    async fn current_user(&self, token: &str) -> Result<UserProfile, AuthError> {
        let url = self.url(&self.endpoints.current_user);
        debug!("Sending current-user request to: {}", url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await?;
        let body: CurrentUserBody = read_json(response).await?;
        Ok(body.into_profile())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Decode a success body or classify the failure
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AuthError> {
    let status = response.status();
    debug!("Server response status: {}", status);

    if status.is_success() {
        let text = response.text().await?;
        return serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()));
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify_failure(status.as_u16(), &body);
    warn!("Request failed: {}", err);
    Err(err)
}

/// Map a non-success status and its body to an [`AuthError`]
///
/// A 3xx only gets here when the client stopped following redirects, which
/// means the request itself has to change.
pub(crate) fn classify_failure(status: u16, body: &str) -> AuthError {
    let message = extract_message(body);
    match status {
        401 => AuthError::Unauthorized { message },
        300..=499 => AuthError::Validation { status, message },
        _ => AuthError::Server { status, message },
    }
}

/// Pull a human-readable message out of an error body.
///
/// Looks at `detail`, `message` and `error` in that order, then falls back to
/// the first field error of a `{"field": ["msg", ...]}` body, in the order the
/// server sent the fields.
pub(crate) fn extract_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "message", "error"] {
        if let Some(text) = object.get(key).and_then(first_text) {
            return Some(text);
        }
    }

    object.iter().find_map(|(field, errors)| {
        let text = first_text(errors)?;
        if field == "non_field_errors" {
            Some(text)
        } else {
            Some(format!("{}: {}", field, text))
        }
    })
}

fn first_text(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(items) => items.iter().find_map(first_text),
        _ => None,
    }
}
