//! Credential introspection against the identity service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::AuthError;

/// What the identity service said about a credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Introspection {
    pub valid: bool,
    /// Identity the credential belongs to, when valid.
    pub subject: Option<String>,
    pub scopes: Vec<String>,
}

/// Asks the identity service whether a credential is valid.
///
/// A trait so the gate can be tested against stubs and so a different
/// identity backend only needs a new implementation, not gate changes.
#[async_trait]
pub trait CredentialIntrospector: Send + Sync {
    async fn introspect(&self, credential: &str) -> Result<Introspection, AuthError>;
}

#[derive(Debug, Deserialize)]
struct IdentityResponse {
    #[serde(default, alias = "sub")]
    username: Option<String>,
    #[serde(default)]
    scopes: Vec<String>,
}

/// Introspector that presents the credential as a bearer token to the
/// configured identity endpoint.
///
/// HTTP 200 means the credential is active and the body describes its
/// owner; 401/403 mean the identity service rejected it; anything else
/// (including transport errors) is `Unavailable`.
pub struct HttpIntrospector {
    http: Client,
    url: String,
}

impl HttpIntrospector {
    pub fn new(url: impl Into<String>) -> Result<Self, AuthError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl CredentialIntrospector for HttpIntrospector {
    async fn introspect(&self, credential: &str) -> Result<Introspection, AuthError> {
        let response = self
            .http
            .get(&self.url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "identity service unreachable");
                AuthError::Unavailable(e.to_string())
            })?;

        match response.status() {
            StatusCode::OK => {
                let body: IdentityResponse = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Unavailable(e.to_string()))?;
                debug!(subject = ?body.username, "credential introspection ok");
                Ok(Introspection {
                    valid: true,
                    subject: body.username,
                    scopes: body.scopes,
                })
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Introspection {
                valid: false,
                subject: None,
                scopes: Vec::new(),
            }),
            status => {
                warn!(%status, "unexpected status from identity service");
                Err(AuthError::Unavailable(format!(
                    "identity service returned HTTP {status}"
                )))
            }
        }
    }
}
