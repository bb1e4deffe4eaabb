//! The gate: decision cache over the introspector, plus disabled mode.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::AuthError;
use crate::introspect::CredentialIntrospector;

/// A cached allow/deny decision for one credential.
#[derive(Debug, Clone)]
pub struct AuthDecision {
    pub allowed: bool,
    pub subject: Option<String>,
    pub scopes: Vec<String>,
    pub decided_at: Instant,
}

enum Mode {
    /// Validation explicitly switched off by configuration. Distinct
    /// from any failure path — failures always deny.
    Disabled,
    Enabled {
        introspector: Arc<dyn CredentialIntrospector>,
        decisions: RwLock<HashMap<String, AuthDecision>>,
        ttl: Duration,
    },
}

/// Pre-invocation authentication gate shared by both transports.
pub struct AuthGate {
    mode: Mode,
}

impl AuthGate {
    /// Gate that validates against the identity service, caching
    /// decisions for `ttl`.
    pub fn new(introspector: Arc<dyn CredentialIntrospector>, ttl: Duration) -> Self {
        Self {
            mode: Mode::Enabled {
                introspector,
                decisions: RwLock::new(HashMap::new()),
                ttl,
            },
        }
    }

    /// Gate that allows every call. Only constructed when configuration
    /// explicitly disables authentication; logged loudly so a deployment
    /// can tell this apart from a validator gone wrong.
    pub fn disabled() -> Self {
        warn!("authentication is DISABLED by configuration; every call will be allowed");
        Self {
            mode: Mode::Disabled,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self.mode, Mode::Enabled { .. })
    }

    /// Validate a presented credential.
    ///
    /// `None` or an empty string fails with `MissingCredential` when the
    /// gate is enabled. Denials from the identity service are cached
    /// just like allows, so a revoked token cannot retry its way past
    /// the cache window.
    pub async fn validate(&self, credential: Option<&str>) -> Result<AuthDecision, AuthError> {
        let Mode::Enabled {
            introspector,
            decisions,
            ttl,
        } = &self.mode
        else {
            return Ok(AuthDecision {
                allowed: true,
                subject: None,
                scopes: Vec::new(),
                decided_at: Instant::now(),
            });
        };

        let credential = match credential {
            Some(c) if !c.trim().is_empty() => c.trim(),
            _ => return Err(AuthError::MissingCredential),
        };

        let key = fingerprint(credential);

        {
            let cached = decisions.read().await;
            if let Some(decision) = cached.get(&key) {
                if decision.decided_at.elapsed() < *ttl {
                    debug!(allowed = decision.allowed, "auth decision served from cache");
                    return finish(decision.clone());
                }
            }
        }

        let introspection = introspector.introspect(credential).await?;
        let decision = AuthDecision {
            allowed: introspection.valid,
            subject: introspection.subject,
            scopes: introspection.scopes,
            decided_at: Instant::now(),
        };

        {
            // Last-writer-wins: concurrent validations of the same
            // credential may both introspect, which is harmless.
            let mut cached = decisions.write().await;
            cached.insert(key, decision.clone());
        }

        if decision.allowed {
            info!(subject = ?decision.subject, "credential validated");
        } else {
            info!("credential rejected by identity service");
        }
        finish(decision)
    }
}

fn finish(decision: AuthDecision) -> Result<AuthDecision, AuthError> {
    if decision.allowed {
        Ok(decision)
    } else {
        Err(AuthError::Rejected(
            "invalid or inactive credential".to_string(),
        ))
    }
}

/// SHA-256 fingerprint used as the cache key, so raw credentials are
/// never held in memory longer than the validation call.
fn fingerprint(credential: &str) -> String {
    let digest = Sha256::digest(credential.as_bytes());
    format!("{digest:x}")
}
