//! Bearer-credential validation for the weather tool service.
//!
//! Every inbound call passes through an [`AuthGate`] before any business
//! logic runs. The gate asks a black-box identity service to introspect
//! the presented credential and caches the allow/deny decision for a
//! short window so a chatty client does not hammer the identity service.
//!
//! The gate fails closed: an unreachable identity service is a
//! retryable `Unavailable` error, never a silent allow. The only way to
//! skip validation is the explicit [`AuthGate::disabled`] constructor,
//! which the composing binary uses when configuration says so.

mod error;
mod gate;
mod introspect;

pub use error::AuthError;
pub use gate::{AuthDecision, AuthGate};
pub use introspect::{CredentialIntrospector, HttpIntrospector, Introspection};
