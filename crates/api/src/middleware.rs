//! Shared-credential gate for the documentation surface.
//!
//! This is not an identity system: one username/password pair, configured at
//! startup, guards `/swagger`. Every failure looks the same to the client.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::settings::SwaggerSettings;

/// Root of the protected surface.
pub const PROTECTED_PREFIX: &str = "/swagger";

pub fn is_protected(path: &str) -> bool {
    path.strip_prefix(PROTECTED_PREFIX)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

#[derive(Clone, PartialEq, Eq)]
pub struct CredentialGate {
    credential: Option<(String, String)>,
}

impl core::fmt::Debug for CredentialGate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CredentialGate")
            .field("armed", &self.credential.is_some())
            .finish()
    }
}

impl CredentialGate {
    pub fn new(user_name: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            credential: Some((user_name.into(), password.into())),
        }
    }

    /// A gate that lets everything through.
    pub fn disabled() -> Self {
        Self { credential: None }
    }

    pub fn from_settings(settings: &SwaggerSettings) -> Self {
        match settings.credential() {
            Some((user, password)) => Self::new(user, password),
            None => Self::disabled(),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.credential.is_some()
    }

    /// Whether a request for `path` carrying `headers` may continue.
    pub fn allows(&self, path: &str, headers: &HeaderMap) -> bool {
        let Some((user, password)) = &self.credential else {
            return true;
        };
        if !is_protected(path) {
            return true;
        }

        match extract_basic(headers) {
            Some((given_user, given_password)) => {
                // Evaluate both halves so timing does not reveal which one differed.
                let user_ok = given_user.as_bytes().ct_eq(user.as_bytes());
                let password_ok = given_password.as_bytes().ct_eq(password.as_bytes());
                bool::from(user_ok & password_ok)
            }
            None => false,
        }
    }
}

/// `401` with a Basic challenge and no body.
pub fn challenge() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, HeaderValue::from_static("Basic"))],
    )
        .into_response()
}

/// Stand-alone middleware form of the gate.
pub async fn credential_gate(
    State(gate): State<CredentialGate>,
    req: Request,
    next: Next,
) -> Response {
    if gate.allows(req.uri().path(), req.headers()) {
        return next.run(req).await;
    }
    debug!(path = %req.uri().path(), "credential gate rejected request");
    challenge()
}

/// Decode `Authorization: Basic <base64(user:password)>`.
///
/// Splits on the first colon only, so the password may itself contain colons.
fn extract_basic(headers: &HeaderMap) -> Option<(String, String)> {
    let header = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let payload = header.strip_prefix("Basic ")?.trim();

    let decoded = STANDARD.decode(payload).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}
