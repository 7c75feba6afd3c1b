//! Platform request signature verification.
//!
//! Cashier signs every server-to-server call it makes to the plugin. The
//! `X-HMAC-Timestamp` header carries an RFC 3339 timestamp and `X-HMAC` the
//! hex HMAC-SHA256 of that timestamp, keyed with the plugin's client secret.
//! Timestamps more than five minutes away from the local clock are rejected to
//! limit replay.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the signed timestamp.
pub const TIMESTAMP_HEADER: &str = "x-hmac-timestamp";

/// Header carrying the hex signature.
pub const SIGNATURE_HEADER: &str = "x-hmac";

/// Allowed clock skew between Cashier and the plugin.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

type HmacSha256 = Hmac<Sha256>;

/// Why a request signature was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing {0} header")]
    MissingHeader(&'static str),

    #[error("timestamp is not RFC 3339")]
    InvalidTimestamp,

    #[error("timestamp outside the allowed window")]
    Expired,

    #[error("signature mismatch")]
    Mismatch,
}

impl From<SignatureError> for AppError {
    fn from(err: SignatureError) -> Self {
        match err {
            SignatureError::MissingHeader(_) => Self::BadRequest(err.to_string()),
            _ => Self::Unauthorized(err.to_string()),
        }
    }
}

/// Verifies timestamp signatures with the plugin's client secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: SecretString,
    tolerance: Duration,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"[REDACTED]")
            .field("tolerance", &self.tolerance)
            .finish()
    }
}

impl SignatureVerifier {
    #[must_use]
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            tolerance: Duration::seconds(DEFAULT_TOLERANCE_SECS),
        }
    }

    /// Hex signature for `timestamp`.
    #[must_use]
    pub fn sign(&self, timestamp: &str) -> String {
        hex::encode(self.mac(timestamp).finalize().into_bytes())
    }

    /// Verify a signature against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`SignatureError`] if the timestamp is malformed or stale, or
    /// the signature does not match.
    pub fn verify(&self, timestamp: &str, signature: &str) -> Result<(), SignatureError> {
        self.verify_at(timestamp, signature, Utc::now())
    }

    /// Verify a signature as of `now`.
    ///
    /// # Errors
    ///
    /// See [`SignatureVerifier::verify`].
    pub fn verify_at(
        &self,
        timestamp: &str,
        signature: &str,
        now: DateTime<Utc>,
    ) -> Result<(), SignatureError> {
        let signed_at = DateTime::parse_from_rfc3339(timestamp)
            .map_err(|_| SignatureError::InvalidTimestamp)?
            .with_timezone(&Utc);

        if (now - signed_at).abs() > self.tolerance {
            return Err(SignatureError::Expired);
        }

        let provided = hex::decode(signature).map_err(|_| SignatureError::Mismatch)?;

        // verify_slice compares in constant time
        self.mac(timestamp)
            .verify_slice(&provided)
            .map_err(|_| SignatureError::Mismatch)
    }

    fn mac(&self, timestamp: &str) -> HmacSha256 {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(self.secret.expose_secret().as_bytes())
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(timestamp.as_bytes());
        mac
    }
}

fn header<'a>(request: &'a Request, name: &'static str) -> Result<&'a str, SignatureError> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or(SignatureError::MissingHeader(name))
}

/// Middleware rejecting requests that are not signed by Cashier.
pub async fn verify_signature(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let verified = header(&request, TIMESTAMP_HEADER).and_then(|timestamp| {
        let signature = header(&request, SIGNATURE_HEADER)?;
        state.signatures().verify(timestamp, signature)
    });

    match verified {
        Ok(()) => {
            debug!("Request signature verified");
            next.run(request).await
        }
        Err(err) => AppError::from(err).into_response(),
    }
}
