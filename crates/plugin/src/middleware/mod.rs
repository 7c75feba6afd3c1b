//! HTTP middleware for the plugin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the span)
//! 4. Signature verification (platform-called routes only)

pub mod request_id;
pub mod signature;

pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use signature::{SignatureError, SignatureVerifier, verify_signature};
