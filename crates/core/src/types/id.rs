//! Newtype identifiers for Cashier routing context.
//!
//! Cashier addresses every shop-scoped API call as
//! `/api/v1/{platform}/{shop}/...`. Use the `define_routing_id!` macro to
//! create string wrappers that cannot be swapped by accident and are always a
//! single, non-empty path segment.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A routing identifier could not be used as a path segment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdentifier {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    /// Anything beyond `[A-Za-z0-9._-]`, or a bare `.`/`..` segment.
    #[error("{0} contains characters not allowed in a path segment")]
    Unsafe(&'static str),
}

/// Whether `value` can be placed in a URL path as one segment, unencoded.
#[must_use]
pub fn is_path_segment(value: &str) -> bool {
    !value.chars().all(|c| c == '.')
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
}

/// Macro to define a type-safe, non-empty path segment identifier.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize` as a bare string, `Deserialize` through validation
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `try_new()` rejecting blank values and anything that is not a single
///   path segment, `as_str()`
/// - `Display` and `TryFrom<String>`
///
/// # Example
///
/// ```rust
/// # use cashier_bopis_core::define_routing_id;
/// define_routing_id!(Platform);
/// define_routing_id!(ShopDomain);
///
/// let platform = Platform::try_new("shopify").unwrap();
/// assert!(ShopDomain::try_new("  ").is_err());
/// assert!(ShopDomain::try_new("a/../admin").is_err());
///
/// // These are different types, so this won't compile:
/// // let _: ShopDomain = platform;
/// ```
#[macro_export]
macro_rules! define_routing_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Create a new identifier.
            ///
            /// # Errors
            ///
            /// Returns `InvalidIdentifier::Empty` when the trimmed value is
            /// empty and `InvalidIdentifier::Unsafe` when it is not a single
            /// URL path segment.
            pub fn try_new(
                value: impl Into<String>,
            ) -> ::core::result::Result<Self, $crate::types::id::InvalidIdentifier> {
                let value = value.into();
                if value.trim().is_empty() {
                    return Err($crate::types::id::InvalidIdentifier::Empty(stringify!($name)));
                }
                if !$crate::types::id::is_path_segment(&value) {
                    return Err($crate::types::id::InvalidIdentifier::Unsafe(stringify!($name)));
                }
                Ok(Self(value))
            }

            /// Get the underlying string value.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::types::id::InvalidIdentifier;

            fn try_from(value: String) -> ::core::result::Result<Self, Self::Error> {
                Self::try_new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

// Platform name as Cashier reports it, e.g. `shopify` or `bigcommerce`.
define_routing_id!(Platform);
// Shop domain, e.g. `example.myshopify.com` or `store-wxyz.mybigcommerce.com`.
define_routing_id!(ShopDomain);

/// The `(platform, shop)` pair every shop-scoped Cashier call is keyed by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderContext {
    pub platform: Platform,
    pub shop: ShopDomain,
}

impl ProviderContext {
    /// Create a routing context from already-validated identifiers.
    #[must_use]
    pub const fn new(platform: Platform, shop: ShopDomain) -> Self {
        Self { platform, shop }
    }

    /// Path prefix for shop-scoped Cashier API calls.
    #[must_use]
    pub fn api_path(&self) -> String {
        format!("/api/v1/{}/{}", self.platform, self.shop)
    }
}
