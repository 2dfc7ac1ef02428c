//! Token types for Control-R authentication.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

macro_rules! opaque_token {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        ///
        /// # Security
        ///
        /// - Never logged or displayed in Debug output
        /// - Treat as opaque; do not parse or inspect
        #[derive(Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw token value.
            pub fn new(token: impl Into<String>) -> Self {
                Self(token.into())
            }

            /// Returns the raw token value.
            ///
            /// # Security
            ///
            /// Use only when building provider requests, authorization
            /// headers, or when persisting a session.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_tuple(stringify!($name)).field(&"[REDACTED]").finish()
            }
        }
    };
}

opaque_token!(
    /// An identity token; sent as the bearer token on every API request.
    IdToken
);

opaque_token!(
    /// An access token; its validity window decides when to renew.
    AccessToken
);

opaque_token!(
    /// A refresh token for obtaining new id and access tokens without the
    /// account password.
    RefreshToken
);

/// The id/access token pair. One is never stored without the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionTokens {
    id_token: IdToken,
    access_token: AccessToken,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionTokens {
    /// Create a token pair with no explicit expiry.
    ///
    /// The expiry is then read from the access token's `exp` claim when it is
    /// a JWT.
    pub fn new(id_token: IdToken, access_token: AccessToken) -> Self {
        Self {
            id_token,
            access_token,
            expires_at: None,
        }
    }

    /// Set an explicit expiry instant.
    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn id_token(&self) -> &IdToken {
        &self.id_token
    }

    pub fn access_token(&self) -> &AccessToken {
        &self.access_token
    }

    /// Returns when the access token stops being valid, if known.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
            .or_else(|| jwt_expiry(self.access_token.as_str()))
    }

    /// Returns true if the access token is outside its validity window at `now`.
    ///
    /// Tokens with no known expiry are never considered expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| now >= expires_at)
    }
}

/// Everything a successful login yields.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub tokens: SessionTokens,
    pub refresh_token: RefreshToken,
}

/// Snapshot of the credential store.
#[derive(Debug, Clone, Default)]
pub struct SessionCredentials {
    pub identity: Option<String>,
    pub tokens: Option<SessionTokens>,
    pub refresh_token: Option<RefreshToken>,
}

impl SessionCredentials {
    pub fn id_token(&self) -> Option<&IdToken> {
        self.tokens.as_ref().map(SessionTokens::id_token)
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.tokens.as_ref().map(SessionTokens::access_token)
    }

    /// Returns true if an id/access token pair is present.
    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_some()
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Read the `exp` claim of a JWT without verifying it.
fn jwt_expiry(token: &str) -> Option<DateTime<Utc>> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let claim: ExpiryClaim = serde_json::from_slice(&bytes).ok()?;
    DateTime::from_timestamp(claim.exp, 0)
}
