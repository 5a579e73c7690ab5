//! Configuration for the authentication engine.
//!
//! All durations that govern the token/session lifecycle live here so the
//! service and codec never reach for ambient constants.

use std::time::Duration;

/// Configuration for token issuance and session lifetimes.
///
/// Access and refresh tokens are signed with *distinct* secrets so a token
/// of one kind can never verify under the other kind's options.
///
/// # Example
///
/// ```rust,ignore
/// use breakwater::AuthConfig;
/// use std::time::Duration;
///
/// let config = AuthConfig::with_secrets("access-secret", "refresh-secret", "my-app")
///     .audience("my-app-clients")
///     .access_token_ttl(Duration::from_secs(10 * 60));
/// ```
#[derive(Clone)]
pub struct AuthConfig {
    access_secret: Vec<u8>,
    refresh_secret: Vec<u8>,
    /// Token issuer (iss claim).
    pub issuer: String,
    /// Token audience (aud claim).
    pub audience: Option<String>,
    /// Access token expiry (default: 15 minutes).
    pub access_token_ttl: Duration,
    /// Refresh token / session expiry (default: 7 days).
    pub refresh_token_ttl: Duration,
    /// Remaining session validity at or below which a refresh call rotates
    /// the refresh token and extends the session (default: 1 day).
    pub rotation_threshold: Duration,
    /// Email verification code expiry (default: 45 minutes).
    pub verification_code_ttl: Duration,
}

impl AuthConfig {
    /// Create a config with HS256 secrets for each token kind.
    pub fn with_secrets(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
        issuer: impl Into<String>,
    ) -> Self {
        Self {
            access_secret: access_secret.into().into_bytes(),
            refresh_secret: refresh_secret.into().into_bytes(),
            issuer: issuer.into(),
            audience: None,
            access_token_ttl: Duration::from_secs(15 * 60),
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            rotation_threshold: Duration::from_secs(24 * 60 * 60),
            verification_code_ttl: Duration::from_secs(45 * 60),
        }
    }

    /// Set the token audience.
    pub fn audience(mut self, aud: impl Into<String>) -> Self {
        self.audience = Some(aud.into());
        self
    }

    /// Set the access token TTL.
    pub fn access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    /// Set the refresh token TTL. New and rotated sessions expire this far
    /// in the future.
    pub fn refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Set the rotation threshold.
    pub fn rotation_threshold(mut self, threshold: Duration) -> Self {
        self.rotation_threshold = threshold;
        self
    }

    /// Set the verification code TTL.
    pub fn verification_code_ttl(mut self, ttl: Duration) -> Self {
        self.verification_code_ttl = ttl;
        self
    }

    pub(crate) fn access_secret(&self) -> &[u8] {
        &self.access_secret
    }

    pub(crate) fn refresh_secret(&self) -> &[u8] {
        &self.refresh_secret
    }
}
