//! Signed token codec.
//!
//! Signs and verifies the two token kinds as compact JWTs (HS256). Each
//! kind has its own secret and TTL, so an access token can never verify
//! under the refresh options or vice versa. Verification is pure CPU work:
//! no I/O, no store lookups.
//!
//! Expiry is compared against the caller-supplied `now` rather than wall
//! time, so token lifetimes are deterministic under a manual clock.

use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Token kind discriminator, embedded in every token as `token_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Short-lived, authorizes API requests.
    Access,
    /// Long-lived, scoped to a session, mints new access tokens.
    Refresh,
}

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (user id).
    pub sub: String,
    /// Session id the token was issued from.
    pub sid: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration time (unix timestamp).
    pub exp: u64,
    /// Issued at (unix timestamp).
    pub iat: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
    /// Token kind.
    pub token_type: TokenKind,
}

/// Claims carried by a refresh token.
///
/// Deliberately carries no user id: the token is scoped to the session, so
/// the session record alone is the authority to renew.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Session id the token is scoped to.
    pub sid: String,
    /// Issuer.
    pub iss: String,
    /// Audience.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Expiration time (unix timestamp).
    pub exp: u64,
    /// Issued at (unix timestamp).
    pub iat: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
    /// Token kind.
    pub token_type: TokenKind,
}

struct SigningOptions {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SigningOptions {
    fn hs256(secret: &[u8], issuer: &str, audience: Option<&str>, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock, not wall time.
        validation.validate_exp = false;
        validation.set_issuer(&[issuer]);
        match audience {
            Some(aud) => validation.set_audience(&[aud]),
            None => validation.validate_aud = false,
        }

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }
}

/// Signs and verifies access and refresh tokens.
pub struct TokenCodec {
    access: SigningOptions,
    refresh: SigningOptions,
    issuer: String,
    audience: Option<String>,
}

impl TokenCodec {
    pub fn new(config: &AuthConfig) -> Self {
        let access = SigningOptions::hs256(
            config.access_secret(),
            &config.issuer,
            config.audience.as_deref(),
            config.access_token_ttl,
        );
        let refresh = SigningOptions::hs256(
            config.refresh_secret(),
            &config.issuer,
            config.audience.as_deref(),
            config.refresh_token_ttl,
        );

        Self {
            access,
            refresh,
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
        }
    }

    /// Sign an access token embedding the user and session ids.
    pub fn sign_access(&self, user_id: &str, session_id: &str, now: SystemTime) -> Result<String> {
        let iat = unix_secs(now);
        let claims = AccessClaims {
            sub: user_id.to_owned(),
            sid: session_id.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: iat + self.access.ttl.as_secs(),
            iat,
            jti: generate_jti(),
            token_type: TokenKind::Access,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.access.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to encode access token: {}", e)))
    }

    /// Sign a refresh token scoped to a session.
    pub fn sign_refresh(&self, session_id: &str, now: SystemTime) -> Result<String> {
        let iat = unix_secs(now);
        let claims = RefreshClaims {
            sid: session_id.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: iat + self.refresh.ttl.as_secs(),
            iat,
            jti: generate_jti(),
            token_type: TokenKind::Refresh,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.refresh.encoding)
            .map_err(|e| AuthError::Internal(format!("failed to encode refresh token: {}", e)))
    }

    /// Verify an access token: signature, structure, issuer/audience, kind,
    /// and expiry relative to `now`.
    pub fn verify_access(&self, token: &str, now: SystemTime) -> Result<AccessClaims> {
        let claims = decode::<AccessClaims>(token, &self.access.decoding, &self.access.validation)
            .map_err(|e| {
                tracing::warn!(
                    target: "auth.token.invalid",
                    error = %e,
                    "invalid access token presented"
                );
                AuthError::InvalidAccessToken
            })?
            .claims;

        if claims.token_type != TokenKind::Access {
            tracing::warn!(
                target: "auth.token.invalid",
                token_type = ?claims.token_type,
                "wrong token kind presented as access token"
            );
            return Err(AuthError::InvalidAccessToken);
        }

        if claims.exp <= unix_secs(now) {
            tracing::warn!(target: "auth.token.invalid", "expired access token presented");
            return Err(AuthError::InvalidAccessToken);
        }

        Ok(claims)
    }

    /// Verify a refresh token: signature, structure, issuer/audience, kind,
    /// and expiry relative to `now`.
    pub fn verify_refresh(&self, token: &str, now: SystemTime) -> Result<RefreshClaims> {
        let claims = decode::<RefreshClaims>(token, &self.refresh.decoding, &self.refresh.validation)
            .map_err(|e| {
                tracing::warn!(
                    target: "auth.token.invalid",
                    error = %e,
                    "invalid refresh token presented"
                );
                AuthError::InvalidRefreshToken
            })?
            .claims;

        if claims.token_type != TokenKind::Refresh {
            tracing::warn!(
                target: "auth.token.invalid",
                token_type = ?claims.token_type,
                "wrong token kind presented as refresh token"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        if claims.exp <= unix_secs(now) {
            tracing::warn!(target: "auth.token.invalid", "expired refresh token presented");
            return Err(AuthError::InvalidRefreshToken);
        }

        Ok(claims)
    }
}

fn unix_secs(t: SystemTime) -> u64 {
    t.duration_since(UNIX_EPOCH).unwrap_or_default().as_secs()
}

fn generate_jti() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 16];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthError;

    fn test_config() -> AuthConfig {
        AuthConfig::with_secrets(
            "access-secret-key-32-bytes-long!",
            "refresh-secret-key-32-bytes-lng!",
            "test-app",
        )
    }

    fn fixed_now() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(1_700_000_000)
    }

    #[test]
    fn test_access_round_trip() {
        let codec = TokenCodec::new(&test_config());
        let now = fixed_now();

        let token = codec.sign_access("user-1", "session-1", now).unwrap();
        let claims = codec.verify_access(&token, now).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.sid, "session-1");
        assert_eq!(claims.iss, "test-app");
        assert_eq!(claims.token_type, TokenKind::Access);
        assert_eq!(claims.exp, claims.iat + 15 * 60);
    }

    #[test]
    fn test_refresh_round_trip() {
        let codec = TokenCodec::new(&test_config());
        let now = fixed_now();

        let token = codec.sign_refresh("session-1", now).unwrap();
        let claims = codec.verify_refresh(&token, now).unwrap();

        assert_eq!(claims.sid, "session-1");
        assert_eq!(claims.token_type, TokenKind::Refresh);
        assert_eq!(claims.exp, claims.iat + 7 * 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_token_carries_no_user_id() {
        let codec = TokenCodec::new(&test_config());
        let token = codec.sign_refresh("session-1", fixed_now()).unwrap();

        let payload = token.split('.').nth(1).unwrap();
        let bytes = URL_SAFE_NO_PAD.decode(payload).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert!(value.get("sub").is_none());
        assert_eq!(value["sid"], "session-1");
    }

    #[test]
    fn test_kinds_do_not_cross_verify() {
        let codec = TokenCodec::new(&test_config());
        let now = fixed_now();

        let access = codec.sign_access("user-1", "session-1", now).unwrap();
        let refresh = codec.sign_refresh("session-1", now).unwrap();

        assert!(matches!(
            codec.verify_refresh(&access, now),
            Err(AuthError::InvalidRefreshToken)
        ));
        assert!(matches!(
            codec.verify_access(&refresh, now),
            Err(AuthError::InvalidAccessToken)
        ));
    }

    #[test]
    fn test_kind_check_holds_even_with_shared_secret() {
        // Same secret for both kinds: the token_type discriminator still
        // keeps a refresh token out of the access path.
        let config = AuthConfig::with_secrets("shared-secret", "shared-secret", "test-app");
        let codec = TokenCodec::new(&config);
        let now = fixed_now();

        let refresh = codec.sign_refresh("session-1", now).unwrap();
        assert!(codec.verify_access(&refresh, now).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let codec = TokenCodec::new(&test_config());
        let now = fixed_now();

        let token = codec.sign_refresh("session-1", now).unwrap();

        let just_before = now + Duration::from_secs(7 * 86400 - 1);
        assert!(codec.verify_refresh(&token, just_before).is_ok());

        let at_expiry = now + Duration::from_secs(7 * 86400);
        assert!(matches!(
            codec.verify_refresh(&token, at_expiry),
            Err(AuthError::InvalidRefreshToken)
        ));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let codec = TokenCodec::new(&test_config());
        let now = fixed_now();

        let mut token = codec.sign_refresh("session-1", now).unwrap();
        token.pop();
        token.push('x');

        assert!(codec.verify_refresh(&token, now).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        let codec = TokenCodec::new(&test_config());
        assert!(codec.verify_refresh("not-a-token", fixed_now()).is_err());
        assert!(codec.verify_access("", fixed_now()).is_err());
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = AuthConfig::with_secrets(
            "access-secret-key-32-bytes-long!",
            "refresh-secret-key-32-bytes-lng!",
            "other-app",
        );
        let codec = TokenCodec::new(&test_config());
        let other_codec = TokenCodec::new(&other);
        let now = fixed_now();

        let token = other_codec.sign_refresh("session-1", now).unwrap();
        assert!(codec.verify_refresh(&token, now).is_err());
    }
}
