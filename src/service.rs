//! The authentication service: register, login, and refresh.
//!
//! Composes the credential store, session store, token codec, and clock,
//! all passed in at construction. The service itself holds no durable
//! state, so every call is independently cancellable by the caller.
//!
//! This module emits tracing events for security monitoring:
//! - `auth.user.registered` - New account created
//! - `auth.login.failed` - Credential check failed
//! - `auth.login.mfa_required` - Login stopped at the MFA gate
//! - `auth.session.created` - New session created on login
//! - `auth.token.refresh` - Successful token refresh
//! - `auth.token.rotated` - Refresh token rotated, session extended
//! - `auth.session.expired` - Refresh attempted on an expired session

use crate::clock::{Clock, SystemClock};
use crate::config::AuthConfig;
use crate::error::{AuthError, Result};
use crate::store::{CredentialStore, Session, SessionStore, User, VerificationCode};
use crate::token::TokenCodec;
use crate::types::{LoginOutcome, LoginRequest, RefreshOutcome, RegisterRequest};
use std::sync::Arc;
use uuid::Uuid;

/// Orchestrates the session/token lifecycle.
///
/// # Example
///
/// ```rust,ignore
/// use breakwater::{AuthConfig, AuthService, InMemoryCredentialStore, InMemorySessionStore};
///
/// let service = AuthService::new(
///     InMemoryCredentialStore::new(),
///     InMemorySessionStore::new(),
///     AuthConfig::with_secrets("access-secret", "refresh-secret", "my-app"),
/// );
///
/// let outcome = service.login(req).await?;
/// ```
pub struct AuthService<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    users: C,
    sessions: S,
    codec: TokenCodec,
    clock: Arc<dyn Clock>,
    config: AuthConfig,
}

impl<C, S> AuthService<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    /// Create a service using the system clock.
    pub fn new(users: C, sessions: S, config: AuthConfig) -> Self {
        Self::with_clock(users, sessions, config, Arc::new(SystemClock))
    }

    /// Create a service with an explicit clock (manual clocks make the
    /// rotation threshold and TTLs deterministic under test).
    pub fn with_clock(users: C, sessions: S, config: AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            sessions,
            codec: TokenCodec::new(&config),
            clock,
            config,
        }
    }

    /// Register a new account.
    ///
    /// Creates the user and an email-verification code expiring
    /// `verification_code_ttl` from now. No tokens are issued at
    /// registration; verification is a prerequisite enforced elsewhere.
    pub async fn register(&self, req: RegisterRequest) -> Result<User> {
        let email = req.email.trim().to_lowercase();

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        // The store enforces uniqueness again at the write path, so a
        // concurrent register racing past the check above still surfaces
        // EmailAlreadyExists rather than a second account.
        let user = self.users.create_user(&req.name, &email, &req.password).await?;

        let expires_at = self.clock.now() + self.config.verification_code_ttl;
        self.users
            .create_verification_code(VerificationCode::email_verification(user.id, expires_at))
            .await?;

        tracing::info!(
            target: "auth.user.registered",
            user_id = %user.id,
            "user registered"
        );

        Ok(user)
    }

    /// Verify credentials and, unless the MFA gate intervenes, establish a
    /// session and issue a token pair.
    ///
    /// Unknown email and wrong password fail identically with
    /// [`AuthError::InvalidCredentials`] so callers cannot enumerate
    /// accounts.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginOutcome> {
        let email = req.email.trim().to_lowercase();

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                tracing::warn!(target: "auth.login.failed", "login with unknown email");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.users.verify_password(&user, &req.password).await? {
            tracing::warn!(
                target: "auth.login.failed",
                user_id = %user.id,
                "login with wrong password"
            );
            return Err(AuthError::InvalidCredentials);
        }

        if user.mfa_enabled {
            tracing::info!(
                target: "auth.login.mfa_required",
                user_id = %user.id,
                "login stopped at MFA gate"
            );
            return Ok(LoginOutcome::MfaRequired);
        }

        let now = self.clock.now();
        let session = Session {
            id: Uuid::new_v4(),
            user_id: user.id,
            user_agent: req.user_agent,
            expires_at: now + self.config.refresh_token_ttl,
        };
        self.sessions.create(&session).await?;

        let session_id = session.id.to_string();
        let access_token = self.codec.sign_access(&user.id.to_string(), &session_id, now)?;
        let refresh_token = self.codec.sign_refresh(&session_id, now)?;

        tracing::info!(
            target: "auth.session.created",
            user_id = %user.id,
            session_id = %session.id,
            "session created"
        );

        Ok(LoginOutcome::Completed {
            user,
            access_token,
            refresh_token,
        })
    }

    /// Mint a fresh access token from a refresh token, rotating the refresh
    /// token when the backing session is within the rotation threshold of
    /// expiry.
    ///
    /// Rotating only near expiry bounds the blast radius of a leaked
    /// long-lived refresh token while avoiding token churn on every call.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshOutcome> {
        let now = self.clock.now();

        // Signature/structure check comes first; an invalid token never
        // reaches the session store.
        let claims = self.codec.verify_refresh(refresh_token, now)?;
        let session_id = Uuid::parse_str(&claims.sid).map_err(|_| {
            tracing::warn!(target: "auth.token.invalid", "refresh token with malformed session id");
            AuthError::InvalidRefreshToken
        })?;

        let mut session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| {
                tracing::warn!(
                    target: "auth.token.invalid",
                    session_id = %session_id,
                    "refresh for unknown session"
                );
                AuthError::SessionNotFound
            })?;

        if session.expires_at <= now {
            tracing::warn!(
                target: "auth.session.expired",
                session_id = %session.id,
                user_id = %session.user_id,
                "refresh attempted on expired session"
            );
            return Err(AuthError::SessionExpired);
        }

        let remaining = session.expires_at.duration_since(now).unwrap_or_default();
        let refresh_token = if remaining <= self.config.rotation_threshold {
            session.expires_at = now + self.config.refresh_token_ttl;
            self.sessions.save(&session).await?;

            tracing::info!(
                target: "auth.token.rotated",
                session_id = %session.id,
                user_id = %session.user_id,
                "refresh token rotated, session extended"
            );

            Some(self.codec.sign_refresh(&claims.sid, now)?)
        } else {
            None
        };

        let access_token = self
            .codec
            .sign_access(&session.user_id.to_string(), &claims.sid, now)?;

        tracing::info!(
            target: "auth.token.refresh",
            session_id = %session.id,
            user_id = %session.user_id,
            rotated = refresh_token.is_some(),
            "token refreshed"
        );

        Ok(RefreshOutcome {
            access_token,
            refresh_token,
        })
    }

    /// The token codec, for consumers that need to verify access tokens on
    /// incoming requests.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// The injected clock.
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::password::{PasswordConfig, PasswordHasher};
    use crate::store::{InMemoryCredentialStore, InMemorySessionStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, UNIX_EPOCH};

    fn test_config() -> AuthConfig {
        AuthConfig::with_secrets(
            "access-secret-key-32-bytes-long!",
            "refresh-secret-key-32-bytes-lng!",
            "test-app",
        )
    }

    fn test_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        ))
    }

    fn test_users() -> InMemoryCredentialStore {
        InMemoryCredentialStore::with_hasher(PasswordHasher::new(PasswordConfig::fast()))
    }

    /// Session store that counts lookups, to pin down ordering guarantees.
    #[derive(Clone, Default)]
    struct CountingSessionStore {
        inner: InMemorySessionStore,
        lookups: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl SessionStore for CountingSessionStore {
        async fn create(&self, session: &Session) -> Result<()> {
            self.inner.create(session).await
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }

        async fn save(&self, session: &Session) -> Result<()> {
            self.inner.save(session).await
        }
    }

    /// Credential store whose lookups always fail, to verify propagation.
    struct FailingCredentialStore;

    #[async_trait]
    impl CredentialStore for FailingCredentialStore {
        async fn find_by_email(&self, _email: &str) -> Result<Option<User>> {
            Err(anyhow::anyhow!("backend unavailable").into())
        }

        async fn create_user(&self, _name: &str, _email: &str, _password: &str) -> Result<User> {
            Err(anyhow::anyhow!("backend unavailable").into())
        }

        async fn verify_password(&self, _user: &User, _password: &str) -> Result<bool> {
            Err(anyhow::anyhow!("backend unavailable").into())
        }

        async fn create_verification_code(&self, _code: VerificationCode) -> Result<()> {
            Err(anyhow::anyhow!("backend unavailable").into())
        }
    }

    #[tokio::test]
    async fn test_invalid_refresh_token_fails_before_store_lookup() {
        let sessions = CountingSessionStore::default();
        let lookups = sessions.lookups.clone();
        let service =
            AuthService::with_clock(test_users(), sessions, test_config(), test_clock());

        let err = service.refresh("garbage.token.here").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidRefreshToken));
        assert_eq!(lookups.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mfa_gate_creates_no_session() {
        let users = test_users();
        users
            .add_user("Ada", "ada@example.com", "hunter2!", true)
            .await
            .unwrap();
        let sessions = InMemorySessionStore::new();
        let service =
            AuthService::with_clock(users, sessions.clone(), test_config(), test_clock());

        let outcome = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "hunter2!".to_string(),
                user_agent: "test-agent".to_string(),
            })
            .await
            .unwrap();

        assert!(outcome.mfa_required());
        assert_eq!(sessions.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_failures_propagate_typed() {
        let service = AuthService::with_clock(
            FailingCredentialStore,
            InMemorySessionStore::new(),
            test_config(),
            test_clock(),
        );

        let err = service
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "hunter2!".to_string(),
                user_agent: "test-agent".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));

        let err = service
            .register(RegisterRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "hunter2!".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Store(_)));
    }

    #[tokio::test]
    async fn test_refresh_token_from_foreign_session_id() {
        // A verified token whose session was never persisted: the lookup
        // happens (exactly once) and fails with SessionNotFound.
        let sessions = CountingSessionStore::default();
        let lookups = sessions.lookups.clone();
        let clock = test_clock();
        let config = test_config();
        let service =
            AuthService::with_clock(test_users(), sessions, config.clone(), clock.clone());

        let codec = TokenCodec::new(&config);
        let token = codec
            .sign_refresh(&Uuid::new_v4().to_string(), clock.now())
            .unwrap();

        let err = service.refresh(&token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));
        assert_eq!(lookups.load(Ordering::SeqCst), 1);
    }
}
