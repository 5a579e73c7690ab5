//! Credential storage trait.

use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::SystemTime;
use uuid::Uuid;

/// Account record as seen by the engine.
///
/// The credential hash never leaves the store; password checks go through
/// [`CredentialStore::verify_password`].
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Unique, stored lowercase.
    pub email: String,
    /// Whether login must stop at the MFA gate before a session is created.
    pub mfa_enabled: bool,
}

/// Kind tag for verification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationKind {
    EmailVerification,
}

/// One-shot verification code record, created at registration and consumed
/// by the email flow outside this crate.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationCode {
    pub id: Uuid,
    pub user_id: Uuid,
    pub kind: VerificationKind,
    pub expires_at: SystemTime,
}

impl VerificationCode {
    /// Build an email-verification code expiring at `expires_at`.
    pub fn email_verification(user_id: Uuid, expires_at: SystemTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            kind: VerificationKind::EmailVerification,
            expires_at,
        }
    }
}

/// Trait for credential storage operations required by the engine.
///
/// # Example
///
/// ```rust,ignore
/// use breakwater::store::CredentialStore;
/// use async_trait::async_trait;
///
/// struct PgCredentialStore {
///     pool: sqlx::PgPool,
/// }
///
/// #[async_trait]
/// impl CredentialStore for PgCredentialStore {
///     async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
///         // Query your database
///     }
///
///     // ... implement other methods
/// }
/// ```
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user by email address. Callers pass normalized (lowercase)
    /// emails.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Create a new account, hashing `password` internally.
    ///
    /// Implementations must enforce email uniqueness at the write path and
    /// surface a conflict as [`AuthError::EmailAlreadyExists`], closing the
    /// check-then-create race in the engine's register path.
    ///
    /// [`AuthError::EmailAlreadyExists`]: crate::AuthError::EmailAlreadyExists
    async fn create_user(&self, name: &str, email: &str, password: &str) -> Result<User>;

    /// Verify a submitted password against the stored credential.
    async fn verify_password(&self, user: &User, password: &str) -> Result<bool>;

    /// Persist a verification code record.
    async fn create_verification_code(&self, code: VerificationCode) -> Result<()>;
}
