use serde::Serialize;

/// Failure taxonomy for the authentication engine.
///
/// Every failure the engine can surface is a variant here; nothing is
/// swallowed or converted to a generic error. Each variant carries a stable
/// machine-readable code ([`AuthError::code`]) and maps to a coarse class
/// ([`AuthError::class`]) that transport layers can translate to a status
/// code.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Registration attempted with an email that already has an account.
    #[error("email already registered")]
    EmailAlreadyExists,

    /// Unknown email or wrong password. Both cases deliberately collapse
    /// into this one variant so callers cannot distinguish them and
    /// enumerate accounts.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Refresh token failed signature, structure, or expiry checks.
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    /// Access token failed signature, structure, or expiry checks.
    #[error("invalid access token")]
    InvalidAccessToken,

    /// Refresh token verified but its session record is gone.
    #[error("session does not exist")]
    SessionNotFound,

    /// Refresh token verified but its session has passed its expiration.
    #[error("session expired")]
    SessionExpired,

    #[error("internal error: {0}")]
    Internal(String),

    /// Backend failure from a store implementation.
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Coarse failure class, one per transport-level status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Client-correctable: duplicate email, bad credentials.
    BadRequest,
    /// Token or session invalid, expired, or missing.
    Unauthorized,
    Internal,
}

impl AuthError {
    /// Stable machine-readable code for this failure.
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmailAlreadyExists => "AUTH_EMAIL_ALREADY_EXISTS",
            Self::InvalidCredentials => "AUTH_USER_NOT_FOUND",
            Self::InvalidRefreshToken
            | Self::InvalidAccessToken
            | Self::SessionNotFound
            | Self::SessionExpired => "UNAUTHORIZED",
            Self::Internal(_) | Self::Store(_) => "INTERNAL",
        }
    }

    /// The failure class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::EmailAlreadyExists | Self::InvalidCredentials => ErrorClass::BadRequest,
            Self::InvalidRefreshToken
            | Self::InvalidAccessToken
            | Self::SessionNotFound
            | Self::SessionExpired => ErrorClass::Unauthorized,
            Self::Internal(_) | Self::Store(_) => ErrorClass::Internal,
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias used throughout the engine.
pub type Result<T> = std::result::Result<T, AuthError>;
