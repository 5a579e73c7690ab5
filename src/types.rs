//! Request and outcome types for the authentication operations.

use crate::store::User;
use serde::{Deserialize, Serialize};

/// Registration request.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    /// Display name for the new account.
    pub name: String,
    /// Email address (normalized by the engine before lookup).
    pub email: String,
    /// Plaintext password; hashed inside the credential store.
    pub password: String,
}

/// Login request.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Client user-agent, captured on the session record.
    pub user_agent: String,
}

/// Outcome of a login attempt with verified credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginOutcome {
    /// A session was established and tokens were issued.
    Completed {
        user: User,
        access_token: String,
        refresh_token: String,
    },
    /// A second factor is required; no session or token exists yet. The
    /// caller must drive the MFA challenge flow before logging in again.
    MfaRequired,
}

impl LoginOutcome {
    pub fn mfa_required(&self) -> bool {
        matches!(self, Self::MfaRequired)
    }
}

/// Outcome of a refresh call.
#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    /// Fresh access token, issued on every successful refresh.
    pub access_token: String,
    /// New refresh token, present only when rotation occurred. Its absence
    /// tells the caller to keep using the refresh token it already holds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}
