//! Breakwater - session and token lifecycle engine
//!
//! Breakwater issues and manages authenticated sessions for multi-user
//! services: account registration, credential verification, session
//! creation, access/refresh token issuance, and sliding refresh-token
//! rotation with an optional MFA gate. It is transport-agnostic: HTTP
//! routing, cookie handling, and email delivery live in the application
//! around it, talking to the engine through plain async calls.
//!
//! # Features
//!
//! - **Tokens**: HS256 JWTs with distinct secrets per kind; access tokens
//!   embed `{user id, session id}`, refresh tokens are scoped to the
//!   session alone
//! - **Rotation**: refresh tokens rotate (and the session extends) only
//!   when remaining session validity falls at or below a threshold
//! - **MFA gate**: logins for MFA-enabled accounts stop before any session
//!   or token is issued
//! - **Pluggable storage**: implement [`CredentialStore`] and
//!   [`SessionStore`] for your database, or use the in-memory stores
//! - **Deterministic time**: an injected [`Clock`] makes every TTL and the
//!   rotation threshold testable with a manual clock
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use breakwater::{
//!     AuthConfig, AuthService, InMemoryCredentialStore, InMemorySessionStore, LoginRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() {
//!     breakwater::init_tracing();
//!
//!     let service = AuthService::new(
//!         InMemoryCredentialStore::new(),
//!         InMemorySessionStore::new(),
//!         AuthConfig::with_secrets("access-secret", "refresh-secret", "my-app"),
//!     );
//!
//!     let outcome = service
//!         .login(LoginRequest {
//!             email: "user@example.com".to_string(),
//!             password: "password".to_string(),
//!             user_agent: "cli/1.0".to_string(),
//!         })
//!         .await;
//!     println!("{outcome:?}");
//! }
//! ```

pub mod clock;
pub mod config;
mod error;
pub mod password;
pub mod service;
pub mod store;
pub mod token;
pub mod types;

// Re-exports for public API
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::AuthConfig;
pub use error::{AuthError, ErrorClass, Result};
pub use password::{PasswordConfig, PasswordHasher};
pub use service::AuthService;
pub use store::{
    CredentialStore, InMemoryCredentialStore, InMemorySessionStore, Session, SessionStore, User,
    VerificationCode, VerificationKind,
};
pub use token::{AccessClaims, RefreshClaims, TokenCodec, TokenKind};
pub use types::{LoginOutcome, LoginRequest, RefreshOutcome, RegisterRequest};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "breakwater=debug")
/// - `BREAKWATER_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("BREAKWATER_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
