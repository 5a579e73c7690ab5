//! In-memory store implementations.
//!
//! Back both storage traits with a `HashMap`. Suitable for development and
//! testing, not for production (records are lost on restart and not shared
//! across instances).

use crate::error::{AuthError, Result};
use crate::password::PasswordHasher;
use crate::store::session::{Session, SessionStore};
use crate::store::user::{CredentialStore, User, VerificationCode};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

struct StoredUser {
    user: User,
    password_hash: String,
}

/// In-memory credential store, keyed by email.
///
/// Owns the password hasher; the plaintext password never goes further than
/// [`create_user`](CredentialStore::create_user) and
/// [`verify_password`](CredentialStore::verify_password).
#[derive(Clone)]
pub struct InMemoryCredentialStore {
    users: Arc<RwLock<HashMap<String, StoredUser>>>,
    codes: Arc<RwLock<Vec<VerificationCode>>>,
    hasher: PasswordHasher,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::with_hasher(PasswordHasher::default())
    }

    /// Create a store with a custom hasher (e.g. fast params for tests).
    pub fn with_hasher(hasher: PasswordHasher) -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            codes: Arc::new(RwLock::new(Vec::new())),
            hasher,
        }
    }

    /// Seed an account directly, bypassing the registration flow.
    pub async fn add_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        mfa_enabled: bool,
    ) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_lowercase(),
            mfa_enabled,
        };
        let password_hash = self.hasher.hash(password)?;

        let mut users = self.users.write().await;
        users.insert(
            user.email.clone(),
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    /// Number of persisted accounts.
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Verification codes recorded for a user.
    pub async fn verification_codes_for(&self, user_id: Uuid) -> Vec<VerificationCode> {
        self.codes
            .read()
            .await
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(email).map(|s| s.user.clone()))
    }

    async fn create_user(&self, name: &str, email: &str, password: &str) -> Result<User> {
        // Hash outside the lock; only the uniqueness check and insert need it.
        let password_hash = self.hasher.hash(password)?;

        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(AuthError::EmailAlreadyExists);
        }

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            mfa_enabled: false,
        };
        users.insert(
            user.email.clone(),
            StoredUser {
                user: user.clone(),
                password_hash,
            },
        );
        Ok(user)
    }

    async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let users = self.users.read().await;
        match users.get(&user.email) {
            Some(stored) => self.hasher.verify(password, &stored.password_hash),
            None => Ok(false),
        }
    }

    async fn create_verification_code(&self, code: VerificationCode) -> Result<()> {
        self.codes.write().await.push(code);
        Ok(())
    }
}

/// In-memory session store.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(&id).cloned())
    }

    async fn save(&self, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id, session.clone());
        Ok(())
    }
}
