//! Session storage trait.

use crate::error::Result;
use async_trait::async_trait;
use std::time::SystemTime;
use uuid::Uuid;

/// Server-side session record: the authority root for every token that
/// references it.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Client metadata captured at login.
    pub user_agent: String,
    /// Expiration. Only ever moves forward: rotation extends it, nothing
    /// shortens it except the passage of time.
    pub expires_at: SystemTime,
}

/// Trait for session storage operations required by the engine.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a freshly created session.
    async fn create(&self, session: &Session) -> Result<()>;

    /// Fetch a session by id.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Session>>;

    /// Persist an updated expiration after rotation.
    async fn save(&self, session: &Session) -> Result<()>;
}
