use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserRole;

/// Correlation id for one chat run. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: Uuid,
    pub role: UserRole,
    pub started_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(role: UserRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            started_at: Utc::now(),
        }
    }

    /// Switching role starts a fresh conversation under the same session id.
    pub fn set_role(&mut self, role: UserRole) {
        self.role = role;
    }
}
