use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Seconds before expiry at which a token is treated as stale.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub id_token: String,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl AuthTokens {
    pub fn new(
        id_token: impl Into<String>,
        access_token: impl Into<String>,
        refresh_token: Option<String>,
        expires_in_secs: i64,
    ) -> Self {
        Self {
            id_token: id_token.into(),
            access_token: access_token.into(),
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_SKEW_SECS) >= self.expires_at
    }

    /// A refresh response carries no refresh token; keep the one we had.
    pub fn with_fallback_refresh(mut self, previous: Option<String>) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous;
        }
        self
    }
}

/// Server-issued state for a forced password reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPasswordChallenge {
    pub username: String,
    pub session: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    Authenticated(AuthTokens),
    NewPasswordRequired(NewPasswordChallenge),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_with_skew() {
        let tokens = AuthTokens::new("id", "access", None, 3600);
        assert!(!tokens.is_expired());
        assert!(tokens.is_expired_at(tokens.expires_at - Duration::seconds(30)));
        assert!(!tokens.is_expired_at(tokens.expires_at - Duration::seconds(120)));
    }

    #[test]
    fn test_fallback_refresh() {
        let refreshed = AuthTokens::new("id2", "access2", None, 3600)
            .with_fallback_refresh(Some("r1".to_string()));
        assert_eq!(refreshed.refresh_token.as_deref(), Some("r1"));

        let rotated = AuthTokens::new("id2", "access2", Some("r2".to_string()), 3600)
            .with_fallback_refresh(Some("r1".to_string()));
        assert_eq!(rotated.refresh_token.as_deref(), Some("r2"));
    }
}
