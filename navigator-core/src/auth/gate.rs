use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::provider::IdentityProvider;
use super::store::{SessionStore, StoredSession};
use super::tokens::{AuthTokens, NewPasswordChallenge, SignInOutcome};
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::UserRole;

/// Bearer token sent in guest mode. The backend recognises it and grants
/// limited access without an identity-provider session.
pub const GUEST_TOKEN: &str = "guest-demo-token";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStatus {
    SignedOut,
    Guest,
    SignedIn {
        username: Option<String>,
        expires_at: DateTime<Utc>,
    },
}

/// Decides which bearer token accompanies REST and WebSocket calls.
pub struct AuthGate {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn SessionStore>,
}

impl AuthGate {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn SessionStore>) -> Self {
        Self { provider, store }
    }

    pub fn status(&self) -> NavigatorResult<AuthStatus> {
        let session = self.store.load()?;
        Ok(if session.guest {
            AuthStatus::Guest
        } else if let Some(tokens) = session.tokens {
            AuthStatus::SignedIn {
                username: session.username,
                expires_at: tokens.expires_at,
            }
        } else {
            AuthStatus::SignedOut
        })
    }

    pub fn is_guest(&self) -> NavigatorResult<bool> {
        Ok(self.store.load()?.guest)
    }

    /// Guest mode or a stored session.
    pub fn is_authenticated(&self) -> NavigatorResult<bool> {
        let session = self.store.load()?;
        Ok(session.guest || session.tokens.is_some())
    }

    /// Current id token. Guest mode never touches the network.
    pub async fn id_token(&self) -> NavigatorResult<String> {
        let mut session = self.store.load()?;

        if session.guest {
            return Ok(GUEST_TOKEN.to_string());
        }

        let Some(tokens) = session.tokens.clone() else {
            return Err(NavigatorError::not_authenticated());
        };

        if !tokens.is_expired() {
            return Ok(tokens.id_token);
        }

        let Some(refresh_token) = tokens.refresh_token.as_deref() else {
            debug!("Token expired and no refresh token is stored");
            return Err(NavigatorError::not_authenticated());
        };

        match self.provider.refresh(refresh_token).await {
            Ok(fresh) => {
                let fresh = fresh.with_fallback_refresh(tokens.refresh_token.clone());
                let id_token = fresh.id_token.clone();
                session.tokens = Some(fresh);
                self.store.save(&session)?;
                debug!("Id token refreshed");
                Ok(id_token)
            }
            Err(e) if e.is_auth_error() => {
                warn!("Token refresh rejected: {}", e);
                Err(NavigatorError::not_authenticated())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn sign_in(&self, username: &str, password: &str) -> NavigatorResult<SignInOutcome> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(NavigatorError::validation(
                "Username and password are required",
            ));
        }

        let outcome = self.provider.sign_in(username.trim(), password).await?;
        if let SignInOutcome::Authenticated(tokens) = &outcome {
            self.persist_tokens(username.trim(), tokens.clone())?;
        }
        Ok(outcome)
    }

    pub async fn complete_new_password(
        &self,
        challenge: &NewPasswordChallenge,
        new_password: &str,
    ) -> NavigatorResult<AuthTokens> {
        if new_password.is_empty() {
            return Err(NavigatorError::validation("New password is required"));
        }

        let tokens = self
            .provider
            .complete_new_password(challenge, new_password)
            .await?;
        self.persist_tokens(&challenge.username, tokens.clone())?;
        Ok(tokens)
    }

    pub fn enter_guest_mode(&self) -> NavigatorResult<()> {
        let previous = self.store.load()?;
        self.store.save(&StoredSession {
            username: None,
            tokens: None,
            guest: true,
            role: previous.role,
        })?;
        info!("Guest mode enabled");
        Ok(())
    }

    /// Clears tokens, guest flag and role. Remote sign-out is best effort.
    pub async fn logout(&self) -> NavigatorResult<()> {
        let session = self.store.load()?;
        if let Some(tokens) = &session.tokens {
            if let Err(e) = self.provider.sign_out(&tokens.access_token).await {
                warn!("Remote sign-out failed: {}", e);
            }
        }
        self.store.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Role choices are kept locally when there is no real identity.
    pub fn uses_local_role(&self) -> NavigatorResult<bool> {
        let session = self.store.load()?;
        Ok(session.guest || session.tokens.is_none())
    }

    pub fn stored_role(&self) -> NavigatorResult<Option<UserRole>> {
        Ok(self.store.load()?.role)
    }

    pub fn set_stored_role(&self, role: UserRole) -> NavigatorResult<()> {
        let mut session = self.store.load()?;
        session.role = Some(role);
        self.store.save(&session)
    }

    fn persist_tokens(&self, username: &str, tokens: AuthTokens) -> NavigatorResult<()> {
        let previous = self.store.load()?;
        self.store.save(&StoredSession {
            username: Some(username.to_string()),
            tokens: Some(tokens),
            guest: false,
            role: previous.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::store::MemorySessionStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        require_new_password: bool,
    }

    impl CountingProvider {
        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IdentityProvider for CountingProvider {
        async fn sign_in(&self, username: &str, _password: &str) -> NavigatorResult<SignInOutcome> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.require_new_password {
                Ok(SignInOutcome::NewPasswordRequired(NewPasswordChallenge {
                    username: username.to_string(),
                    session: "challenge-session".to_string(),
                }))
            } else {
                Ok(SignInOutcome::Authenticated(AuthTokens::new(
                    "id-1",
                    "access-1",
                    Some("refresh-1".to_string()),
                    3600,
                )))
            }
        }

        async fn complete_new_password(
            &self,
            _challenge: &NewPasswordChallenge,
            _new_password: &str,
        ) -> NavigatorResult<AuthTokens> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AuthTokens::new("id-2", "access-2", None, 3600))
        }

        async fn refresh(&self, _refresh_token: &str) -> NavigatorResult<AuthTokens> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(AuthTokens::new("id-refreshed", "access-refreshed", None, 3600))
        }

        async fn sign_out(&self, _access_token: &str) -> NavigatorResult<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(NavigatorError::ServiceUnavailable("offline".to_string()))
        }
    }

    fn gate(provider: Arc<CountingProvider>) -> (AuthGate, Arc<MemorySessionStore>) {
        let store = Arc::new(MemorySessionStore::new());
        (AuthGate::new(provider, store.clone()), store)
    }

    #[tokio::test]
    async fn test_guest_token_without_network() {
        let provider = Arc::new(CountingProvider::default());
        let (gate, _) = gate(provider.clone());

        gate.enter_guest_mode().unwrap();
        assert_eq!(gate.id_token().await.unwrap(), GUEST_TOKEN);
        assert_eq!(gate.id_token().await.unwrap(), GUEST_TOKEN);
        assert_eq!(provider.calls(), 0);
        assert_eq!(gate.status().unwrap(), AuthStatus::Guest);
    }

    #[tokio::test]
    async fn test_no_token_is_auth_error() {
        let (gate, _) = gate(Arc::new(CountingProvider::default()));
        let err = gate.id_token().await.unwrap_err();
        assert!(err.is_auth_error());
        assert!(err
            .to_string()
            .contains("No valid authentication token found. Please log in again."));
    }

    #[tokio::test]
    async fn test_sign_in_stores_tokens() {
        let provider = Arc::new(CountingProvider::default());
        let (gate, _) = gate(provider.clone());

        let outcome = gate.sign_in("admin@example.org", "secret").await.unwrap();
        assert!(matches!(outcome, SignInOutcome::Authenticated(_)));
        assert_eq!(gate.id_token().await.unwrap(), "id-1");
        assert_eq!(provider.calls(), 1);
        assert!(!gate.uses_local_role().unwrap());
    }

    #[tokio::test]
    async fn test_new_password_flow() {
        let provider = Arc::new(CountingProvider {
            require_new_password: true,
            ..Default::default()
        });
        let (gate, _) = gate(provider);

        let outcome = gate.sign_in("admin@example.org", "temp").await.unwrap();
        let SignInOutcome::NewPasswordRequired(challenge) = outcome else {
            panic!("expected challenge");
        };
        assert!(!gate.is_authenticated().unwrap());

        gate.complete_new_password(&challenge, "N3w-password!")
            .await
            .unwrap();
        assert_eq!(gate.id_token().await.unwrap(), "id-2");
    }

    #[tokio::test]
    async fn test_expired_token_refreshes() {
        let provider = Arc::new(CountingProvider::default());
        let store = Arc::new(MemorySessionStore::with_session(StoredSession {
            tokens: Some(AuthTokens::new("old", "old", Some("refresh".to_string()), -10)),
            ..Default::default()
        }));
        let gate = AuthGate::new(provider.clone(), store.clone());

        assert_eq!(gate.id_token().await.unwrap(), "id-refreshed");
        let saved = store.load().unwrap().tokens.unwrap();
        assert_eq!(saved.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(provider.calls(), 1);

        // The kept refresh token still works at the next expiry.
        store
            .save(&StoredSession {
                tokens: Some(AuthTokens::new("id-refreshed", "a", saved.refresh_token, -10)),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(gate.id_token().await.unwrap(), "id-refreshed");
        assert_eq!(provider.calls(), 2);
    }

    #[tokio::test]
    async fn test_logout_clears_everything_despite_remote_failure() {
        let (gate, store) = gate(Arc::new(CountingProvider::default()));
        gate.sign_in("admin@example.org", "secret").await.unwrap();
        gate.set_stored_role(UserRole::Instructor).unwrap();

        gate.logout().await.unwrap();
        assert_eq!(store.load().unwrap(), StoredSession::default());
        assert_eq!(gate.status().unwrap(), AuthStatus::SignedOut);
    }

    #[tokio::test]
    async fn test_sign_in_validation() {
        let provider = Arc::new(CountingProvider::default());
        let (gate, _) = gate(provider.clone());
        assert!(gate.sign_in("  ", "pw").await.is_err());
        assert_eq!(provider.calls(), 0);
    }

    #[test]
    fn test_guest_keeps_local_role() {
        let (gate, _) = gate(Arc::new(CountingProvider::default()));
        gate.set_stored_role(UserRole::Staff).unwrap();
        gate.enter_guest_mode().unwrap();
        assert!(gate.uses_local_role().unwrap());
        assert_eq!(gate.stored_role().unwrap(), Some(UserRole::Staff));
    }
}
