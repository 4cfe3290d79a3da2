use anyhow::{Context, Result};
use navigator_core::{
    provider_from_config, AdminClient, AuthGate, ChatClient, FeedbackClient, FileSessionStore,
    MemorySessionStore, NavigatorConfig, SessionStore, UserRole,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a command needs: loaded configuration and the auth gate.
pub struct CliContext {
    pub config: NavigatorConfig,
    pub gate: Arc<AuthGate>,
}

impl CliContext {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => NavigatorConfig::load_from_paths(vec![path])?,
            None => NavigatorConfig::load()?,
        };
        Self::from_config(config)
    }

    pub fn from_config(config: NavigatorConfig) -> Result<Self> {
        let store: Arc<dyn SessionStore> = match config.session_file() {
            Some(path) => {
                debug!(path = %path.display(), "Using session file");
                Arc::new(FileSessionStore::new(path))
            }
            None => {
                warn!("No config directory available; session will not persist");
                Arc::new(MemorySessionStore::new())
            }
        };
        let provider = provider_from_config(&config)?;

        Ok(Self {
            gate: Arc::new(AuthGate::new(provider, store)),
            config,
        })
    }

    pub fn admin(&self) -> Result<AdminClient> {
        AdminClient::from_config(&self.config, self.gate.clone())
            .context("Admin API is not configured (set api.admin_base_url or NAVIGATOR_ADMIN_API_URL)")
    }

    pub fn chat_client(&self) -> Result<ChatClient> {
        ChatClient::from_config(&self.config)
            .context("Chat endpoint is not configured (set api.websocket_url or NAVIGATOR_WEBSOCKET_URL)")
    }

    pub fn feedback_client(&self) -> Result<FeedbackClient> {
        FeedbackClient::from_config(&self.config)
            .context("Feedback endpoint is not configured (set api.feedback_url or NAVIGATOR_FEEDBACK_URL)")
    }

    /// Role for chatting: kept locally for guests, read from the profile otherwise.
    pub async fn current_role(&self) -> Result<UserRole> {
        let fallback = self.config.chat.default_role;

        if self.gate.uses_local_role()? {
            return Ok(self.gate.stored_role()?.unwrap_or(fallback));
        }

        match self.admin()?.get_profile().await {
            Ok(profile) => Ok(profile.role.unwrap_or(fallback)),
            Err(e) => {
                warn!("Could not load profile role: {}", e);
                Ok(self.gate.stored_role()?.unwrap_or(fallback))
            }
        }
    }

    pub async fn save_role(&self, role: UserRole) -> Result<()> {
        if self.gate.uses_local_role()? {
            self.gate.set_stored_role(role)?;
        } else {
            self.admin()?.update_profile(role).await?;
            self.gate.set_stored_role(role)?;
        }
        Ok(())
    }
}
