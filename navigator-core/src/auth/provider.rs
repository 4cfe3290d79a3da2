use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::tokens::{AuthTokens, NewPasswordChallenge, SignInOutcome};
use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};

pub const NEW_PASSWORD_REQUIRED: &str = "NEW_PASSWORD_REQUIRED";

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, username: &str, password: &str) -> NavigatorResult<SignInOutcome>;

    async fn complete_new_password(
        &self,
        challenge: &NewPasswordChallenge,
        new_password: &str,
    ) -> NavigatorResult<AuthTokens>;

    async fn refresh(&self, refresh_token: &str) -> NavigatorResult<AuthTokens>;

    async fn sign_out(&self, access_token: &str) -> NavigatorResult<()>;
}

/// Cognito user-pool client over the service's JSON API.
pub struct CognitoProvider {
    client: Client,
    endpoint: String,
    client_id: String,
}

impl CognitoProvider {
    pub fn new(
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        timeout: Duration,
    ) -> NavigatorResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            client_id: client_id.into(),
        })
    }

    pub fn from_config(config: &NavigatorConfig) -> NavigatorResult<Self> {
        if config.auth.user_pool_client_id.trim().is_empty() {
            return Err(NavigatorError::MissingEndpoint(
                "auth.user_pool_client_id".to_string(),
            ));
        }
        Self::new(
            config.identity_endpoint(),
            config.auth.user_pool_client_id.clone(),
            config.request_timeout(),
        )
    }

    async fn call<T: DeserializeOwned>(&self, action: &str, body: Value) -> NavigatorResult<T> {
        debug!(action, "Calling identity provider");

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", AMZ_JSON)
            .header("X-Amz-Target", format!("{}.{}", TARGET_PREFIX, action))
            .body(body.to_string())
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let error: CognitoError = serde_json::from_str(&text).unwrap_or_default();
            let kind = error
                .kind
                .rsplit('#')
                .next()
                .unwrap_or_default()
                .to_string();
            let message = error
                .message
                .unwrap_or_else(|| format!("identity provider returned {}", status));
            warn!(action, kind = %kind, "Identity provider rejected request");

            return Err(match kind.as_str() {
                "TooManyRequestsException" => NavigatorError::ApiRateLimitExceeded {
                    service: "identity".to_string(),
                    retry_after_secs: 30,
                },
                "" if status.is_server_error() => NavigatorError::ServiceUnavailable(message),
                _ => NavigatorError::SignInFailed(message),
            });
        }

        serde_json::from_str(&text).map_err(|e| NavigatorError::ApiParseError(e.to_string()))
    }
}

#[async_trait]
impl IdentityProvider for CognitoProvider {
    async fn sign_in(&self, username: &str, password: &str) -> NavigatorResult<SignInOutcome> {
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password,
            },
        });

        let response: AuthResponse = self.call("InitiateAuth", body).await?;

        if let Some(result) = response.authentication_result {
            info!(username, "Signed in");
            return Ok(SignInOutcome::Authenticated(result.into_tokens()));
        }

        match response.challenge_name.as_deref() {
            Some(NEW_PASSWORD_REQUIRED) => {
                let session = response.session.ok_or_else(|| {
                    NavigatorError::ApiParseError("challenge without session".to_string())
                })?;
                info!(username, "New password required");
                Ok(SignInOutcome::NewPasswordRequired(NewPasswordChallenge {
                    username: username.to_string(),
                    session,
                }))
            }
            Some(other) => Err(NavigatorError::UnsupportedChallenge(other.to_string())),
            None => Err(NavigatorError::ApiParseError(
                "response carried neither tokens nor a challenge".to_string(),
            )),
        }
    }

    async fn complete_new_password(
        &self,
        challenge: &NewPasswordChallenge,
        new_password: &str,
    ) -> NavigatorResult<AuthTokens> {
        let body = json!({
            "ChallengeName": NEW_PASSWORD_REQUIRED,
            "ClientId": self.client_id,
            "Session": challenge.session,
            "ChallengeResponses": {
                "USERNAME": challenge.username,
                "NEW_PASSWORD": new_password,
            },
        });

        let response: AuthResponse = self
            .call("RespondToAuthChallenge", body)
            .await
            .map_err(|e| match e {
                NavigatorError::SignInFailed(message) => NavigatorError::ChallengeFailed {
                    challenge: NEW_PASSWORD_REQUIRED.to_string(),
                    message,
                },
                other => other,
            })?;

        response
            .authentication_result
            .map(AuthenticationResult::into_tokens)
            .ok_or_else(|| match response.challenge_name {
                Some(next) => NavigatorError::UnsupportedChallenge(next),
                None => NavigatorError::ApiParseError("missing AuthenticationResult".to_string()),
            })
    }

    async fn refresh(&self, refresh_token: &str) -> NavigatorResult<AuthTokens> {
        let body = json!({
            "AuthFlow": "REFRESH_TOKEN_AUTH",
            "ClientId": self.client_id,
            "AuthParameters": { "REFRESH_TOKEN": refresh_token },
        });

        let response: AuthResponse = self.call("InitiateAuth", body).await.map_err(|e| match e {
            NavigatorError::SignInFailed(message) => NavigatorError::NotAuthenticated(message),
            other => other,
        })?;

        let tokens = response
            .authentication_result
            .map(AuthenticationResult::into_tokens)
            .ok_or_else(NavigatorError::not_authenticated)?;

        debug!("Refreshed identity tokens");
        Ok(tokens.with_fallback_refresh(Some(refresh_token.to_string())))
    }

    async fn sign_out(&self, access_token: &str) -> NavigatorResult<()> {
        let _: Value = self
            .call("GlobalSignOut", json!({ "AccessToken": access_token }))
            .await?;
        Ok(())
    }
}

/// Stands in when no user pool is configured; guest mode still works.
pub struct UnconfiguredProvider;

#[async_trait]
impl IdentityProvider for UnconfiguredProvider {
    async fn sign_in(&self, _username: &str, _password: &str) -> NavigatorResult<SignInOutcome> {
        Err(unconfigured())
    }

    async fn complete_new_password(
        &self,
        _challenge: &NewPasswordChallenge,
        _new_password: &str,
    ) -> NavigatorResult<AuthTokens> {
        Err(unconfigured())
    }

    async fn refresh(&self, _refresh_token: &str) -> NavigatorResult<AuthTokens> {
        Err(unconfigured())
    }

    async fn sign_out(&self, _access_token: &str) -> NavigatorResult<()> {
        Ok(())
    }
}

fn unconfigured() -> NavigatorError {
    NavigatorError::MissingEndpoint("auth.user_pool_client_id".to_string())
}

/// Cognito when a client id is configured, otherwise a provider that only
/// allows guest mode.
pub fn provider_from_config(
    config: &NavigatorConfig,
) -> NavigatorResult<Arc<dyn IdentityProvider>> {
    if config.auth.user_pool_client_id.trim().is_empty() {
        debug!("No user pool configured; sign-in disabled");
        Ok(Arc::new(UnconfiguredProvider))
    } else {
        Ok(Arc::new(CognitoProvider::from_config(config)?))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthResponse {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
    #[serde(default)]
    session: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    id_token: String,
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

impl AuthenticationResult {
    fn into_tokens(self) -> AuthTokens {
        AuthTokens::new(
            self.id_token,
            self.access_token,
            self.refresh_token,
            self.expires_in,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
struct CognitoError {
    #[serde(rename = "__type", default)]
    kind: String,
    #[serde(default)]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authentication_result() {
        let json = r#"{"AuthenticationResult":{"IdToken":"id","AccessToken":"acc","RefreshToken":"ref","ExpiresIn":3600,"TokenType":"Bearer"}}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        let tokens = response.authentication_result.unwrap().into_tokens();
        assert_eq!(tokens.id_token, "id");
        assert_eq!(tokens.refresh_token.as_deref(), Some("ref"));
    }

    #[test]
    fn test_parse_challenge() {
        let json = r#"{"ChallengeName":"NEW_PASSWORD_REQUIRED","Session":"abc","ChallengeParameters":{}}"#;
        let response: AuthResponse = serde_json::from_str(json).unwrap();
        assert!(response.authentication_result.is_none());
        assert_eq!(response.challenge_name.as_deref(), Some(NEW_PASSWORD_REQUIRED));
        assert_eq!(response.session.as_deref(), Some("abc"));
    }

    #[test]
    fn test_from_config_requires_client_id() {
        let config = NavigatorConfig::default();
        assert!(CognitoProvider::from_config(&config).is_err());
        assert!(provider_from_config(&config).is_ok());
    }

    #[tokio::test]
    async fn test_unconfigured_provider_rejects_sign_in() {
        let err = UnconfiguredProvider.sign_in("a", "b").await.unwrap_err();
        assert!(err.is_config_error());
        assert!(UnconfiguredProvider.sign_out("token").await.is_ok());
    }
}
