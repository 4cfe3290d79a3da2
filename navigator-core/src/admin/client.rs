use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::AuthGate;
use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};

const SERVICE: &str = "admin-api";

/// REST client for the admin resources. Every request carries the gate's
/// current bearer token; nothing is cached.
pub struct AdminClient {
    http: Client,
    base_url: Url,
    gate: Arc<AuthGate>,
}

impl AdminClient {
    pub fn new(base_url: &str, gate: Arc<AuthGate>, timeout: Duration) -> NavigatorResult<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let base_url = Url::parse(&normalized).map_err(|e| NavigatorError::InvalidConfigValue {
            key: "api.admin_base_url".to_string(),
            message: e.to_string(),
        })?;
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            base_url,
            gate,
        })
    }

    pub fn from_config(config: &NavigatorConfig, gate: Arc<AuthGate>) -> NavigatorResult<Self> {
        Self::new(&config.admin_base_url()?, gate, config.request_timeout())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base/<resource>` or, with a key, `base/<resource>/<percent-encoded key>`.
    pub(crate) fn url(&self, resource: &str, key: Option<&str>) -> NavigatorResult<Url> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| NavigatorError::Internal(e.to_string()))?;
        if let Some(key) = key {
            url.path_segments_mut()
                .map_err(|_| NavigatorError::Internal("base URL cannot carry a path".to_string()))?
                .pop_if_empty()
                .push(key);
        }
        Ok(url)
    }

    pub(crate) async fn request(&self, method: Method, url: Url) -> NavigatorResult<RequestBuilder> {
        let token = self.gate.id_token().await?;
        debug!(%method, %url, "Admin request");
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> NavigatorResult<T> {
        let response = self
            .request(Method::GET, url)
            .await?
            .query(query)
            .send()
            .await?;
        parse_json(check_status(response).await?).await
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> NavigatorResult<T>
    where
        B: serde::Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.request(method, url).await?.json(body).send().await?;
        parse_json(check_status(response).await?).await
    }

    pub(crate) async fn send_empty(&self, method: Method, url: Url) -> NavigatorResult<Response> {
        let response = self.request(method, url).await?.send().await?;
        check_status(response).await
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-2xx response to a typed error, preferring the body's `error` field.
pub(crate) async fn check_status(response: Response) -> NavigatorResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    let url = response.url().clone();
    let text = response.text().await.unwrap_or_default();
    let message = error_message(status, &text);

    warn!(%url, status = status.as_u16(), "Admin API error: {}", message);

    Err(match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => NavigatorError::ApiAuthenticationFailed {
            service: SERVICE.to_string(),
            message,
        },
        StatusCode::NOT_FOUND => NavigatorError::NotFound(message),
        StatusCode::TOO_MANY_REQUESTS => NavigatorError::ApiRateLimitExceeded {
            service: SERVICE.to_string(),
            retry_after_secs: retry_after.unwrap_or(60),
        },
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY | StatusCode::GATEWAY_TIMEOUT => {
            NavigatorError::ServiceUnavailable(message)
        }
        _ => NavigatorError::ApiStatus {
            status: status.as_u16(),
            message,
        },
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error
        .or(parsed.message)
        .filter(|m| !m.trim().is_empty())
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty() && trimmed.len() <= 200).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        })
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> NavigatorResult<T> {
    let text = response.text().await?;
    let body = if text.trim().is_empty() { "null" } else { &text };
    serde_json::from_str(body).map_err(|e| NavigatorError::ApiParseError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthGate, CognitoProvider, MemorySessionStore};

    fn client(base: &str) -> AdminClient {
        let provider =
            CognitoProvider::new("http://127.0.0.1:9/", "client", Duration::from_secs(1)).unwrap();
        let gate = AuthGate::new(Arc::new(provider), Arc::new(MemorySessionStore::new()));
        AdminClient::new(base, Arc::new(gate), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_url_building() {
        let admin = client("https://api.example.org/prod");
        assert_eq!(
            admin.url("files", None).unwrap().as_str(),
            "https://api.example.org/prod/files"
        );
        assert_eq!(
            admin.url("files", Some("guides/My File.pdf")).unwrap().as_str(),
            "https://api.example.org/prod/files/guides%2FMy%20File.pdf"
        );
    }

    #[test]
    fn test_error_message_prefers_error_field() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"error":"Missing query_id"}"#),
            "Missing query_id"
        );
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"Forbidden"}"#),
            "Forbidden"
        );
        assert_eq!(error_message(StatusCode::BAD_GATEWAY, ""), "Bad Gateway");
    }
}
