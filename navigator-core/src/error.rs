//! Error types for the Learning Navigator core library.
//!
//! Every fallible operation in the library returns [`NavigatorResult`]. Errors
//! carry a stable code so the CLI and logs can reference them.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Transport | WebSocket and HTTP connection, timeout and close errors |
//! | E2001-E2099 | Config | Config file, value and endpoint errors |
//! | E3001-E3099 | Auth | Missing tokens, sign-in and challenge failures |
//! | E4001-E4099 | Protocol | Malformed or unexpected chat frames |
//! | E5001-E5099 | API | Admin REST API status and parse errors |
//! | E9001-E9099 | General | Internal, IO, serialization, and validation errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// Message shown when no identity token can be produced.
pub const NO_TOKEN_MESSAGE: &str = "No valid authentication token found. Please log in again.";

/// The main error type for the Learning Navigator core library.
#[derive(Debug, Error)]
pub enum NavigatorError {
    // ========================================================================
    // Transport Errors (E1001-E1099)
    // ========================================================================
    /// Could not open the chat WebSocket
    #[error("[E1001] WebSocket connection failed: {0}")]
    WebSocketConnectFailed(String),

    /// The WebSocket reported an error mid-exchange
    #[error("[E1002] WebSocket error: {0}")]
    WebSocket(String),

    /// The socket closed before a terminal frame arrived
    #[error("[E1003] Connection closed before the response completed: {0}")]
    ConnectionClosed(String),

    /// No frame or response within the configured timeout
    #[error("[E1004] Request timed out after {0} seconds")]
    Timeout(u64),

    /// Remote service unreachable
    #[error("[E1005] Service unavailable: {0}")]
    ServiceUnavailable(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2003] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2004] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// An endpoint needed by the operation is not configured
    #[error("[E2005] Endpoint not configured: {0}")]
    MissingEndpoint(String),

    // ========================================================================
    // Authentication Errors (E3001-E3099)
    // ========================================================================
    /// No usable identity token
    #[error("[E3001] {0}")]
    NotAuthenticated(String),

    /// The identity provider rejected the credentials
    #[error("[E3002] Sign-in failed: {0}")]
    SignInFailed(String),

    /// Responding to an identity-provider challenge failed
    #[error("[E3003] Challenge '{challenge}' failed: {message}")]
    ChallengeFailed { challenge: String, message: String },

    /// The identity provider asked for a challenge this client cannot answer
    #[error("[E3004] Unsupported sign-in challenge: {0}")]
    UnsupportedChallenge(String),

    // ========================================================================
    // Protocol Errors (E4001-E4099)
    // ========================================================================
    /// A chat frame was not valid JSON
    #[error("[E4001] Malformed chat frame: {0}")]
    MalformedFrame(String),

    /// The chat service reported an error frame
    #[error("[E4003] Chat service error: {0}")]
    ServerError(String),

    // ========================================================================
    // API Errors (E5001-E5099)
    // ========================================================================
    /// API request failed
    #[error("[E5001] API request failed: {0}")]
    ApiRequestFailed(String),

    /// API response parse error
    #[error("[E5002] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// API rate limit exceeded
    #[error("[E5003] API rate limit exceeded for {service}, retry after {retry_after_secs} seconds")]
    ApiRateLimitExceeded {
        service: String,
        retry_after_secs: u64,
    },

    /// API authentication failed
    #[error("[E5004] API authentication failed for {service}: {message}")]
    ApiAuthenticationFailed { service: String, message: String },

    /// API returned a non-success status
    #[error("[E5005] API returned {status}: {message}")]
    ApiStatus { status: u16, message: String },

    /// Requested resource does not exist
    #[error("[E5006] Not found: {0}")]
    NotFound(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// Validation error
    #[error("[E9004] Validation error: {0}")]
    ValidationError(String),

    /// IO error
    #[error("[E9005] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9006] Serialization error: {0}")]
    SerializationError(String),
}

/// Result type alias for Learning Navigator operations.
pub type NavigatorResult<T> = Result<T, NavigatorError>;

impl NavigatorError {
    pub fn not_authenticated() -> Self {
        NavigatorError::NotAuthenticated(NO_TOKEN_MESSAGE.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        NavigatorError::ValidationError(message.into())
    }
}

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

fn service_of(err: &reqwest::Error) -> String {
    err.url()
        .map(|u| u.host_str().unwrap_or("unknown").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

impl From<reqwest::Error> for NavigatorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NavigatorError::Timeout(30)
        } else if err.is_connect() {
            NavigatorError::ServiceUnavailable(err.to_string())
        } else if err.is_status() {
            if let Some(status) = err.status() {
                match status.as_u16() {
                    429 => {
                        return NavigatorError::ApiRateLimitExceeded {
                            service: service_of(&err),
                            retry_after_secs: 60,
                        }
                    }
                    401 | 403 => {
                        return NavigatorError::ApiAuthenticationFailed {
                            service: service_of(&err),
                            message: status.to_string(),
                        }
                    }
                    404 => return NavigatorError::NotFound(err.to_string()),
                    _ => {}
                }
            }
            NavigatorError::ApiRequestFailed(err.to_string())
        } else if err.is_decode() {
            NavigatorError::ApiParseError(err.to_string())
        } else {
            NavigatorError::ApiRequestFailed(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for NavigatorError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;

        match err {
            WsError::ConnectionClosed | WsError::AlreadyClosed => {
                NavigatorError::ConnectionClosed(err.to_string())
            }
            WsError::Url(e) => NavigatorError::WebSocketConnectFailed(e.to_string()),
            WsError::Http(ref response) => NavigatorError::WebSocketConnectFailed(format!(
                "handshake rejected with {}",
                response.status()
            )),
            WsError::Io(e) => NavigatorError::WebSocket(e.to_string()),
            other => NavigatorError::WebSocket(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for NavigatorError {
    fn from(err: serde_json::Error) -> Self {
        NavigatorError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for NavigatorError {
    fn from(err: std::io::Error) -> Self {
        NavigatorError::IoError(err.to_string())
    }
}

impl From<base64::DecodeError> for NavigatorError {
    fn from(err: base64::DecodeError) -> Self {
        NavigatorError::ApiParseError(format!("invalid base64 content: {}", err))
    }
}

impl From<config::ConfigError> for NavigatorError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => NavigatorError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => NavigatorError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => NavigatorError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => NavigatorError::ConfigParseError(err.to_string()),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl NavigatorError {
    /// Returns true for socket and connection level failures.
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            NavigatorError::WebSocketConnectFailed(_)
                | NavigatorError::WebSocket(_)
                | NavigatorError::ConnectionClosed(_)
                | NavigatorError::Timeout(_)
                | NavigatorError::ServiceUnavailable(_)
        )
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            NavigatorError::ConfigParseError(_)
                | NavigatorError::InvalidConfigValue { .. }
                | NavigatorError::MissingEndpoint(_)
        )
    }

    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            NavigatorError::NotAuthenticated(_)
                | NavigatorError::SignInFailed(_)
                | NavigatorError::ChallengeFailed { .. }
                | NavigatorError::UnsupportedChallenge(_)
                | NavigatorError::ApiAuthenticationFailed { .. }
        )
    }

    /// Returns true for malformed or error frames on the chat socket.
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            NavigatorError::MalformedFrame(_) | NavigatorError::ServerError(_)
        )
    }

    /// Returns true if this error is transient and a manual resend might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            NavigatorError::ApiRateLimitExceeded { .. }
                | NavigatorError::ServiceUnavailable(_)
                | NavigatorError::Timeout(_)
                | NavigatorError::ConnectionClosed(_)
                | NavigatorError::WebSocket(_)
        )
    }

    /// Returns a suggested wait in seconds before trying again by hand.
    pub fn suggested_retry_delay(&self) -> Option<u64> {
        match self {
            NavigatorError::ApiRateLimitExceeded {
                retry_after_secs, ..
            } => Some(*retry_after_secs),
            NavigatorError::ServiceUnavailable(_) => Some(5),
            NavigatorError::Timeout(_) => Some(10),
            NavigatorError::ConnectionClosed(_) | NavigatorError::WebSocket(_) => Some(2),
            _ => None,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            NavigatorError::WebSocketConnectFailed(_) => "E1001",
            NavigatorError::WebSocket(_) => "E1002",
            NavigatorError::ConnectionClosed(_) => "E1003",
            NavigatorError::Timeout(_) => "E1004",
            NavigatorError::ServiceUnavailable(_) => "E1005",
            NavigatorError::ConfigParseError(_) => "E2003",
            NavigatorError::InvalidConfigValue { .. } => "E2004",
            NavigatorError::MissingEndpoint(_) => "E2005",
            NavigatorError::NotAuthenticated(_) => "E3001",
            NavigatorError::SignInFailed(_) => "E3002",
            NavigatorError::ChallengeFailed { .. } => "E3003",
            NavigatorError::UnsupportedChallenge(_) => "E3004",
            NavigatorError::MalformedFrame(_) => "E4001",
            NavigatorError::ServerError(_) => "E4003",
            NavigatorError::ApiRequestFailed(_) => "E5001",
            NavigatorError::ApiParseError(_) => "E5002",
            NavigatorError::ApiRateLimitExceeded { .. } => "E5003",
            NavigatorError::ApiAuthenticationFailed { .. } => "E5004",
            NavigatorError::ApiStatus { .. } => "E5005",
            NavigatorError::NotFound(_) => "E5006",
            NavigatorError::Internal(_) => "E9001",
            NavigatorError::ValidationError(_) => "E9004",
            NavigatorError::IoError(_) => "E9005",
            NavigatorError::SerializationError(_) => "E9006",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            NavigatorError::NotAuthenticated(_) | NavigatorError::ApiAuthenticationFailed { .. } => {
                Some("Run 'navigator login' or 'navigator guest' and try again")
            }
            NavigatorError::SignInFailed(_) => Some("Check the username and password"),
            NavigatorError::MissingEndpoint(_) => {
                Some("Set the endpoint in navigator.toml or a NAVIGATOR_* environment variable")
            }
            NavigatorError::WebSocketConnectFailed(_) => {
                Some("Check api.websocket_url and your network connection")
            }
            NavigatorError::ApiRateLimitExceeded { .. } => {
                Some("Wait for the rate limit to reset before resending")
            }
            NavigatorError::ConnectionClosed(_) | NavigatorError::WebSocket(_) => {
                Some("Resend the question")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with suggestions.
pub struct CliErrorDisplay<'a> {
    error: &'a NavigatorError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a NavigatorError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            if let Some(delay) = self.error.suggested_retry_delay() {
                writeln!(f)?;
                writeln!(
                    f,
                    "  This error may be temporary. Try again in {} seconds.",
                    delay
                )?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = NavigatorError::MissingEndpoint("api.websocket_url".to_string());
        assert!(err.to_string().contains("E2005"));
        assert!(err.to_string().contains("api.websocket_url"));

        let err = NavigatorError::ChallengeFailed {
            challenge: "NEW_PASSWORD_REQUIRED".to_string(),
            message: "Password does not conform to policy".to_string(),
        };
        assert!(err.to_string().contains("E3003"));
        assert!(err.to_string().contains("NEW_PASSWORD_REQUIRED"));
    }

    #[test]
    fn test_not_authenticated_message() {
        let err = NavigatorError::not_authenticated();
        assert!(err.to_string().ends_with(NO_TOKEN_MESSAGE));
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_error_categorization() {
        assert!(NavigatorError::WebSocket("reset".to_string()).is_transport_error());
        assert!(NavigatorError::MissingEndpoint("api.websocket_url".to_string()).is_config_error());
        assert!(NavigatorError::MalformedFrame("x".to_string()).is_protocol_error());
        assert!(!NavigatorError::Internal("x".to_string()).is_transport_error());
    }

    #[test]
    fn test_is_transient() {
        assert!(NavigatorError::Timeout(30).is_transient());
        assert!(NavigatorError::ConnectionClosed("eof".to_string()).is_transient());
        assert!(!NavigatorError::validation("empty").is_transient());
        assert!(!NavigatorError::MalformedFrame("x".to_string()).is_transient());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(NavigatorError::WebSocketConnectFailed("x".into()).error_code(), "E1001");
        assert_eq!(NavigatorError::MissingEndpoint("x".into()).error_code(), "E2005");
        assert_eq!(NavigatorError::not_authenticated().error_code(), "E3001");
        assert_eq!(NavigatorError::MalformedFrame("x".into()).error_code(), "E4001");
        assert_eq!(
            NavigatorError::ApiStatus {
                status: 500,
                message: "boom".into()
            }
            .error_code(),
            "E5005"
        );
        assert_eq!(NavigatorError::validation("x").error_code(), "E9004");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_result: Result<serde_json::Value, _> = serde_json::from_str("not json");
        let err: NavigatorError = json_result.unwrap_err().into();
        assert!(matches!(err, NavigatorError::SerializationError(_)));
    }

    #[test]
    fn test_from_ws_closed() {
        let err: NavigatorError = tokio_tungstenite::tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, NavigatorError::ConnectionClosed(_)));
    }

    #[test]
    fn test_cli_error_display() {
        let err = NavigatorError::not_authenticated();
        let output = CliErrorDisplay::new(&err).to_string();
        assert!(output.contains("navigator login"));

        let output = CliErrorDisplay::new(&err).without_suggestion().to_string();
        assert!(!output.contains("Suggestion"));
    }
}
