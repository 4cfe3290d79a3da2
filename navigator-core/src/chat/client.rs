use futures::{SinkExt, StreamExt};
use reqwest::Url;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::protocol::{InboundFrame, OutboundEnvelope};
use super::transcript::{FailureKind, FrameOutcome, SharedTranscript};
use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{ChatSession, Message};

/// Hooks the chat view uses to re-render while a reply streams in.
pub trait ChatObserver: Send + Sync {
    /// The reply grew. Render it and keep the view scrolled to the bottom.
    fn on_update(&self, _reply: &Message) {}

    fn on_complete(&self, _reply: &Message) {}

    fn on_error(&self, _error: &NavigatorError) {}
}

pub struct NoopObserver;

impl ChatObserver for NoopObserver {}

/// Final state of one question.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub exchange_id: Uuid,
    pub message: Message,
    pub failure: Option<FailureKind>,
}

impl ChatReply {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Opens one socket per question and streams the answer into a transcript.
#[derive(Debug, Clone)]
pub struct ChatClient {
    websocket_url: String,
    response_timeout: Duration,
}

impl ChatClient {
    pub fn new(websocket_url: impl Into<String>, response_timeout: Duration) -> Self {
        Self {
            websocket_url: websocket_url.into(),
            response_timeout,
        }
    }

    pub fn from_config(config: &NavigatorConfig) -> NavigatorResult<Self> {
        Ok(Self::new(config.websocket_url()?, config.response_timeout()))
    }

    pub fn socket_url(&self, token: &str) -> NavigatorResult<Url> {
        let mut url = Url::parse(&self.websocket_url).map_err(|e| {
            NavigatorError::InvalidConfigValue {
                key: "api.websocket_url".to_string(),
                message: e.to_string(),
            }
        })?;
        url.query_pairs_mut().append_pair("token", token);
        Ok(url)
    }

    /// Asks one question.
    ///
    /// Only validation and configuration problems are returned as errors.
    /// Transport and parse failures end the exchange with the fixed inline
    /// text and are reported through `ChatReply::failure`.
    pub async fn ask(
        &self,
        token: &str,
        session: &ChatSession,
        transcript: &SharedTranscript,
        question: &str,
        observer: &dyn ChatObserver,
    ) -> NavigatorResult<ChatReply> {
        let exchange_id = transcript.lock().await.begin_exchange(question)?;
        let url = match self.socket_url(token) {
            Ok(url) => url,
            Err(e) => {
                transcript
                    .lock()
                    .await
                    .fail_exchange(exchange_id, FailureKind::Socket);
                return Err(e);
            }
        };

        info!(%exchange_id, session_id = %session.id, role = %session.role, "Sending question");

        let failure = match self
            .run_exchange(url, exchange_id, session, transcript, question, observer)
            .await
        {
            Ok(failure) => failure,
            Err(e) => {
                warn!(%exchange_id, "Chat socket failed: {}", e);
                observer.on_error(&e);
                let kind = if e.is_protocol_error() {
                    FailureKind::Parse
                } else {
                    FailureKind::Socket
                };
                transcript.lock().await.fail_exchange(exchange_id, kind);
                Some(kind)
            }
        };

        let message = transcript
            .lock()
            .await
            .reply(exchange_id)
            .cloned()
            .ok_or_else(|| NavigatorError::Internal("reply placeholder vanished".to_string()))?;

        observer.on_complete(&message);
        info!(%exchange_id, status = %message.status, failed = failure.is_some(), "Exchange finished");

        Ok(ChatReply {
            exchange_id,
            message,
            failure,
        })
    }

    async fn run_exchange(
        &self,
        url: Url,
        exchange_id: Uuid,
        session: &ChatSession,
        transcript: &SharedTranscript,
        question: &str,
        observer: &dyn ChatObserver,
    ) -> NavigatorResult<Option<FailureKind>> {
        let (ws_stream, _) = tokio_tungstenite::connect_async(url.as_str())
            .await
            .map_err(|e| NavigatorError::WebSocketConnectFailed(e.to_string()))?;
        let (mut write, mut read) = ws_stream.split();

        let envelope = OutboundEnvelope::send_message(question, session.id, session.role, exchange_id);
        write.send(WsMessage::Text(envelope.to_json()?.into())).await?;

        let result = loop {
            let next = match tokio::time::timeout(self.response_timeout, read.next()).await {
                Ok(next) => next,
                Err(_) => break Err(NavigatorError::Timeout(self.response_timeout.as_secs())),
            };

            let payload = match next {
                None => {
                    break Err(NavigatorError::ConnectionClosed(
                        "stream ended".to_string(),
                    ))
                }
                Some(Err(e)) => break Err(e.into()),
                Some(Ok(WsMessage::Text(text))) => text.as_str().to_owned(),
                Some(Ok(WsMessage::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
                Some(Ok(WsMessage::Close(frame))) => {
                    let reason = frame
                        .map(|f| f.reason.as_str().to_string())
                        .unwrap_or_else(|| "no close frame".to_string());
                    break Err(NavigatorError::ConnectionClosed(reason));
                }
                Some(Ok(_)) => continue,
            };

            let frame = match InboundFrame::parse(&payload) {
                Ok(frame) => frame,
                Err(e) => {
                    debug!(%exchange_id, "Unparseable frame: {}", e);
                    break Ok(self.fail(transcript, exchange_id, FailureKind::Parse, &e, observer).await);
                }
            };

            debug!(%exchange_id, kind = frame.kind(), "Frame received");

            let (outcome, reply) = {
                let mut guard = transcript.lock().await;
                let outcome = guard.apply_frame(exchange_id, &frame);
                (outcome, guard.reply(exchange_id).cloned())
            };

            match outcome {
                FrameOutcome::Ignored => {}
                FrameOutcome::Updated => {
                    if let Some(reply) = reply {
                        observer.on_update(&reply);
                    }
                }
                FrameOutcome::Completed => break Ok(None),
                FrameOutcome::Failed => {
                    if let InboundFrame::Error { message, .. } = &frame {
                        observer.on_error(&NavigatorError::ServerError(message.clone()));
                    }
                    break Ok(Some(FailureKind::Socket));
                }
            }
        };

        if let Err(e) = write.close().await {
            debug!(%exchange_id, "Closing chat socket: {}", e);
        }

        result
    }

    async fn fail(
        &self,
        transcript: &SharedTranscript,
        exchange_id: Uuid,
        kind: FailureKind,
        error: &NavigatorError,
        observer: &dyn ChatObserver,
    ) -> Option<FailureKind> {
        observer.on_error(error);
        if transcript.lock().await.fail_exchange(exchange_id, kind) {
            Some(kind)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_url_encodes_token() {
        let client = ChatClient::new("wss://chat.example.org/prod", Duration::from_secs(5));
        let url = client.socket_url("a+b/c=").unwrap();
        assert_eq!(url.as_str(), "wss://chat.example.org/prod?token=a%2Bb%2Fc%3D");
    }

    #[test]
    fn test_socket_url_guest_token() {
        let client = ChatClient::new("wss://chat.example.org/prod", Duration::from_secs(5));
        let url = client.socket_url("guest-demo-token").unwrap();
        assert_eq!(url.query(), Some("token=guest-demo-token"));
    }

    #[test]
    fn test_socket_url_invalid() {
        let client = ChatClient::new("not a url", Duration::from_secs(5));
        assert!(matches!(
            client.socket_url("t"),
            Err(NavigatorError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_from_config_requires_endpoint() {
        let config = NavigatorConfig::default();
        assert!(matches!(
            ChatClient::from_config(&config),
            Err(NavigatorError::MissingEndpoint(_))
        ));
    }
}
