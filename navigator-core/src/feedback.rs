use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::NavigatorConfig;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::Feedback;

/// Posts thumbs up/down votes. Failures never reach the caller.
#[derive(Debug, Clone)]
pub struct FeedbackClient {
    http: Client,
    url: String,
}

impl FeedbackClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> NavigatorResult<Self> {
        Ok(Self {
            http: Client::builder().timeout(timeout).build()?,
            url: url.into(),
        })
    }

    pub fn from_config(config: &NavigatorConfig) -> NavigatorResult<Self> {
        Self::new(config.feedback_url()?, config.request_timeout())
    }

    /// Returns whether the vote was accepted; errors are logged and swallowed.
    pub async fn submit(&self, feedback: &Feedback) -> bool {
        match self.try_submit(feedback).await {
            Ok(()) => {
                debug!(message_id = %feedback.message_id, "Feedback submitted");
                true
            }
            Err(e) => {
                warn!(message_id = %feedback.message_id, "Error submitting feedback: {}", e);
                false
            }
        }
    }

    /// Like [`submit`](Self::submit) but surfaces the error.
    pub async fn try_submit(&self, feedback: &Feedback) -> NavigatorResult<()> {
        let response = self.http.post(&self.url).json(feedback).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(NavigatorError::ApiStatus {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            })
        }
    }
}
