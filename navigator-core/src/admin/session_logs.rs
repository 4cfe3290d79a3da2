use chrono::{Duration, NaiveDate};
use futures::future::join_all;
use tracing::warn;

use super::AdminClient;
use crate::error::NavigatorResult;
use crate::models::{ConversationLog, SessionLogReport, Timeframe, UsageTrendPoint};

pub const TREND_DAYS: i64 = 7;

impl AdminClient {
    pub async fn session_logs(&self, timeframe: Timeframe) -> NavigatorResult<SessionLogReport> {
        self.get_json(self.url("session-logs", None)?, &timeframe.query_pairs())
            .await
    }

    /// Conversations of one chat session.
    pub async fn session_log(&self, session_id: &str) -> NavigatorResult<Vec<ConversationLog>> {
        let report: SessionLogReport = self
            .get_json(self.url("session-logs", Some(session_id))?, &[])
            .await?;
        Ok(report
            .conversations_for_session(session_id)
            .into_iter()
            .cloned()
            .collect())
    }

    /// One single-day query per day ending at `today`, oldest first. A day
    /// whose request fails is reported as zero.
    pub async fn usage_trend(&self, today: NaiveDate) -> Vec<UsageTrendPoint> {
        let days: Vec<NaiveDate> = (0..TREND_DAYS)
            .rev()
            .map(|offset| today - Duration::days(offset))
            .collect();

        let requests = days
            .iter()
            .map(|day| self.session_logs(Timeframe::single_day(*day)));
        let results = join_all(requests).await;

        days.into_iter()
            .zip(results)
            .map(|(date, result)| match result {
                Ok(report) => UsageTrendPoint {
                    date,
                    queries: report.user_count,
                    loaded: true,
                },
                Err(e) => {
                    warn!(%date, "Usage trend day failed: {}", e);
                    UsageTrendPoint {
                        date,
                        queries: 0,
                        loaded: false,
                    }
                }
            })
            .collect()
    }
}
