use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::AdminClient;
use crate::error::NavigatorResult;
use crate::models::{EscalatedQuery, EscalatedQueryList, QueryStatus, StatusUpdate};

impl AdminClient {
    pub async fn list_escalations(
        &self,
        status: Option<QueryStatus>,
        limit: Option<u32>,
    ) -> NavigatorResult<EscalatedQueryList> {
        let mut query = Vec::new();
        if let Some(status) = status {
            query.push(("status", status.as_str().to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        self.get_json(self.url("escalated-queries", None)?, &query)
            .await
    }

    pub async fn get_escalation(&self, query_id: &str) -> NavigatorResult<EscalatedQuery> {
        self.get_json(self.url("escalated-queries", Some(query_id))?, &[])
            .await
    }

    /// Sets a new status, keeping the existing notes unless new ones are given.
    pub async fn update_escalation(
        &self,
        query: &EscalatedQuery,
        status: QueryStatus,
        admin_notes: Option<String>,
    ) -> NavigatorResult<()> {
        let update = StatusUpdate::for_query(query, status, admin_notes);
        let _: Value = self
            .send_json(Method::PUT, self.url("escalated-queries", None)?, &update)
            .await?;
        info!(query_id = %query.query_id, status = %status, "Escalation updated");
        Ok(())
    }
}
