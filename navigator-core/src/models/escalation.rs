use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NavigatorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryStatus {
    Pending,
    InProgress,
    Resolved,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryStatus::Pending => "pending",
            QueryStatus::InProgress => "in_progress",
            QueryStatus::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for QueryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryStatus {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(QueryStatus::Pending),
            "in_progress" => Ok(QueryStatus::InProgress),
            "resolved" => Ok(QueryStatus::Resolved),
            other => Err(NavigatorError::validation(format!(
                "Invalid status '{}'. Use: pending, in_progress, resolved",
                other
            ))),
        }
    }
}

/// A low-confidence answer handed to a human administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalatedQuery {
    pub query_id: String,
    pub timestamp: String,
    #[serde(default)]
    pub user_email: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub agent_response: String,
    pub status: QueryStatus,
    #[serde(default)]
    pub admin_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationSummary {
    #[serde(default)]
    pub pending: u64,
    #[serde(default)]
    pub in_progress: u64,
    #[serde(default)]
    pub resolved: u64,
}

impl EscalationSummary {
    pub fn total(&self) -> u64 {
        self.pending + self.in_progress + self.resolved
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EscalatedQueryList {
    #[serde(default)]
    pub queries: Vec<EscalatedQuery>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub summary: EscalationSummary,
}

impl EscalatedQueryList {
    /// Queries matching a status tab; `None` is the "all" tab.
    pub fn filter_by_status(&self, status: Option<QueryStatus>) -> Vec<&EscalatedQuery> {
        self.queries
            .iter()
            .filter(|q| status.map_or(true, |s| q.status == s))
            .collect()
    }
}

/// Body of `PUT escalated-queries`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub query_id: String,
    pub timestamp: String,
    pub status: QueryStatus,
    pub admin_notes: String,
}

impl StatusUpdate {
    pub fn for_query(query: &EscalatedQuery, status: QueryStatus, admin_notes: Option<String>) -> Self {
        Self {
            query_id: query.query_id.clone(),
            timestamp: query.timestamp.clone(),
            status,
            admin_notes: admin_notes.unwrap_or_else(|| query.admin_notes.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(id: &str, status: QueryStatus) -> EscalatedQuery {
        EscalatedQuery {
            query_id: id.to_string(),
            timestamp: "2026-01-05T10:00:00Z".to_string(),
            user_email: "learner@example.org".to_string(),
            question: "How do I renew?".to_string(),
            agent_response: "I am not sure.".to_string(),
            status,
            admin_notes: String::new(),
            updated_at: None,
        }
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("in-progress".parse::<QueryStatus>().unwrap(), QueryStatus::InProgress);
        assert_eq!("RESOLVED".parse::<QueryStatus>().unwrap(), QueryStatus::Resolved);
        assert!("closed".parse::<QueryStatus>().is_err());
    }

    #[test]
    fn test_list_deserialize_with_summary() {
        let json = r#"{
            "queries": [{"query_id":"q1","timestamp":"t","status":"pending"}],
            "total": 1,
            "summary": {"pending": 1, "in_progress": 0, "resolved": 0}
        }"#;
        let list: EscalatedQueryList = serde_json::from_str(json).unwrap();
        assert_eq!(list.queries.len(), 1);
        assert_eq!(list.summary.total(), 1);
        assert!(list.queries[0].admin_notes.is_empty());
    }

    #[test]
    fn test_filter_by_status() {
        let list = EscalatedQueryList {
            queries: vec![
                sample("q1", QueryStatus::Pending),
                sample("q2", QueryStatus::Resolved),
                sample("q3", QueryStatus::Pending),
            ],
            total: 3,
            summary: EscalationSummary::default(),
        };
        assert_eq!(list.filter_by_status(None).len(), 3);
        assert_eq!(list.filter_by_status(Some(QueryStatus::Pending)).len(), 2);
        assert!(list.filter_by_status(Some(QueryStatus::InProgress)).is_empty());
    }

    #[test]
    fn test_status_update_keeps_existing_notes() {
        let mut query = sample("q1", QueryStatus::Pending);
        query.admin_notes = "called back".to_string();
        let update = StatusUpdate::for_query(&query, QueryStatus::Resolved, None);
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body["status"], "resolved");
        assert_eq!(body["admin_notes"], "called back");
        assert_eq!(body["timestamp"], "2026-01-05T10:00:00Z");
    }
}
