use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::error::{NavigatorError, NavigatorResult};

/// Question categories the log classifier assigns.
pub const DEFAULT_CATEGORIES: [&str; 12] = [
    "Training & Courses",
    "Instructor Certification",
    "Learner Support",
    "Administrative Procedures",
    "Course Materials",
    "MHFA Connect Platform",
    "Recertification",
    "Mental Health Resources",
    "Scheduling & Registration",
    "Policies & Guidelines",
    "Technical Support",
    "Unknown",
];

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reporting window for `session-logs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    Weekly,
    Monthly,
    Yearly,
    Custom { start: NaiveDate, end: NaiveDate },
}

impl Timeframe {
    pub fn custom(start: NaiveDate, end: NaiveDate) -> NavigatorResult<Self> {
        if start > end {
            return Err(NavigatorError::validation(format!(
                "start_date {} is after end_date {}",
                start, end
            )));
        }
        Ok(Timeframe::Custom { start, end })
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Timeframe::Custom {
            start: day,
            end: day,
        }
    }

    /// Builds a timeframe from CLI-style arguments; `custom` needs both dates.
    pub fn parse_with_range(
        name: &str,
        start: Option<&str>,
        end: Option<&str>,
    ) -> NavigatorResult<Self> {
        match name.trim().to_lowercase().as_str() {
            "custom" => {
                let (Some(start), Some(end)) = (start, end) else {
                    return Err(NavigatorError::validation(
                        "Custom timeframe requires both start_date and end_date",
                    ));
                };
                Timeframe::custom(parse_date(start)?, parse_date(end)?)
            }
            other => other.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::Weekly => "weekly",
            Timeframe::Monthly => "monthly",
            Timeframe::Yearly => "yearly",
            Timeframe::Custom { .. } => "custom",
        }
    }

    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("timeframe", self.as_str().to_string())];
        if let Timeframe::Custom { start, end } = self {
            pairs.push(("start_date", start.format(DATE_FORMAT).to_string()));
            pairs.push(("end_date", end.format(DATE_FORMAT).to_string()));
        }
        pairs
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Timeframe::Custom { start, end } => write!(f, "{} to {}", start, end),
            other => f.write_str(other.as_str()),
        }
    }
}

impl FromStr for Timeframe {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "today" | "daily" => Ok(Timeframe::Today),
            "weekly" | "week" => Ok(Timeframe::Weekly),
            "monthly" | "month" => Ok(Timeframe::Monthly),
            "yearly" | "year" => Ok(Timeframe::Yearly),
            "custom" => Err(NavigatorError::validation(
                "Custom timeframe requires both start_date and end_date",
            )),
            other => Err(NavigatorError::validation(format!(
                "Invalid timeframe \"{}\". Use: today, weekly, monthly, yearly, or custom",
                other
            ))),
        }
    }
}

pub fn parse_date(value: &str) -> NavigatorResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| {
        NavigatorError::validation(format!("Invalid date '{}'. Use YYYY-MM-DD: {}", value, e))
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    /// Missing or unrecognised sentiment counts as neutral.
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_lowercase()).as_deref() {
            Some("positive") => Sentiment::Positive,
            Some("negative") => Sentiment::Negative,
            _ => Sentiment::Neutral,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(NavigatorError::validation(format!(
                "Invalid sentiment '{}'. Use: positive, negative, neutral",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentimentCounts {
    #[serde(default)]
    pub positive: u64,
    #[serde(default)]
    pub negative: u64,
    #[serde(default)]
    pub neutral: u64,
}

impl SentimentCounts {
    pub fn total(&self) -> u64 {
        self.positive + self.negative + self.neutral
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationLog {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub response: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default)]
    pub satisfaction_score: Option<f64>,
}

impl ConversationLog {
    pub fn sentiment(&self) -> Sentiment {
        Sentiment::normalize(self.sentiment.as_deref())
    }

    pub fn category_or_unknown(&self) -> &str {
        self.category.as_deref().unwrap_or("Unknown")
    }
}

/// Response of `GET session-logs`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionLogReport {
    #[serde(default)]
    pub timeframe: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub user_count: u64,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub categories: BTreeMap<String, u64>,
    #[serde(default)]
    pub sentiment: SentimentCounts,
    #[serde(default)]
    pub avg_satisfaction: f64,
    #[serde(default)]
    pub conversations: Vec<ConversationLog>,
}

impl SessionLogReport {
    /// Questions asked in the window, including ones without feedback.
    pub fn total_queries(&self) -> u64 {
        self.sentiment.total()
    }

    /// Counts for every known category, zero-filled, plus any extra the server reported.
    pub fn category_counts(&self) -> BTreeMap<String, u64> {
        let mut counts: BTreeMap<String, u64> = DEFAULT_CATEGORIES
            .iter()
            .map(|c| (c.to_string(), 0))
            .collect();
        for (name, count) in &self.categories {
            counts.insert(name.clone(), *count);
        }
        counts
    }

    pub fn top_categories(&self, limit: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = self.category_counts().into_iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(limit);
        entries
    }

    pub fn conversations_with_sentiment(&self, filter: Option<Sentiment>) -> Vec<&ConversationLog> {
        self.conversations
            .iter()
            .filter(|c| filter.map_or(true, |s| c.sentiment() == s))
            .collect()
    }

    pub fn conversations_for_session(&self, session_id: &str) -> Vec<&ConversationLog> {
        self.conversations
            .iter()
            .filter(|c| c.session_id.as_deref() == Some(session_id))
            .collect()
    }
}

/// One day of the usage trend chart.
#[derive(Debug, Clone, Serialize)]
pub struct UsageTrendPoint {
    pub date: NaiveDate,
    pub queries: u64,
    /// False when the day's request failed and the point was zero-filled.
    pub loaded: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_timeframe_query_pairs() {
        assert_eq!(
            Timeframe::Weekly.query_pairs(),
            vec![("timeframe", "weekly".to_string())]
        );
        let custom = Timeframe::custom(day("2026-03-01"), day("2026-03-07")).unwrap();
        assert_eq!(
            custom.query_pairs(),
            vec![
                ("timeframe", "custom".to_string()),
                ("start_date", "2026-03-01".to_string()),
                ("end_date", "2026-03-07".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_requires_both_dates() {
        assert!(Timeframe::parse_with_range("custom", Some("2026-03-01"), None).is_err());
        assert!(Timeframe::parse_with_range("custom", Some("2026-03-09"), Some("2026-03-01")).is_err());
        assert!(Timeframe::parse_with_range("custom", Some("03/01/2026"), Some("2026-03-02")).is_err());
        assert_eq!(
            Timeframe::parse_with_range("monthly", None, None).unwrap(),
            Timeframe::Monthly
        );
    }

    #[test]
    fn test_invalid_timeframe() {
        let err = "hourly".parse::<Timeframe>().unwrap_err();
        assert!(err.to_string().contains("hourly"));
    }

    #[test]
    fn test_sentiment_normalize() {
        assert_eq!(Sentiment::normalize(Some("POSITIVE")), Sentiment::Positive);
        assert_eq!(Sentiment::normalize(None), Sentiment::Neutral);
        assert_eq!(Sentiment::normalize(Some("mixed")), Sentiment::Neutral);
    }

    #[test]
    fn test_report_aggregates() {
        let json = r#"{
            "timeframe": "today",
            "user_count": 4,
            "categories": {"Recertification": 5, "Technical Support": 2, "Brand New": 7},
            "sentiment": {"positive": 3, "negative": 1, "neutral": 6},
            "avg_satisfaction": 71.5,
            "conversations": [
                {"session_id": "s1", "query": "q1", "response": "r1", "sentiment": "Positive"},
                {"session_id": "s2", "query": "q2", "response": "r2"},
                {"session_id": "s1", "query": "q3", "response": "r3", "sentiment": "negative"}
            ]
        }"#;
        let report: SessionLogReport = serde_json::from_str(json).unwrap();

        assert_eq!(report.total_queries(), 10);
        assert_eq!(report.category_counts().len(), DEFAULT_CATEGORIES.len() + 1);

        let top = report.top_categories(2);
        assert_eq!(top[0], ("Brand New".to_string(), 7));
        assert_eq!(top[1], ("Recertification".to_string(), 5));

        assert_eq!(
            report.conversations_with_sentiment(Some(Sentiment::Neutral)).len(),
            1
        );
        assert_eq!(report.conversations_with_sentiment(None).len(), 3);
        assert_eq!(report.conversations_for_session("s1").len(), 2);
    }
}
