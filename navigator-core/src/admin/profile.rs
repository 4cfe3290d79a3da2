use reqwest::Method;
use serde_json::Value;
use tracing::info;

use super::AdminClient;
use crate::error::{NavigatorError, NavigatorResult};
use crate::models::{ProfileUpdate, Recommendation, RecommendationList, UserProfile, UserRole};

impl AdminClient {
    pub async fn get_profile(&self) -> NavigatorResult<UserProfile> {
        self.get_json(self.url("user-profile", None)?, &[]).await
    }

    pub async fn update_profile(&self, role: UserRole) -> NavigatorResult<()> {
        let _: Value = self
            .send_json(
                Method::POST,
                self.url("user-profile", None)?,
                &ProfileUpdate::new(role),
            )
            .await?;
        info!(role = %role, "Profile role saved");
        Ok(())
    }

    pub async fn recommendations(&self, role: UserRole) -> NavigatorResult<RecommendationList> {
        let value: Value = self
            .get_json(
                self.url("recommendations", None)?,
                &[("role", role.as_str().to_string())],
            )
            .await?;
        parse_recommendations(value, role)
    }
}

/// Accepts either `{role, recommendations: [...]}` or a bare array.
fn parse_recommendations(value: Value, role: UserRole) -> NavigatorResult<RecommendationList> {
    let mut list = match value {
        Value::Array(_) => RecommendationList {
            role: None,
            recommendations: serde_json::from_value::<Vec<Recommendation>>(value)
                .map_err(|e| NavigatorError::ApiParseError(e.to_string()))?,
        },
        Value::Null => RecommendationList::default(),
        other => serde_json::from_value(other)
            .map_err(|e| NavigatorError::ApiParseError(e.to_string()))?,
    };
    list.role.get_or_insert(role);
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_wrapped() {
        let list = parse_recommendations(
            json!({"role": "staff", "recommendations": [{"title": "Scheduling", "query": "How do I schedule?"}]}),
            UserRole::Learner,
        )
        .unwrap();
        assert_eq!(list.role, Some(UserRole::Staff));
        assert_eq!(list.recommendations[0].prompt, "How do I schedule?");
    }

    #[test]
    fn test_parse_bare_array() {
        let list = parse_recommendations(
            json!([{"title": "A", "description": "d", "prompt": "p"}]),
            UserRole::Instructor,
        )
        .unwrap();
        assert_eq!(list.role, Some(UserRole::Instructor));
        assert_eq!(list.recommendations.len(), 1);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_recommendations(json!("nope"), UserRole::Learner).is_err());
    }
}
