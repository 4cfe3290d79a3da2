use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::NavigatorError;

/// Audience the chat answers are tailored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Instructor,
    Staff,
    #[default]
    Learner,
}

impl UserRole {
    pub fn all() -> [UserRole; 3] {
        [UserRole::Instructor, UserRole::Staff, UserRole::Learner]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Instructor => "instructor",
            UserRole::Staff => "staff",
            UserRole::Learner => "learner",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            UserRole::Instructor => "Certified MHFA instructor delivering courses",
            UserRole::Staff => "Program staff coordinating trainings",
            UserRole::Learner => "Course participant or member of the public",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "instructor" => Ok(UserRole::Instructor),
            "staff" => Ok(UserRole::Staff),
            "learner" => Ok(UserRole::Learner),
            other => Err(NavigatorError::validation(format!(
                "Unknown role '{}'. Valid roles: instructor, staff, learner",
                other
            ))),
        }
    }
}

/// Language of the suggested prompts and sample queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Es => "es",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for Language {
    type Err = NavigatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::En),
            "es" | "spanish" | "espanol" | "español" => Ok(Language::Es),
            other => Err(NavigatorError::validation(format!(
                "Unknown language '{}'. Valid languages: en, es",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "userId", skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub preferences: serde_json::Value,
}

/// Body of `POST user-profile`.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileUpdate {
    pub role: UserRole,
    pub preferences: serde_json::Value,
}

impl ProfileUpdate {
    pub fn new(role: UserRole) -> Self {
        Self {
            role,
            preferences: serde_json::json!({}),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "query")]
    pub prompt: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecommendationList {
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("Instructor".parse::<UserRole>().unwrap(), UserRole::Instructor);
        assert_eq!(" staff ".parse::<UserRole>().unwrap(), UserRole::Staff);
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_language_parse_and_toggle() {
        assert_eq!("ES".parse::<Language>().unwrap(), Language::Es);
        assert_eq!(" english ".parse::<Language>().unwrap(), Language::En);
        assert!("fr".parse::<Language>().is_err());
        assert_eq!(Language::default(), Language::En);
        assert_eq!(Language::En.toggled(), Language::Es);
        assert_eq!(Language::Es.toggled(), Language::En);
        assert_eq!(Language::Es.to_string(), "ES");
        assert_eq!(serde_json::to_string(&Language::Es).unwrap(), r#""es""#);
    }

    #[test]
    fn test_role_default_is_learner() {
        assert_eq!(UserRole::default(), UserRole::Learner);
    }

    #[test]
    fn test_profile_accepts_camel_case_user_id() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"userId":"abc","role":"staff"}"#).unwrap();
        assert_eq!(profile.user_id.as_deref(), Some("abc"));
        assert_eq!(profile.role, Some(UserRole::Staff));
    }

    #[test]
    fn test_profile_update_body() {
        let body = serde_json::to_value(ProfileUpdate::new(UserRole::Instructor)).unwrap();
        assert_eq!(body, serde_json::json!({"role": "instructor", "preferences": {}}));
    }
}
