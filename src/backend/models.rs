use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::UserId;
use crate::dates::CanonicalDate;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    #[default]
    Inactive,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

/// A row of the `users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub birth_date: Option<CanonicalDate>,
    #[serde(default)]
    pub subscription_status: SubscriptionStatus,
    #[serde(default)]
    pub subscription_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quiz_completed: bool,
    #[serde(default)]
    pub profile_completed: bool,
    #[serde(default)]
    pub profile_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(id: UserId, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            first_name: None,
            last_name: None,
            birth_date: None,
            subscription_status: SubscriptionStatus::default(),
            subscription_end_date: None,
            quiz_completed: false,
            profile_completed: false,
            profile_image_url: None,
            created_at,
        }
    }

    pub fn full_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        (!name.is_empty()).then_some(name)
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription_status == SubscriptionStatus::Active
    }
}

/// Partial `users` update; only the set columns are sent.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<CanonicalDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_status: Option<SubscriptionStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_end_date: Option<DateTime<Utc>>,
}

/// A row of the `quiz_responses` table. Answers are keyed by question id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResponses {
    pub user_id: UserId,
    pub responses: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    pub const ALL: [Level; 3] = [Level::Beginner, Level::Intermediate, Level::Advanced];

    pub fn label_key(&self) -> &'static str {
        match self {
            Level::Beginner => "exercises.levels.beginner",
            Level::Intermediate => "exercises.levels.intermediate",
            Level::Advanced => "exercises.levels.advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Core,
    Arms,
    Legs,
    Back,
    #[serde(rename = "Full Body")]
    FullBody,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Core,
        Category::Arms,
        Category::Legs,
        Category::Back,
        Category::FullBody,
    ];

    pub fn label_key(&self) -> &'static str {
        match self {
            Category::Core => "exercises.categories.core",
            Category::Arms => "exercises.categories.arms",
            Category::Legs => "exercises.categories.legs",
            Category::Back => "exercises.categories.back",
            Category::FullBody => "exercises.categories.fullBody",
        }
    }
}

/// A row of the `exercises` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: Level,
    pub category: Category,
    pub image_url: String,
    #[serde(default)]
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_rows_tolerate_missing_optional_columns() {
        let row = json!({
            "id": "u1",
            "email": "ana@example.com",
            "created_at": "2025-01-02T03:04:05Z",
        });
        let user: UserProfile = serde_json::from_value(row).unwrap();
        assert_eq!(user.subscription_status, SubscriptionStatus::Inactive);
        assert!(!user.profile_completed);
        assert_eq!(user.full_name(), None);
    }

    #[test]
    fn profile_update_only_sends_set_columns() {
        let update = ProfileUpdate {
            birth_date: Some("1990-05-13".parse().unwrap()),
            profile_completed: Some(true),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"birth_date": "1990-05-13", "profile_completed": true})
        );
    }

    #[test]
    fn exercise_categories_use_display_names() {
        assert_eq!(
            serde_json::to_value(Category::FullBody).unwrap(),
            json!("Full Body")
        );
        assert_eq!(serde_json::to_value(Level::Beginner).unwrap(), json!("Beginner"));
    }
}
