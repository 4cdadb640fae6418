use chrono::{DateTime, Months, Utc};
use tracing::info;

use super::FlowError;
use crate::backend::{Backend, ProfileUpdate, SubscriptionStatus, Table, UserId, UserProfile};
use crate::i18n::Translator;

/// Subscription lengths offered by the console, in months.
pub const EXTENSION_CHOICES: [u32; 3] = [1, 3, 6];

/// Subscription management over the whole `users` table.
#[derive(Clone)]
pub struct AdminConsole {
    backend: Backend,
}

impl AdminConsole {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// Every user, newest account first.
    pub async fn list_users(&self) -> Result<Vec<UserProfile>, FlowError> {
        let mut users: Vec<UserProfile> = self.backend.fetch_all(Table::Users).await?;
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Button labels for `EXTENSION_CHOICES`.
    pub fn extension_labels(translator: &Translator) -> Vec<(u32, String)> {
        EXTENSION_CHOICES
            .into_iter()
            .map(|months| (months, crate::tr_f!(translator, "admin.extend", "months" => months)))
            .collect()
    }

    pub fn active_count(users: &[UserProfile]) -> usize {
        users.iter().filter(|user| user.is_subscribed()).count()
    }

    pub async fn user_details(&self, user_id: &UserId) -> Result<UserProfile, FlowError> {
        Ok(self.backend.user(user_id).await?)
    }

    /// Push the end date `months` further, counting from the current end date
    /// (even a past one) or from `now` when there is none.
    pub async fn extend_subscription(
        &self,
        user_id: &UserId,
        months: u32,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, FlowError> {
        if months == 0 {
            return Err(FlowError::Invalid {
                key: "validations.required",
            });
        }
        let user = self.backend.user(user_id).await?;
        let start = user.subscription_end_date.unwrap_or(now);
        let end = start
            .checked_add_months(Months::new(months))
            .ok_or(FlowError::Invalid {
                key: "validations.invalidDate",
            })?;

        let update = ProfileUpdate {
            subscription_status: Some(SubscriptionStatus::Active),
            subscription_end_date: Some(end),
            ..Default::default()
        };
        self.backend
            .update(Table::Users, user_id.as_str(), &update)
            .await?;
        info!(user = %user_id, months, %end, "Subscription extended");
        self.user_details(user_id).await
    }

    /// Mark the subscription cancelled. The end date is kept for the record.
    pub async fn cancel_subscription(&self, user_id: &UserId) -> Result<UserProfile, FlowError> {
        let update = ProfileUpdate {
            subscription_status: Some(SubscriptionStatus::Cancelled),
            ..Default::default()
        };
        self.backend
            .update(Table::Users, user_id.as_str(), &update)
            .await?;
        info!(user = %user_id, "Subscription cancelled");
        self.user_details(user_id).await
    }
}
