use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::{FlowError, StartRoute};
use crate::backend::{Backend, ProfileUpdate, Table, UserId, UserProfile};
use crate::config::AppConfig;
use crate::dates::{CanonicalDate, DateValidator, resolve_format};
use crate::i18n::Translator;

pub const DEFAULT_AVATAR_BUCKET: &str = "avatars";

/// Localized messages shown under each field of the completion form.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldErrors {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<String>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.birth_date.is_none()
    }
}

/// The completed form, ready to be written to the `users` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidProfile {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: CanonicalDate,
}

#[derive(Debug, Default, Clone)]
pub struct CompleteProfileForm {
    first_name: String,
    last_name: String,
    birth_date: String,
    errors: FieldErrors,
}

impl CompleteProfileForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    // Editing a field clears its error until the next submit.
    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.first_name = value.into();
        self.errors.first_name = None;
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.last_name = value.into();
        self.errors.last_name = None;
    }

    pub fn set_birth_date(&mut self, value: impl Into<String>) {
        self.birth_date = value.into();
        self.errors.birth_date = None;
    }

    /// Placeholder for the birth date field, e.g. "Date of Birth (MM/DD/YYYY)".
    pub fn birth_date_placeholder(translator: &Translator) -> String {
        crate::tr_f!(
            translator,
            "completeProfile.birthDateHint",
            "label" => translator.text("completeProfile.birthDate"),
            "pattern" => translator.text("completeProfile.datePattern"),
        )
    }

    /// Input mask for the birth date field in the active locale.
    pub fn birth_date_mask(translator: &Translator) -> String {
        resolve_format(translator.locale()).pattern.mask()
    }

    /// Check every field, keeping the messages on the form for display.
    pub fn validate_on(
        &mut self,
        translator: &Translator,
        validator: &DateValidator,
        today: NaiveDate,
    ) -> Result<ValidProfile, FieldErrors> {
        let required = || translator.text("validations.required");
        let mut errors = FieldErrors::default();

        let first_name = self.first_name.trim();
        if first_name.is_empty() {
            errors.first_name = Some(required());
        }
        let last_name = self.last_name.trim();
        if last_name.is_empty() {
            errors.last_name = Some(required());
        }

        let birth_date = if self.birth_date.trim().is_empty() {
            errors.birth_date = Some(required());
            None
        } else {
            match validator.validate_on(&self.birth_date, translator.locale(), today) {
                Ok(date) => Some(date),
                Err(e) => {
                    let years = validator.max_age_years().to_string();
                    errors.birth_date =
                        Some(translator.text_with(e.message_key(), &[("years", &years)]));
                    None
                }
            }
        };

        let valid = match birth_date {
            Some(birth_date) if errors.is_empty() => Ok(ValidProfile {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                birth_date,
            }),
            _ => Err(errors.clone()),
        };
        self.errors = errors;
        valid
    }
}

/// What the profile tab shows for the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSummary {
    pub full_name: Option<String>,
    pub email: String,
    pub age_label: Option<String>,
    pub plan_label: Option<String>,
    pub expires_label: Option<String>,
    pub avatar_url: Option<String>,
}

impl ProfileSummary {
    pub fn new(profile: &UserProfile, translator: &Translator, today: NaiveDate) -> Self {
        let age_label = profile
            .birth_date
            .map(|birth| crate::tr_f!(translator, "profile.yearsOld", "age" => birth.age_on(today)));

        let (plan_label, expires_label) = if profile.is_subscribed() {
            let format = resolve_format(translator.locale());
            let expires = profile.subscription_end_date.map(|end| {
                crate::tr_f!(translator, "profile.expiresOn", "date" => format.format_long(end.date_naive()))
            });
            (Some(translator.text("profile.premiumMonthly")), expires)
        } else {
            (None, None)
        };

        Self {
            full_name: profile.full_name(),
            email: profile.email.clone(),
            age_label,
            plan_label,
            expires_label,
            avatar_url: profile.profile_image_url.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ProfileFlow {
    backend: Backend,
    translator: Translator,
    validator: DateValidator,
    avatar_bucket: String,
}

impl ProfileFlow {
    pub fn new(backend: Backend, translator: Translator) -> Self {
        Self {
            backend,
            translator,
            validator: DateValidator::default(),
            avatar_bucket: DEFAULT_AVATAR_BUCKET.to_string(),
        }
    }

    /// Age window and avatar bucket as configured.
    pub fn from_config(backend: Backend, translator: Translator, config: &AppConfig) -> Self {
        Self::new(backend, translator)
            .with_validator(DateValidator::new(config.max_birth_age_years))
            .with_avatar_bucket(&config.avatar_bucket)
    }

    pub fn validator(&self) -> &DateValidator {
        &self.validator
    }

    pub fn with_validator(mut self, validator: DateValidator) -> Self {
        self.validator = validator;
        self
    }

    pub fn with_avatar_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.avatar_bucket = bucket.into();
        self
    }

    pub async fn complete(
        &self,
        user_id: &UserId,
        form: &mut CompleteProfileForm,
    ) -> Result<StartRoute, FlowError> {
        self.complete_on(user_id, form, Local::now().date_naive())
            .await
    }

    pub async fn complete_on(
        &self,
        user_id: &UserId,
        form: &mut CompleteProfileForm,
        today: NaiveDate,
    ) -> Result<StartRoute, FlowError> {
        let valid = form
            .validate_on(&self.translator, &self.validator, today)
            .map_err(|errors| {
                debug!(user = %user_id, ?errors, "Profile form rejected");
                FlowError::Form(errors)
            })?;

        let update = ProfileUpdate {
            first_name: Some(valid.first_name),
            last_name: Some(valid.last_name),
            birth_date: Some(valid.birth_date),
            profile_completed: Some(true),
            ..Default::default()
        };
        self.backend
            .update(Table::Users, user_id.as_str(), &update)
            .await?;
        info!(user = %user_id, "Profile completed");
        Ok(StartRoute::Home)
    }

    pub async fn load_summary(&self, user_id: &UserId) -> Result<ProfileSummary, FlowError> {
        let profile = self.backend.user(user_id).await?;
        Ok(ProfileSummary::new(
            &profile,
            &self.translator,
            Local::now().date_naive(),
        ))
    }

    /// Store a new profile picture and point the user row at it. Returns the
    /// public URL.
    pub async fn upload_avatar(
        &self,
        user_id: &UserId,
        bytes: Vec<u8>,
        extension: &str,
    ) -> Result<String, FlowError> {
        let extension = match extension.trim().trim_start_matches('.') {
            "" => "jpg".to_string(),
            ext => ext.to_ascii_lowercase(),
        };
        let path = format!("{}/{user_id}.{extension}", self.avatar_bucket);
        self.backend.blobs.upload(&path, bytes).await?;

        let url = self.backend.blobs.public_url(&path);
        let update = ProfileUpdate {
            profile_image_url: Some(url.clone()),
            ..Default::default()
        };
        self.backend
            .update(Table::Users, user_id.as_str(), &update)
            .await?;
        info!(user = %user_id, %path, "Avatar updated");
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SubscriptionStatus, from_row};
    use crate::fakers::{BackendEvent, InMemoryBackend, InMemoryBackendBuilder, Operation};
    use crate::i18n::{Catalog, Locale, LocaleStore};
    use chrono::{TimeZone, Utc};
    use smol::block_on;
    use std::rc::Rc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn translator(locale: Locale) -> Translator {
        Translator::new(Rc::new(Catalog::builtin().unwrap()), LocaleStore::new(locale))
    }

    fn filled(birth_date: &str) -> CompleteProfileForm {
        let mut form = CompleteProfileForm::new();
        form.set_first_name(" Ana ");
        form.set_last_name("Silva");
        form.set_birth_date(birth_date);
        form
    }

    fn fake_with_user() -> InMemoryBackend {
        let user = UserProfile::new(UserId::from("u1"), "ana@example.com", Utc::now());
        InMemoryBackendBuilder::new().user(&user).build()
    }

    fn stored_user(fake: &InMemoryBackend) -> UserProfile {
        from_row(Table::Users, fake.rows(Table::Users)[0].clone()).unwrap()
    }

    #[test]
    fn empty_form_marks_every_field_required() {
        let t = translator(Locale::En);
        let mut form = CompleteProfileForm::new();
        form.set_first_name("   ");
        let errors = form
            .validate_on(&t, &DateValidator::default(), today())
            .unwrap_err();
        let required = Some("This field is required".to_string());
        assert_eq!(errors.first_name, required);
        assert_eq!(errors.last_name, required);
        assert_eq!(errors.birth_date, required);
        assert_eq!(form.errors(), &errors);
    }

    #[test]
    fn birth_date_errors_are_localized() {
        let t = translator(Locale::Pt);
        let validator = DateValidator::default();

        let mut form = filled("31/02/2020");
        let errors = form.validate_on(&t, &validator, today()).unwrap_err();
        assert_eq!(errors.first_name, None);
        assert_eq!(
            errors.birth_date.as_deref(),
            Some(t.text("validations.invalidDate").as_str())
        );

        form.set_birth_date("01/01/1900");
        assert_eq!(form.errors().birth_date, None);
        let errors = form.validate_on(&t, &validator, today()).unwrap_err();
        let message = errors.birth_date.unwrap();
        assert!(message.contains("120"), "{message}");
    }

    #[test]
    fn valid_form_is_trimmed_and_canonical() {
        let t = translator(Locale::En);
        let mut form = filled("05/13/1990");
        let valid = form
            .validate_on(&t, &DateValidator::default(), today())
            .unwrap();
        assert_eq!(valid.first_name, "Ana");
        assert_eq!(valid.birth_date.to_string(), "1990-05-13");
        assert!(form.errors().is_empty());
    }

    #[test]
    fn placeholder_follows_the_locale() {
        let t = translator(Locale::En);
        assert_eq!(
            CompleteProfileForm::birth_date_placeholder(&t),
            "Date of Birth (MM/DD/YYYY)"
        );
        assert_eq!(CompleteProfileForm::birth_date_mask(&t), "99/99/9999");

        t.locale_store().set_active(Locale::Pt);
        let placeholder = CompleteProfileForm::birth_date_placeholder(&t);
        assert!(placeholder.ends_with("(DD/MM/AAAA)"), "{placeholder}");
    }

    #[test]
    fn completing_the_profile_updates_the_user_row() {
        let fake = fake_with_user();
        let flow = ProfileFlow::new(fake.backend(), translator(Locale::Es));
        let mut form = filled("13/05/1990");

        let route = block_on(flow.complete_on(&UserId::from("u1"), &mut form, today()));
        assert_eq!(route, Ok(StartRoute::Home));

        let user = stored_user(&fake);
        assert!(user.profile_completed);
        assert_eq!(user.full_name().as_deref(), Some("Ana Silva"));
        assert_eq!(user.birth_date.map(|d| d.to_string()).as_deref(), Some("1990-05-13"));
    }

    #[test]
    fn invalid_form_never_reaches_the_backend() {
        let fake = fake_with_user();
        let tracker = fake.output_tracker();
        let flow = ProfileFlow::new(fake.backend(), translator(Locale::En));
        let mut form = filled("10/19/2026");

        let result = block_on(flow.complete_on(&UserId::from("u1"), &mut form, today()));
        let Err(FlowError::Form(errors)) = result else {
            panic!("unexpected result {result:?}");
        };
        assert_eq!(
            errors.birth_date.as_deref(),
            Some("The date cannot be in the future")
        );
        assert!(tracker.is_empty());
    }

    #[test]
    fn summary_shows_age_and_localized_expiry() {
        let mut user = UserProfile::new(UserId::from("u1"), "ana@example.com", Utc::now());
        user.first_name = Some("Ana".into());
        user.birth_date = Some("1990-05-13".parse().unwrap());
        user.subscription_status = SubscriptionStatus::Active;
        user.subscription_end_date = Some(Utc.with_ymd_and_hms(2026, 3, 5, 12, 0, 0).unwrap());

        let t = translator(Locale::En);
        let summary = ProfileSummary::new(&user, &t, today());
        assert_eq!(summary.full_name.as_deref(), Some("Ana"));
        assert_eq!(summary.age_label.as_deref(), Some("36 years old"));
        assert_eq!(summary.plan_label.as_deref(), Some("Premium Monthly"));
        assert_eq!(
            summary.expires_label.as_deref(),
            Some("Expires on March 5, 2026")
        );

        t.locale_store().set_active(Locale::Pt);
        let summary = ProfileSummary::new(&user, &t, today());
        let expires = summary.expires_label.unwrap();
        assert!(expires.ends_with("5 de março de 2026"), "{expires}");
    }

    #[test]
    fn summary_without_subscription_has_no_plan() {
        let user = UserProfile::new(UserId::from("u1"), "ana@example.com", Utc::now());
        let summary = ProfileSummary::new(&user, &translator(Locale::En), today());
        assert_eq!(summary.plan_label, None);
        assert_eq!(summary.expires_label, None);
        assert_eq!(summary.age_label, None);
    }

    #[test]
    fn load_summary_reports_missing_users() {
        let fake = InMemoryBackend::default();
        let flow = ProfileFlow::new(fake.backend(), translator(Locale::En));
        assert!(matches!(
            block_on(flow.load_summary(&UserId::from("ghost"))),
            Err(FlowError::Backend(_))
        ));
    }

    #[test]
    fn avatar_upload_stores_bytes_and_url() {
        let fake = fake_with_user();
        let tracker = fake.output_tracker();
        let flow = ProfileFlow::new(fake.backend(), translator(Locale::En));

        let url = block_on(flow.upload_avatar(&UserId::from("u1"), vec![1, 2, 3], ".PNG")).unwrap();
        assert_eq!(url, "https://storage.test/avatars/u1.png");
        assert_eq!(fake.blob("avatars/u1.png"), Some(vec![1, 2, 3]));
        assert_eq!(stored_user(&fake).profile_image_url, Some(url));
        assert_eq!(
            tracker.items()[0],
            BackendEvent::Upload("avatars/u1.png".into(), 3)
        );
    }

    #[test]
    fn configured_flow_uses_the_configured_window_and_bucket() {
        let config = AppConfig {
            max_birth_age_years: 100,
            avatar_bucket: "pictures".into(),
            ..Default::default()
        };
        let fake = fake_with_user();
        let flow = ProfileFlow::from_config(fake.backend(), translator(Locale::Pt), &config);
        let user_id = UserId::from("u1");

        // 110 years old: inside the default window, outside the configured one
        let mut form = filled("01/01/1916");
        let result = block_on(flow.complete_on(&user_id, &mut form, today()));
        let Err(FlowError::Form(errors)) = result else {
            panic!("unexpected result {result:?}");
        };
        let message = errors.birth_date.unwrap();
        assert!(message.contains("100"), "{message}");
        assert!(!stored_user(&fake).profile_completed);

        let url = block_on(flow.upload_avatar(&user_id, vec![7], "jpg")).unwrap();
        assert_eq!(url, "https://storage.test/pictures/u1.jpg");
        assert_eq!(fake.blob("pictures/u1.jpg"), Some(vec![7]));
        assert_eq!(fake.blob("avatars/u1.jpg"), None);
    }

    #[test]
    fn failed_upload_leaves_the_profile_alone() {
        let user = UserProfile::new(UserId::from("u1"), "ana@example.com", Utc::now());
        let fake = InMemoryBackendBuilder::new()
            .user(&user)
            .fail(Operation::Upload)
            .build();
        let flow = ProfileFlow::new(fake.backend(), translator(Locale::En))
            .with_avatar_bucket("pictures");
        assert!(block_on(flow.upload_avatar(&UserId::from("u1"), vec![0], "jpg")).is_err());
        assert_eq!(stored_user(&fake).profile_image_url, None);
    }
}
