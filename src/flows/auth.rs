use tracing::{info, warn};

use super::{FlowError, StartRoute};
use crate::backend::{Backend, Session, Table, UserProfile};

pub const MIN_PASSWORD_LEN: usize = 6;

/// Sign-in form: both fields filled.
pub fn validate_credentials(email: &str, password: &str) -> Result<(), FlowError> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(FlowError::Invalid {
            key: "validations.fillAllFields",
        });
    }
    Ok(())
}

/// Sign-up form: something that looks like an email and a long enough password.
pub fn validate_sign_up(email: &str, password: &str) -> Result<(), FlowError> {
    if !email.trim().contains('@') {
        return Err(FlowError::Invalid {
            key: "validations.emailValid",
        });
    }
    validate_password_length(password)
}

pub fn validate_new_password(password: &str, confirm: &str) -> Result<(), FlowError> {
    if password != confirm {
        return Err(FlowError::Invalid {
            key: "validations.passwordMismatch",
        });
    }
    validate_password_length(password)
}

fn validate_password_length(password: &str) -> Result<(), FlowError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(FlowError::Invalid {
            key: "validations.notExpectedCharPassword",
        });
    }
    Ok(())
}

#[derive(Clone)]
pub struct AuthFlow {
    backend: Backend,
}

impl AuthFlow {
    pub fn new(backend: Backend) -> Self {
        Self { backend }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<StartRoute, FlowError> {
        validate_credentials(email, password)?;
        let session = self.backend.auth.sign_in(email.trim(), password).await?;
        info!(user = %session.user_id, "Signed in");
        self.route_for(&session).await
    }

    /// Decide the first screen on launch. Backend failures send the user to
    /// the welcome screen instead of surfacing an error.
    pub async fn resolve_start_route(&self) -> StartRoute {
        let session = match self.backend.auth.current_session().await {
            Ok(Some(session)) => session,
            Ok(None) => return StartRoute::Welcome,
            Err(e) => {
                warn!(error = %e, "Failed to read the current session");
                return StartRoute::Welcome;
            }
        };
        match self.route_for(&session).await {
            Ok(route) => route,
            Err(e) => {
                warn!(user = %session.user_id, error = %e, "Auth check failed");
                StartRoute::Welcome
            }
        }
    }

    pub async fn sign_out(&self) -> Result<StartRoute, FlowError> {
        self.backend.auth.sign_out().await?;
        info!("Signed out");
        Ok(StartRoute::Welcome)
    }

    pub async fn set_password(&self, password: &str, confirm: &str) -> Result<StartRoute, FlowError> {
        validate_new_password(password, confirm)?;
        self.backend.auth.update_password(password).await?;
        Ok(StartRoute::Home)
    }

    async fn route_for(&self, session: &Session) -> Result<StartRoute, FlowError> {
        let profile: Option<UserProfile> = self
            .backend
            .fetch(Table::Users, session.user_id.as_str())
            .await?;
        Ok(match profile {
            Some(profile) if profile.profile_completed => StartRoute::Home,
            _ => StartRoute::CompleteProfile(session.user_id.clone()),
        })
    }
}
