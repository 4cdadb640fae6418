// Screen logic without the screens: validation, backend calls and the route
// to show next. Each flow owns a `Backend` handle and, where it renders text,
// a `Translator`.

pub mod admin;
pub mod auth;
pub mod exercises;
pub mod home;
pub mod profile;
pub mod quiz;

use crate::backend::{BackendError, UserId};
use crate::i18n::Translator;

pub use admin::AdminConsole;
pub use auth::AuthFlow;
pub use exercises::{ExerciseFilter, ExerciseLibrary};
pub use profile::{CompleteProfileForm, FieldErrors, ProfileFlow, ProfileSummary};
pub use quiz::{QUESTIONS, QuizQuestion, QuizSession};

/// Where the app goes after an auth-related step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartRoute {
    Welcome,
    CompleteProfile(UserId),
    Home,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FlowError {
    /// Client-side validation failed; `key` is the catalog message to show.
    #[error("invalid input: {key}")]
    Invalid { key: &'static str },

    #[error("some form fields are invalid")]
    Form(FieldErrors),

    #[error("question {question} has no option {index}")]
    UnknownOption { question: u8, index: usize },

    #[error("the quiz has unanswered questions")]
    QuizIncomplete,

    #[error("every quiz question is already answered")]
    QuizFinished,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FlowError {
    /// Text for an alert. Validation errors carry their own message; anything
    /// else shows `fallback_key`.
    pub fn message(&self, translator: &Translator, fallback_key: &str) -> String {
        match self {
            FlowError::Invalid { key } => translator.text(key),
            FlowError::Form(_) => translator.text("validations.fillAllFields"),
            _ => translator.text(fallback_key),
        }
    }
}
