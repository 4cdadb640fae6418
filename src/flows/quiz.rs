use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, info};

use super::{FlowError, StartRoute, auth};
use crate::backend::{Backend, QuizResponses, Table, UserProfile};
use crate::i18n::Translator;

/// One onboarding question: the prompt and the list of answer options, both
/// catalog keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizQuestion {
    pub id: u8,
    pub prompt_key: &'static str,
    pub options_key: &'static str,
}

impl QuizQuestion {
    const fn new(id: u8, prompt_key: &'static str, options_key: &'static str) -> Self {
        Self {
            id,
            prompt_key,
            options_key,
        }
    }

    pub fn prompt(&self, translator: &Translator) -> String {
        translator.text(self.prompt_key)
    }

    pub fn options(&self, translator: &Translator) -> Vec<String> {
        translator.list(self.options_key)
    }
}

pub static QUESTIONS: [QuizQuestion; 11] = [
    QuizQuestion::new(1, "quiz.questions.q1.text", "quiz.questions.q1.options"),
    QuizQuestion::new(2, "quiz.questions.q2.text", "quiz.questions.q2.options"),
    QuizQuestion::new(3, "quiz.questions.q3.text", "quiz.questions.q3.options"),
    QuizQuestion::new(4, "quiz.questions.q4.text", "quiz.questions.q4.options"),
    QuizQuestion::new(5, "quiz.questions.q5.text", "quiz.questions.q5.options"),
    QuizQuestion::new(6, "quiz.questions.q6.text", "quiz.questions.q6.options"),
    QuizQuestion::new(7, "quiz.questions.q7.text", "quiz.questions.q7.options"),
    QuizQuestion::new(8, "quiz.questions.q8.text", "quiz.questions.q8.options"),
    QuizQuestion::new(9, "quiz.questions.q9.text", "quiz.questions.q9.options"),
    QuizQuestion::new(10, "quiz.questions.q10.text", "quiz.questions.q10.options"),
    QuizQuestion::new(11, "quiz.questions.q11.text", "quiz.questions.q11.options"),
];

/// Walks the user through `QUESTIONS` in order and then creates the account.
#[derive(Debug, Default, Clone)]
pub struct QuizSession {
    current: usize,
    answers: BTreeMap<u8, String>,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// `None` once every question is answered.
    pub fn current_question(&self) -> Option<&'static QuizQuestion> {
        QUESTIONS.get(self.current)
    }

    pub fn is_completed(&self) -> bool {
        self.current >= QUESTIONS.len()
    }

    /// 1-based position of the current question and the total.
    pub fn progress(&self) -> (usize, usize) {
        ((self.current + 1).min(QUESTIONS.len()), QUESTIONS.len())
    }

    pub fn progress_fraction(&self) -> f32 {
        let (position, total) = self.progress();
        position as f32 / total as f32
    }

    pub fn progress_label(&self, translator: &Translator) -> String {
        let (position, total) = self.progress();
        crate::tr_f!(translator, "quiz.progress", "current" => position, "total" => total)
    }

    /// Record the option shown at `index` for the current question, in the
    /// language it was shown in, and move on.
    pub fn answer(&mut self, translator: &Translator, index: usize) -> Result<(), FlowError> {
        let Some(question) = self.current_question() else {
            return Err(FlowError::QuizFinished);
        };
        let option = question
            .options(translator)
            .into_iter()
            .nth(index)
            .ok_or(FlowError::UnknownOption {
                question: question.id,
                index,
            })?;
        debug!(question = question.id, %option, "Quiz answer recorded");
        self.answers.insert(question.id, option);
        self.current += 1;
        Ok(())
    }

    /// Go back one question; its previous answer stays until replaced.
    pub fn back(&mut self) {
        self.current = self.current.saturating_sub(1);
    }

    pub fn answers(&self) -> &BTreeMap<u8, String> {
        &self.answers
    }

    /// Create the account, its `users` row and the stored answers.
    pub async fn submit(
        &self,
        backend: &Backend,
        email: &str,
        password: &str,
    ) -> Result<StartRoute, FlowError> {
        if !self.is_completed() {
            return Err(FlowError::QuizIncomplete);
        }
        auth::validate_sign_up(email, password)?;
        let email = email.trim();

        let user_id = backend.auth.sign_up(email, password).await?;
        info!(user = %user_id, "Account created from quiz");

        let mut profile = UserProfile::new(user_id.clone(), email, Utc::now());
        profile.quiz_completed = true;
        backend.insert(Table::Users, &profile).await?;

        let responses = QuizResponses {
            user_id: user_id.clone(),
            responses: self
                .answers
                .iter()
                .map(|(id, answer)| (id.to_string(), answer.clone()))
                .collect(),
        };
        backend.insert(Table::QuizResponses, &responses).await?;

        Ok(StartRoute::CompleteProfile(user_id))
    }
}
