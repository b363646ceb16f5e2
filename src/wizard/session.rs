//! Session — one customer's wizard pass, chat transcript, and results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, WizardError};
use crate::profile::{
    CustomerProfile, Persona, PersonaAnswers, interpret_experience, interpret_flexibility,
};
use crate::recommend::{Requester, update_field};

use super::questions::IntakeAnswers;
use super::state::SessionStep;

/// Who said a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One line of the append-only chat transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEntry {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

impl ChatEntry {
    fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            at: Utc::now(),
        }
    }
}

/// Outcome of one chat input in the Results step.
#[derive(Debug, Clone)]
pub enum ChatReply {
    /// The stored recommendation text was replaced.
    Refreshed,
    /// A profile field was updated; recommendations are now stale.
    ProfileUpdated,
    /// A general question was answered by the query engine.
    Answer(String),
    /// The query engine call failed; the session is unchanged and alive.
    Failed(String),
}

/// One intake session: wizard step, profile, recommendation, transcript.
///
/// Sessions own their state exclusively; nothing is shared across sessions.
#[derive(Debug, Clone, Default)]
pub struct Session {
    step: SessionStep,
    profile: CustomerProfile,
    recommendation: Option<String>,
    transcript: Vec<ChatEntry>,
    /// Business description as captured at intake, before the Business
    /// follow-up is joined on. Re-submitting the follow-up after a failed
    /// generation rebuilds from this instead of appending twice.
    intake_description: String,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> SessionStep {
        self.step
    }

    pub fn profile(&self) -> &CustomerProfile {
        &self.profile
    }

    pub fn recommendation(&self) -> Option<&str> {
        self.recommendation.as_deref()
    }

    pub fn transcript(&self) -> &[ChatEntry] {
        &self.transcript
    }

    /// Leave the welcome screen.
    pub fn begin(&mut self) -> Result<(), WizardError> {
        self.require_step("begin", SessionStep::Welcome)?;
        self.advance(SessionStep::InitialQuestions);
        Ok(())
    }

    /// Record the seven intake answers and move to persona selection.
    ///
    /// All seven answers must be non-empty after trimming; otherwise the
    /// step does not change and the first missing field is reported.
    pub fn submit_intake(&mut self, answers: &IntakeAnswers) -> Result<(), WizardError> {
        self.require_step("submit_intake", SessionStep::InitialQuestions)?;
        for (field, value) in answers.fields() {
            if value.trim().is_empty() {
                return Err(WizardError::EmptyAnswer { field });
            }
        }

        let shareholders = answers.shareholders.trim();
        self.profile.shareholder_count = match shareholders.split_whitespace().next() {
            Some(token) if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) => {
                token.to_string()
            }
            _ => "Not specified".to_string(),
        };
        self.profile.nationalities = shareholders.to_string();
        self.profile.visas_needed = answers.visas.trim().to_string();
        self.profile.business_description = answers.business.trim().to_string();
        self.profile.experience = interpret_experience(answers.experience.trim());
        self.profile.flexibility = interpret_flexibility(answers.flexibility.trim());
        self.profile.purpose = answers.purpose.trim().to_string();
        self.profile.timeline = answers.timeline.trim().to_string();
        self.intake_description = self.profile.business_description.clone();

        self.advance(SessionStep::PersonaSelection);
        Ok(())
    }

    /// Select the customer persona. Irreversible for the session.
    pub fn select_persona(&mut self, persona: Persona) -> Result<(), WizardError> {
        self.require_step("select_persona", SessionStep::PersonaSelection)?;
        self.profile.persona = Some(persona);
        self.advance(SessionStep::PersonaFollowup(persona));
        Ok(())
    }

    /// Record the persona follow-up answers and move to Requesting.
    pub fn submit_followup(&mut self, answers: PersonaAnswers) -> Result<(), WizardError> {
        let expected = match self.step {
            SessionStep::PersonaFollowup(persona) => persona,
            step => {
                return Err(WizardError::InvalidStep {
                    action: "submit_followup",
                    step,
                });
            }
        };
        if answers.persona() != expected {
            return Err(WizardError::PersonaMismatch {
                expected,
                got: answers.persona(),
            });
        }
        for (field, value) in answers.fields() {
            if value.trim().is_empty() {
                return Err(WizardError::EmptyAnswer { field });
            }
        }

        if let PersonaAnswers::Business { business_model } = &answers {
            // The raw (untruncated) answer strengthens the description the
            // query engine correlates against; a single " | " separator even
            // across re-submissions.
            self.profile.business_description =
                format!("{} | {}", self.intake_description, business_model.trim());
        }
        self.profile.persona_answers = Some(answers.truncated());

        self.advance(SessionStep::Requesting);
        Ok(())
    }

    /// Run the recommendation request against the completed profile.
    ///
    /// Valid from `Requesting` (first pass, entered by `submit_followup`)
    /// and from `Results` (regenerate). On failure the session returns to
    /// the prior interactive step and the error is surfaced to the caller.
    pub async fn generate(&mut self, requester: &Requester) -> Result<(), Error> {
        let fallback = match (self.step, self.profile.persona) {
            (SessionStep::Requesting, Some(persona)) => SessionStep::PersonaFollowup(persona),
            (SessionStep::Results, _) => SessionStep::Results,
            (step, _) => {
                return Err(WizardError::InvalidStep {
                    action: "generate",
                    step,
                }
                .into());
            }
        };

        self.step = SessionStep::Requesting;
        match requester.activity_recommendations(&self.profile).await {
            Ok(text) => {
                self.recommendation = Some(text);
                self.advance(SessionStep::Results);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Recommendation request failed");
                self.step = fallback;
                Err(Error::RecommendationUnavailable(e))
            }
        }
    }

    /// Handle one free-text chat input in the Results step.
    ///
    /// `refresh` re-queries with the current profile; otherwise the input is
    /// tried as a field update, then forwarded as a general question. Every
    /// branch appends to the transcript. Query-engine failures come back as
    /// [`ChatReply::Failed`] so the session stays usable.
    pub async fn chat(
        &mut self,
        requester: &Requester,
        input: &str,
    ) -> Result<ChatReply, WizardError> {
        self.require_step("chat", SessionStep::Results)?;
        let input = input.trim();
        self.transcript.push(ChatEntry::new(ChatRole::User, input));

        if input.eq_ignore_ascii_case("refresh") {
            return Ok(match requester.activity_recommendations(&self.profile).await {
                Ok(text) => {
                    self.recommendation = Some(text);
                    self.push_assistant("Recommendations refreshed with the updated profile.");
                    ChatReply::Refreshed
                }
                Err(e) => self.push_failure(e),
            });
        }

        if update_field(&mut self.profile, input) {
            self.push_assistant("Profile updated. Send 'refresh' to regenerate recommendations.");
            return Ok(ChatReply::ProfileUpdated);
        }

        Ok(match requester.answer_question(&self.profile, input).await {
            Ok(answer) => {
                self.push_assistant(answer.clone());
                ChatReply::Answer(answer)
            }
            Err(e) => self.push_failure(e),
        })
    }

    /// Discard the whole session: profile, recommendation, transcript.
    pub fn reset(&mut self) {
        tracing::debug!("Session reset");
        *self = Self::new();
    }

    fn push_assistant(&mut self, content: impl Into<String>) {
        self.transcript
            .push(ChatEntry::new(ChatRole::Assistant, content));
    }

    fn push_failure(&mut self, error: crate::error::RetrievalError) -> ChatReply {
        tracing::warn!(error = %error, "Query engine call failed during chat");
        let message = format!("Recommendations unavailable: {error}");
        self.push_assistant(message.clone());
        ChatReply::Failed(message)
    }

    fn require_step(&self, action: &'static str, expected: SessionStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::InvalidStep {
                action,
                step: self.step,
            })
        }
    }

    fn advance(&mut self, target: SessionStep) {
        debug_assert!(self.step.can_transition_to(target));
        tracing::debug!(from = %self.step, to = %target, "Wizard step transition");
        self.step = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Experience, Flexibility};

    fn intake() -> IntakeAnswers {
        IntakeAnswers {
            shareholders: "2 shareholders, Indian and German passports".to_string(),
            visas: "3 visas".to_string(),
            business: "Online retail of home furniture".to_string(),
            experience: "This is a new venture".to_string(),
            flexibility: "Open to suggestions".to_string(),
            purpose: "Access to UAE market".to_string(),
            timeline: "Within two months".to_string(),
        }
    }

    fn session_at_persona_selection() -> Session {
        let mut session = Session::new();
        session.begin().unwrap();
        session.submit_intake(&intake()).unwrap();
        session
    }

    #[test]
    fn begin_only_from_welcome() {
        let mut session = Session::new();
        session.begin().unwrap();
        assert_eq!(session.step(), SessionStep::InitialQuestions);
        assert!(matches!(
            session.begin(),
            Err(WizardError::InvalidStep { action: "begin", .. })
        ));
    }

    #[test]
    fn intake_rejects_any_empty_answer() {
        let mut session = Session::new();
        session.begin().unwrap();
        let mut answers = intake();
        answers.purpose = "   ".to_string();
        let err = session.submit_intake(&answers).unwrap_err();
        assert!(matches!(err, WizardError::EmptyAnswer { field: "purpose" }));
        // Step unchanged, nothing stored.
        assert_eq!(session.step(), SessionStep::InitialQuestions);
        assert!(session.profile().purpose.is_empty());
    }

    #[test]
    fn intake_parses_digit_leading_shareholder_answer() {
        let session = session_at_persona_selection();
        let profile = session.profile();
        assert_eq!(profile.shareholder_count, "2");
        assert_eq!(
            profile.nationalities,
            "2 shareholders, Indian and German passports"
        );
        assert_eq!(profile.experience, Experience::New);
        assert_eq!(profile.flexibility, Flexibility::Flexible);
    }

    #[test]
    fn intake_without_leading_digit_is_not_specified() {
        let mut session = Session::new();
        session.begin().unwrap();
        let mut answers = intake();
        answers.shareholders = "Two partners from India".to_string();
        session.submit_intake(&answers).unwrap();
        assert_eq!(session.profile().shareholder_count, "Not specified");
        assert_eq!(session.profile().nationalities, "Two partners from India");
    }

    #[test]
    fn persona_is_selected_once() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Residential).unwrap();
        assert_eq!(
            session.step(),
            SessionStep::PersonaFollowup(Persona::Residential)
        );
        assert!(matches!(
            session.select_persona(Persona::Finance),
            Err(WizardError::InvalidStep { .. })
        ));
        assert_eq!(session.profile().persona, Some(Persona::Residential));
    }

    #[test]
    fn followup_must_match_persona() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Residential).unwrap();
        let err = session
            .submit_followup(PersonaAnswers::Business {
                business_model: "Dropshipping".to_string(),
            })
            .unwrap_err();
        assert!(matches!(
            err,
            WizardError::PersonaMismatch {
                expected: Persona::Residential,
                got: Persona::Business,
            }
        ));
    }

    #[test]
    fn business_followup_appends_with_single_separator() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Business).unwrap();
        session
            .submit_followup(PersonaAnswers::Business {
                business_model: "B2C e-commerce with own warehouse".to_string(),
            })
            .unwrap();
        assert_eq!(
            session.profile().business_description,
            "Online retail of home furniture | B2C e-commerce with own warehouse"
        );
        assert_eq!(session.step(), SessionStep::Requesting);
    }

    #[test]
    fn business_followup_resubmission_does_not_double_append() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Business).unwrap();
        session
            .submit_followup(PersonaAnswers::Business {
                business_model: "First attempt".to_string(),
            })
            .unwrap();
        // A failed generation sends the session back one step.
        session.step = SessionStep::PersonaFollowup(Persona::Business);
        session
            .submit_followup(PersonaAnswers::Business {
                business_model: "Second attempt".to_string(),
            })
            .unwrap();
        assert_eq!(
            session.profile().business_description,
            "Online retail of home furniture | Second attempt"
        );
    }

    #[test]
    fn followup_truncates_stored_answers() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Finance).unwrap();
        let long = "word ".repeat(30);
        session
            .submit_followup(PersonaAnswers::Finance {
                invoicing: long.clone(),
                bank_purpose: "Receive payments".to_string(),
                tax_strategy: long,
            })
            .unwrap();
        match session.profile().persona_answers.as_ref().unwrap() {
            PersonaAnswers::Finance {
                invoicing,
                tax_strategy,
                ..
            } => {
                assert!(invoicing.ends_with("..."));
                assert_eq!(invoicing.split_whitespace().count(), 15);
                assert!(tax_strategy.ends_with("..."));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn reset_restores_a_fresh_session() {
        let mut session = session_at_persona_selection();
        session.select_persona(Persona::Business).unwrap();
        session
            .submit_followup(PersonaAnswers::Business {
                business_model: "Retail".to_string(),
            })
            .unwrap();
        session.reset();
        assert_eq!(session.step(), SessionStep::Welcome);
        assert!(session.profile().persona.is_none());
        assert!(session.profile().business_description.is_empty());
        assert!(session.recommendation().is_none());
        assert!(session.transcript().is_empty());

        // A fresh pass starts from an all-empty profile.
        session.begin().unwrap();
        session.submit_intake(&intake()).unwrap();
        assert_eq!(session.profile().shareholder_count, "2");
    }
}
