//! Wizard state machine — tracks which step a session is in.

use serde::{Deserialize, Serialize};

use crate::profile::Persona;

/// The steps of an intake session.
///
/// Progresses linearly: Welcome → InitialQuestions → PersonaSelection →
/// PersonaFollowup → Requesting → Results. The two non-linear edges are
/// internal: a failed generation drops from Requesting back to
/// PersonaFollowup, and a regenerate re-enters Requesting from Results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "persona", rename_all = "snake_case")]
pub enum SessionStep {
    Welcome,
    InitialQuestions,
    PersonaSelection,
    PersonaFollowup(Persona),
    Requesting,
    Results,
}

impl SessionStep {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: SessionStep) -> bool {
        use SessionStep::*;
        matches!(
            (self, target),
            (Welcome, InitialQuestions)
                | (InitialQuestions, PersonaSelection)
                | (PersonaSelection, PersonaFollowup(_))
                | (PersonaFollowup(_), Requesting)
                | (Requesting, Results)
                | (Requesting, PersonaFollowup(_))
                | (Results, Requesting)
        )
    }

    /// Whether this step is the terminal steady state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Results)
    }
}

impl std::fmt::Display for SessionStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::InitialQuestions => "initial_questions",
            Self::PersonaSelection => "persona_selection",
            Self::PersonaFollowup(_) => "persona_followup",
            Self::Requesting => "requesting",
            Self::Results => "results",
        };
        write!(f, "{s}")
    }
}

impl Default for SessionStep {
    fn default() -> Self {
        Self::Welcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_transitions() {
        use SessionStep::*;
        let transitions = [
            (Welcome, InitialQuestions),
            (InitialQuestions, PersonaSelection),
            (PersonaSelection, PersonaFollowup(Persona::Business)),
            (PersonaFollowup(Persona::Business), Requesting),
            (Requesting, Results),
        ];
        for (from, to) in transitions {
            assert!(from.can_transition_to(to), "{from} should transition to {to}");
        }
    }

    #[test]
    fn failure_and_regenerate_edges() {
        use SessionStep::*;
        assert!(Requesting.can_transition_to(PersonaFollowup(Persona::Finance)));
        assert!(Results.can_transition_to(Requesting));
    }

    #[test]
    fn invalid_transitions() {
        use SessionStep::*;
        // Skip steps
        assert!(!Welcome.can_transition_to(PersonaSelection));
        assert!(!InitialQuestions.can_transition_to(Requesting));
        // Go backward
        assert!(!PersonaSelection.can_transition_to(InitialQuestions));
        assert!(!Results.can_transition_to(Welcome));
        // Self-transition
        assert!(!Results.can_transition_to(Results));
    }

    #[test]
    fn is_terminal() {
        use SessionStep::*;
        assert!(Results.is_terminal());
        assert!(!Welcome.is_terminal());
        assert!(!Requesting.is_terminal());
    }

    #[test]
    fn serde_carries_the_followup_persona() {
        let step = SessionStep::PersonaFollowup(Persona::Finance);
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains("\"step\":\"persona_followup\""));
        assert!(json.contains("\"persona\":\"finance\""));
        let parsed: SessionStep = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, step);
    }
}
