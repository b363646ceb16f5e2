//! Fixed intake and follow-up question text.

use serde::{Deserialize, Serialize};

use crate::profile::Persona;

/// The seven intake questions, asked in order.
pub const INITIAL_QUESTIONS: [&str; 7] = [
    "What are the number of shareholders and what passport holders are they?",
    "How many visas do you want with this company?",
    "What business do you want to do?",
    "Have you been doing this business or is it a new venture?",
    "Are you open to do something else also or stick to your business plan?",
    "What is your primary purpose in establishing a company in UAE - Dubai?",
    "How soon are you planning to set up the company?",
];

/// Follow-up questions for a persona, in the order they are asked.
pub fn followup_questions(persona: Persona) -> &'static [&'static str] {
    match persona {
        Persona::Residential => &[
            "Do you wish to get any dependents (family)?",
            "Do you plan to reside in UAE, or will you be travelling frequently?",
        ],
        Persona::Business => {
            &["What detailed activities do you want to start and what is your business model?"]
        }
        Persona::Finance => &[
            "How will you invoice your clients and take payments?",
            "Are you just planning to open a bank account to receive global payments?",
            "How do you plan to get tax benefits?",
        ],
    }
}

/// The seven free-text intake answers, one per question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeAnswers {
    /// Answer 1: shareholder count and passports, parsed into two fields.
    pub shareholders: String,
    pub visas: String,
    pub business: String,
    pub experience: String,
    pub flexibility: String,
    pub purpose: String,
    pub timeline: String,
}

impl IntakeAnswers {
    /// Field names and values in question order, for validation.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("shareholders", self.shareholders.as_str()),
            ("visas", self.visas.as_str()),
            ("business", self.business.as_str()),
            ("experience", self.experience.as_str()),
            ("flexibility", self.flexibility.as_str()),
            ("purpose", self.purpose.as_str()),
            ("timeline", self.timeline.as_str()),
        ]
    }
}
