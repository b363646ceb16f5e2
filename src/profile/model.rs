//! Customer profile and persona data models.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use super::classify::concise_summary;

/// Customer archetype selected once per session.
///
/// The persona decides which follow-up questions are asked and which
/// prioritization weights are described to the query engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Residential,
    Business,
    Finance,
}

impl std::fmt::Display for Persona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Residential => "Residential",
            Self::Business => "Business",
            Self::Finance => "Finance",
        };
        write!(f, "{s}")
    }
}

/// Persona-specific follow-up answers, keyed by the persona tag so a
/// session can never carry another persona's fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "persona", rename_all = "snake_case")]
pub enum PersonaAnswers {
    Residential {
        dependents: String,
        residency_plan: String,
    },
    Business {
        business_model: String,
    },
    Finance {
        invoicing: String,
        bank_purpose: String,
        tax_strategy: String,
    },
}

impl PersonaAnswers {
    /// The persona these answers belong to.
    pub fn persona(&self) -> Persona {
        match self {
            Self::Residential { .. } => Persona::Residential,
            Self::Business { .. } => Persona::Business,
            Self::Finance { .. } => Persona::Finance,
        }
    }

    /// Field names and raw values, in question order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Residential {
                dependents,
                residency_plan,
            } => vec![
                ("dependents", dependents.as_str()),
                ("residency_plan", residency_plan.as_str()),
            ],
            Self::Business { business_model } => {
                vec![("business_model", business_model.as_str())]
            }
            Self::Finance {
                invoicing,
                bank_purpose,
                tax_strategy,
            } => vec![
                ("invoicing", invoicing.as_str()),
                ("bank_purpose", bank_purpose.as_str()),
                ("tax_strategy", tax_strategy.as_str()),
            ],
        }
    }

    /// Copy with every answer bounded by the per-field word limit
    /// (20 words for the business model, 15 for everything else).
    pub fn truncated(&self) -> Self {
        match self {
            Self::Residential {
                dependents,
                residency_plan,
            } => Self::Residential {
                dependents: concise_summary(dependents, 15),
                residency_plan: concise_summary(residency_plan, 15),
            },
            Self::Business { business_model } => Self::Business {
                business_model: concise_summary(business_model, 20),
            },
            Self::Finance {
                invoicing,
                bank_purpose,
                tax_strategy,
            } => Self::Finance {
                invoicing: concise_summary(invoicing, 15),
                bank_purpose: concise_summary(bank_purpose, 15),
                tax_strategy: concise_summary(tax_strategy, 15),
            },
        }
    }

    /// Display labels and values for summary tables and exports.
    pub fn summary_rows(&self) -> Vec<(&'static str, &str)> {
        match self {
            Self::Residential {
                dependents,
                residency_plan,
            } => vec![
                ("Dependents", dependents.as_str()),
                ("Residency Plan", residency_plan.as_str()),
            ],
            Self::Business { business_model } => {
                vec![("Business Model Details", business_model.as_str())]
            }
            Self::Finance {
                invoicing,
                bank_purpose,
                tax_strategy,
            } => vec![
                ("Invoicing Method", invoicing.as_str()),
                ("Bank Account Purpose", bank_purpose.as_str()),
                ("Tax Strategy", tax_strategy.as_str()),
            ],
        }
    }
}

/// Experience classification: new venture vs. branch of an existing one.
///
/// Keyword classification is fuzzy; unrecognized answers are carried
/// verbatim rather than forced into a bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Experience {
    New,
    Branch,
    Unclassified(String),
}

impl std::fmt::Display for Experience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::New => write!(f, "New"),
            Self::Branch => write!(f, "Branch"),
            Self::Unclassified(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for Experience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Experience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "New" => Self::New,
            "Branch" => Self::Branch,
            _ => Self::Unclassified(raw),
        })
    }
}

impl Default for Experience {
    fn default() -> Self {
        Self::Unclassified(String::new())
    }
}

/// Flexibility classification: open to alternatives vs. fixed on a plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flexibility {
    Flexible,
    NotFlexible,
    Unclassified(String),
}

impl std::fmt::Display for Flexibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Flexible => write!(f, "Flexible"),
            Self::NotFlexible => write!(f, "Not Flexible"),
            Self::Unclassified(raw) => write!(f, "{raw}"),
        }
    }
}

impl Serialize for Flexibility {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Flexibility {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.as_str() {
            "Flexible" => Self::Flexible,
            "Not Flexible" => Self::NotFlexible,
            _ => Self::Unclassified(raw),
        })
    }
}

impl Default for Flexibility {
    fn default() -> Self {
        Self::Unclassified(String::new())
    }
}

/// Everything the wizard collects about one prospective customer.
///
/// One mutable record per session; populated monotonically through the
/// wizard steps and discarded on reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CustomerProfile {
    /// First whitespace token of the shareholder answer if all digits,
    /// otherwise the literal "Not specified".
    pub shareholder_count: String,
    /// The full shareholder answer verbatim; the query engine parses the
    /// nationalities out of it.
    pub nationalities: String,
    pub visas_needed: String,
    /// Append-only for the Business persona: the follow-up answer is joined
    /// with " | " onto the intake answer.
    pub business_description: String,
    pub experience: Experience,
    pub flexibility: Flexibility,
    pub purpose: String,
    pub timeline: String,
    /// Set exactly once per session, before any follow-up answers.
    pub persona: Option<Persona>,
    pub persona_answers: Option<PersonaAnswers>,
}

impl CustomerProfile {
    /// Display labels and values for the main profile table, in the order
    /// the summary screens show them.
    pub fn summary_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Number of Shareholders", self.shareholder_count.clone()),
            ("Nationalities", self.nationalities.clone()),
            ("Number of Visas", self.visas_needed.clone()),
            ("Business Description", self.business_description.clone()),
            ("Branch or New", self.experience.to_string()),
            ("Business Flexibility", self.flexibility.to_string()),
            ("Purpose of Establishing", self.purpose.clone()),
            ("Timeline", self.timeline.clone()),
            (
                "Persona",
                self.persona.map(|p| p.to_string()).unwrap_or_default(),
            ),
        ]
    }

    /// Plain-text dump of the full profile, used by the export download.
    pub fn report(&self) -> String {
        let mut lines: Vec<String> = self
            .summary_rows()
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect();
        if let Some(ref answers) = self.persona_answers {
            for (label, value) in answers.summary_rows() {
                lines.push(format!("{label}: {value}"));
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persona_display_and_serde() {
        let personas = [Persona::Residential, Persona::Business, Persona::Finance];
        let tags = ["\"residential\"", "\"business\"", "\"finance\""];
        for (persona, tag) in personas.into_iter().zip(tags) {
            assert_eq!(serde_json::to_string(&persona).unwrap(), tag);
        }
        assert_eq!(Persona::Finance.to_string(), "Finance");
    }

    #[test]
    fn persona_answers_match_their_persona() {
        let answers = PersonaAnswers::Finance {
            invoicing: "Monthly invoices".to_string(),
            bank_purpose: "Receive global payments".to_string(),
            tax_strategy: "Zero corporate tax".to_string(),
        };
        assert_eq!(answers.persona(), Persona::Finance);
        assert_eq!(answers.fields().len(), 3);
    }

    #[test]
    fn persona_answers_serde_tagging() {
        let answers = PersonaAnswers::Residential {
            dependents: "Spouse and two children".to_string(),
            residency_plan: "Full-time residence".to_string(),
        };
        let json = serde_json::to_string(&answers).unwrap();
        assert!(json.contains("\"persona\":\"residential\""));
        let parsed: PersonaAnswers = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, answers);
    }

    #[test]
    fn truncation_bounds_every_field() {
        let long = "one two three four five six seven eight nine ten eleven twelve thirteen \
                    fourteen fifteen sixteen seventeen eighteen";
        let answers = PersonaAnswers::Residential {
            dependents: long.to_string(),
            residency_plan: "short".to_string(),
        };
        match answers.truncated() {
            PersonaAnswers::Residential {
                dependents,
                residency_plan,
            } => {
                assert!(dependents.ends_with("..."));
                assert_eq!(dependents.split_whitespace().count(), 15);
                assert_eq!(residency_plan, "short");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn business_model_allows_twenty_words() {
        let nineteen = vec!["w"; 19].join(" ");
        let answers = PersonaAnswers::Business {
            business_model: nineteen.clone(),
        };
        match answers.truncated() {
            PersonaAnswers::Business { business_model } => {
                assert_eq!(business_model, nineteen);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn experience_serializes_as_display_string() {
        assert_eq!(
            serde_json::to_string(&Experience::New).unwrap(),
            "\"New\""
        );
        let fallback = Experience::Unclassified("we sell furniture".to_string());
        let json = serde_json::to_string(&fallback).unwrap();
        assert_eq!(json, "\"we sell furniture\"");
        let parsed: Experience = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, fallback);
    }

    #[test]
    fn flexibility_roundtrip_preserves_variants() {
        for flex in [
            Flexibility::Flexible,
            Flexibility::NotFlexible,
            Flexibility::Unclassified("maybe later".to_string()),
        ] {
            let json = serde_json::to_string(&flex).unwrap();
            let parsed: Flexibility = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, flex);
        }
    }

    #[test]
    fn default_profile_is_empty() {
        let profile = CustomerProfile::default();
        assert!(profile.shareholder_count.is_empty());
        assert!(profile.nationalities.is_empty());
        assert!(profile.business_description.is_empty());
        assert!(profile.persona.is_none());
        assert!(profile.persona_answers.is_none());
        assert_eq!(profile.experience.to_string(), "");
    }

    #[test]
    fn report_includes_persona_details() {
        let profile = CustomerProfile {
            shareholder_count: "2".to_string(),
            nationalities: "2 shareholders, Indian and German passports".to_string(),
            visas_needed: "3".to_string(),
            business_description: "IT consultancy".to_string(),
            experience: Experience::New,
            flexibility: Flexibility::Flexible,
            purpose: "Tax efficiency".to_string(),
            timeline: "Next month".to_string(),
            persona: Some(Persona::Finance),
            persona_answers: Some(PersonaAnswers::Finance {
                invoicing: "Stripe".to_string(),
                bank_purpose: "Global payments".to_string(),
                tax_strategy: "Free zone exemption".to_string(),
            }),
        };
        let report = profile.report();
        assert!(report.contains("Number of Shareholders: 2"));
        assert!(report.contains("Branch or New: New"));
        assert!(report.contains("Persona: Finance"));
        assert!(report.contains("Invoicing Method: Stripe"));
        assert!(report.contains("Tax Strategy: Free zone exemption"));
    }
}
