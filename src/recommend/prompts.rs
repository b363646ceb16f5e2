//! Query-context synthesis.
//!
//! The query engine does all matching and ranking; these functions render
//! the instructions it ranks under. Everything here is pure string
//! templating: the same profile always renders the same bytes.

use crate::profile::{CustomerProfile, Persona, PersonaAnswers};

/// Build the full recommendation query context for a completed profile.
///
/// Fixed section order: profile header, persona weighting block,
/// chain-of-thought instructions, output format, critical rules.
pub fn build_query_context(profile: &CustomerProfile) -> String {
    let mut context = profile_header(profile);
    context.push_str(&persona_block(profile));
    context.push_str(&reasoning_block(profile.persona));
    context.push_str(DELIVERABLE_BLOCK);
    context.push_str(CRITICAL_RULES);
    context
}

/// Wrap a free-form follow-up question with the short customer context
/// header used for general Q&A after results.
pub fn question_context(profile: &CustomerProfile, question: &str) -> String {
    format!(
        "Customer context:\n\
         - Persona: {persona}\n\
         - Business: {business}\n\
         - Nationalities: {nationalities}\n\
         \n\
         Question: {question}\n\
         \n\
         Provide a clear, helpful answer based on the knowledge sources (Business Activities \
         Database, Activity Hubs, and the expert knowledge base).\n\
         Be consultative and honest.\n",
        persona = persona_label(profile),
        business = profile.business_description,
        nationalities = profile.nationalities,
    )
}

fn persona_label(profile: &CustomerProfile) -> String {
    profile
        .persona
        .map(|p| p.to_string())
        .unwrap_or_else(|| "Not specified".to_string())
}

fn profile_header(profile: &CustomerProfile) -> String {
    format!(
        "CUSTOMER PROFILE ANALYSIS:\n\
         \n\
         Persona Type: {persona}\n\
         Number of Shareholders: {shareholders}\n\
         Nationalities: {nationalities}\n\
         Visas Needed: {visas}\n\
         Business Description: {business}\n\
         Experience Level: {experience}\n\
         Business Flexibility: {flexibility}\n\
         Primary Purpose: {purpose}\n\
         Timeline: {timeline}\n",
        persona = persona_label(profile),
        shareholders = profile.shareholder_count,
        nationalities = profile.nationalities,
        visas = profile.visas_needed,
        business = profile.business_description,
        experience = profile.experience,
        flexibility = profile.flexibility,
        purpose = profile.purpose,
        timeline = profile.timeline,
    )
}

/// Persona-specific weighting and context section.
///
/// Answers render as "N/A" if the follow-up step was somehow skipped; the
/// wizard never produces that state, but the renderer stays total.
fn persona_block(profile: &CustomerProfile) -> String {
    let answers = profile.persona_answers.as_ref();
    match profile.persona {
        Some(Persona::Residential) => {
            let (dependents, residency_plan) = match answers {
                Some(PersonaAnswers::Residential {
                    dependents,
                    residency_plan,
                }) => (dependents.as_str(), residency_plan.as_str()),
                _ => ("N/A", "N/A"),
            };
            format!(
                "\nRESIDENTIAL PERSONA CONTEXT:\n\
                 - Dependents: {dependents}\n\
                 - Residency Plan: {residency_plan}\n\
                 \n\
                 PRIORITIZATION FOR THIS PERSONA:\n\
                 Apply weights: Risk (50%) + Correlation (50%)\n\
                 Accept 80%+ correlation if it means Low risk and N/A approval\n"
            )
        }
        Some(Persona::Business) => {
            let business_model = match answers {
                Some(PersonaAnswers::Business { business_model }) => business_model.as_str(),
                _ => "N/A",
            };
            format!(
                "\nBUSINESS PERSONA CONTEXT:\n\
                 - Detailed Business Model: {business_model}\n\
                 \n\
                 PRIORITIZATION FOR THIS PERSONA:\n\
                 Apply weights: Correlation (85%) + Risk (15%)\n\
                 STRICT REQUIREMENT: Minimum 90% correlation with business description\n\
                 This is a genuine entrepreneur - exact activity match is critical\n"
            )
        }
        Some(Persona::Finance) => {
            let (invoicing, bank_purpose, tax_strategy) = match answers {
                Some(PersonaAnswers::Finance {
                    invoicing,
                    bank_purpose,
                    tax_strategy,
                }) => (
                    invoicing.as_str(),
                    bank_purpose.as_str(),
                    tax_strategy.as_str(),
                ),
                _ => ("N/A", "N/A", "N/A"),
            };
            format!(
                "\nFINANCE PERSONA CONTEXT:\n\
                 - Invoicing Method: {invoicing}\n\
                 - Bank Account Purpose: {bank_purpose}\n\
                 - Tax Strategy: {tax_strategy}\n\
                 \n\
                 CRITICAL: Check Country Risk Rating first for nationalities: {nationalities}\n\
                 IF any nationality has \"Override\" rating → Stop and respond \"Cannot issue license due to country risk rating\"\n\
                 IF acceptable ratings → Calculate bank account opening probability using the nationality + activity risk matrix:\n\
                 * High Nationality + High Activity = <30% success\n\
                 * High Nationality + Low Activity = <50% success\n\
                 * Low Nationality + Low Activity = >80% success\n\
                 * Low Nationality + High Activity = 60% success\n\
                 * Compute proportionally for Medium ratings\n\
                 Apply standard prioritization after the country risk check passes\n",
                nationalities = profile.nationalities,
            )
        }
        None => String::new(),
    }
}

/// The eight-step reasoning block. Identical across personas except the
/// correlation threshold, which appears exactly once.
fn reasoning_block(persona: Option<Persona>) -> String {
    let threshold = match persona {
        Some(Persona::Business) => "90%",
        _ => "80%",
    };
    format!(
        "\nCHAIN-OF-THOUGHT ANALYSIS REQUIRED:\n\
         1. Analyze the business description and identify core activities\n\
         2. Search Activity Hubs for popular activity matches (e-commerce, general trading, consultancy, IT, advertising, etc.)\n\
         3. Search the Business Activities Database for all possible matches using keywords and synonyms\n\
         4. Apply persona-specific prioritization weights\n\
         5. For each candidate activity, evaluate:\n\
         \x20  - Semantic correlation strength (minimum {threshold})\n\
         \x20  - Risk rating (Low preferred, High only when necessary)\n\
         \x20  - Group optimization (fewer groups better)\n\
         6. Consider strategic insights from the expert knowledge base (avoid general trading, flag concerns, suggest specific alternatives)\n\
         7. Consider complementary activities within the 3-group package\n\
         8. Assess banking implications (especially for Finance persona)\n"
    )
}

const DELIVERABLE_BLOCK: &str = "\nDELIVERABLE:\n\
Provide exactly 2 ranked activity recommendations following the format:\n\
\n\
RECOMMENDATION 1: [Primary Recommendation]\n\
Group: [3-digit code]\n\
Activity Code: [6-digit format like 1811.04]\n\
Activity Name: [Full name]\n\
Category: [e.g., Manufacturing, Trading, Professional]\n\
Full Description: [Full description from database]\n\
Third Party Approval: [Yes/No] [Authority name if yes, e.g., \"Dubai Municipality (DM)\"]\n\
When: [PRE/POST/N/A]\n\
Risk Rating: [Low/Medium/High]\n\
Industry Risk: [Yes/No/N/A]\n\
Match Explanation: [2-3 sentences explaining why this fits customer needs with persona logic applied]\n\
Related Activities:\n\
\x20 - [Code]: [Name] - [1-line description]\n\
\x20 - [Code]: [Name] - [1-line description]\n\
Expert Insights: [Strategic guidance from the expert knowledge base if available]\n\
\n\
RECOMMENDATION 2: [Secondary Recommendation]\n\
Group: [3-digit code]\n\
Activity Code: [6-digit format like 1811.04]\n\
Activity Name: [Full name]\n\
Category: [e.g., Manufacturing, Trading, Professional]\n\
Full Description: [Full description from database]\n\
Third Party Approval: [Yes/No] [Authority name if yes, e.g., \"Dubai Municipality (DM)\"]\n\
When: [PRE/POST/N/A]\n\
Risk Rating: [Low/Medium/High]\n\
Industry Risk: [Yes/No/N/A]\n\
Match Explanation: [2-3 sentences explaining why this fits customer needs with persona logic applied]\n\
Related Activities:\n\
\x20 - [Code]: [Name] - [1-line description]\n\
\x20 - [Code]: [Name] - [1-line description]\n\
Expert Insights: [Strategic guidance from the expert knowledge base if available]\n";

const CRITICAL_RULES: &str = "\nCRITICAL RULES:\n\
1. For Business persona: Never compromise on correlation - must be 90%+ match\n\
2. For Residential persona: Prefer N/A approvals and Low risk even if correlation is 80%+\n\
3. For Finance persona: Check nationality risk first - if Override, immediately respond \"Cannot issue license due to country risk rating\"\n\
4. Always suggest fewer activity groups when possible\n\
5. Flag general trading concerns and suggest specific alternatives from the expert knowledge base\n\
6. Explain any approval delays or banking complications transparently\n\
\n\
Be precise, strategic, and consultative. Ensure recommendations maximize customer success while adhering to regulations.\n";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Experience, Flexibility};

    fn profile_with(persona: Persona, answers: PersonaAnswers) -> CustomerProfile {
        CustomerProfile {
            shareholder_count: "2".to_string(),
            nationalities: "2 shareholders, Indian and German passports".to_string(),
            visas_needed: "3".to_string(),
            business_description: "Online furniture retail".to_string(),
            experience: Experience::New,
            flexibility: Flexibility::Flexible,
            purpose: "Market access".to_string(),
            timeline: "Two months".to_string(),
            persona: Some(persona),
            persona_answers: Some(answers),
        }
    }

    fn business_profile() -> CustomerProfile {
        profile_with(
            Persona::Business,
            PersonaAnswers::Business {
                business_model: "B2C e-commerce".to_string(),
            },
        )
    }

    fn reasoning_section(context: &str) -> &str {
        let start = context
            .find("CHAIN-OF-THOUGHT")
            .expect("reasoning block present");
        let end = context.find("DELIVERABLE").expect("deliverable block present");
        &context[start..end]
    }

    #[test]
    fn context_is_deterministic() {
        let profile = business_profile();
        assert_eq!(build_query_context(&profile), build_query_context(&profile));
    }

    #[test]
    fn header_lists_every_profile_field() {
        let context = build_query_context(&business_profile());
        assert!(context.starts_with("CUSTOMER PROFILE ANALYSIS:"));
        assert!(context.contains("Persona Type: Business"));
        assert!(context.contains("Number of Shareholders: 2"));
        assert!(context.contains("Nationalities: 2 shareholders, Indian and German passports"));
        assert!(context.contains("Visas Needed: 3"));
        assert!(context.contains("Business Description: Online furniture retail"));
        assert!(context.contains("Experience Level: New"));
        assert!(context.contains("Business Flexibility: Flexible"));
        assert!(context.contains("Primary Purpose: Market access"));
        assert!(context.contains("Timeline: Two months"));
    }

    #[test]
    fn section_order_is_fixed() {
        let context = build_query_context(&business_profile());
        let header = context.find("CUSTOMER PROFILE ANALYSIS").unwrap();
        let persona = context.find("BUSINESS PERSONA CONTEXT").unwrap();
        let reasoning = context.find("CHAIN-OF-THOUGHT").unwrap();
        let deliverable = context.find("DELIVERABLE").unwrap();
        let rules = context.find("CRITICAL RULES").unwrap();
        assert!(header < persona && persona < reasoning);
        assert!(reasoning < deliverable && deliverable < rules);
    }

    #[test]
    fn business_threshold_appears_once_in_reasoning() {
        let context = build_query_context(&business_profile());
        let reasoning = reasoning_section(&context);
        assert_eq!(reasoning.matches("90%").count(), 1);
        assert_eq!(reasoning.matches("80%").count(), 0);
    }

    #[test]
    fn residential_and_finance_threshold_is_eighty() {
        for (persona, answers) in [
            (
                Persona::Residential,
                PersonaAnswers::Residential {
                    dependents: "Spouse".to_string(),
                    residency_plan: "Full-time".to_string(),
                },
            ),
            (
                Persona::Finance,
                PersonaAnswers::Finance {
                    invoicing: "Stripe".to_string(),
                    bank_purpose: "Global payments".to_string(),
                    tax_strategy: "Exemption".to_string(),
                },
            ),
        ] {
            let context = build_query_context(&profile_with(persona, answers));
            let reasoning = reasoning_section(&context);
            assert_eq!(reasoning.matches("80%").count(), 1, "{persona}");
            assert_eq!(reasoning.matches("90%").count(), 0, "{persona}");
        }
    }

    #[test]
    fn business_block_carries_weights_and_model() {
        let context = build_query_context(&business_profile());
        assert!(context.contains("Apply weights: Correlation (85%) + Risk (15%)"));
        assert!(context.contains("- Detailed Business Model: B2C e-commerce"));
        assert!(context.contains("Minimum 90% correlation"));
    }

    #[test]
    fn residential_block_carries_weights_and_answers() {
        let context = build_query_context(&profile_with(
            Persona::Residential,
            PersonaAnswers::Residential {
                dependents: "Spouse and child".to_string(),
                residency_plan: "Travelling frequently".to_string(),
            },
        ));
        assert!(context.contains("Apply weights: Risk (50%) + Correlation (50%)"));
        assert!(context.contains("- Dependents: Spouse and child"));
        assert!(context.contains("- Residency Plan: Travelling frequently"));
    }

    #[test]
    fn finance_block_has_override_and_matrix() {
        let context = build_query_context(&profile_with(
            Persona::Finance,
            PersonaAnswers::Finance {
                invoicing: "Monthly invoices".to_string(),
                bank_purpose: "Receive global payments".to_string(),
                tax_strategy: "Zero-rate".to_string(),
            },
        ));
        assert!(context.contains("Check Country Risk Rating first for nationalities:"));
        assert!(context.contains("Cannot issue license due to country risk rating"));
        assert!(context.contains("High Nationality + High Activity = <30% success"));
        assert!(context.contains("Low Nationality + Low Activity = >80% success"));
        assert!(context.contains("Compute proportionally for Medium ratings"));
    }

    #[test]
    fn deliverable_demands_exactly_two_recommendations() {
        let context = build_query_context(&business_profile());
        assert!(context.contains("Provide exactly 2 ranked activity recommendations"));
        assert!(context.contains("RECOMMENDATION 1: [Primary Recommendation]"));
        assert!(context.contains("RECOMMENDATION 2: [Secondary Recommendation]"));
        assert!(!context.contains("RECOMMENDATION 3"));
        for label in [
            "Group:",
            "Activity Code:",
            "Activity Name:",
            "Category:",
            "Full Description:",
            "Third Party Approval:",
            "When: [PRE/POST/N/A]",
            "Risk Rating: [Low/Medium/High]",
            "Industry Risk: [Yes/No/N/A]",
            "Match Explanation:",
            "Related Activities:",
            "Expert Insights:",
        ] {
            assert!(context.contains(label), "missing {label}");
        }
    }

    #[test]
    fn critical_rules_present_for_every_persona() {
        let context = build_query_context(&business_profile());
        assert!(context.contains("CRITICAL RULES:"));
        assert!(context.contains("Never compromise on correlation - must be 90%+ match"));
        assert!(context.contains("Always suggest fewer activity groups when possible"));
        assert!(context.contains("Flag general trading concerns"));
    }

    #[test]
    fn question_context_wraps_customer_state() {
        let profile = business_profile();
        let context = question_context(&profile, "Can I add a second activity later?");
        assert!(context.contains("- Persona: Business"));
        assert!(context.contains("- Business: Online furniture retail"));
        assert!(context.contains("- Nationalities: 2 shareholders, Indian and German passports"));
        assert!(context.contains("Question: Can I add a second activity later?"));
    }
}
