//! Recommendation requests and conversational field updates.

use std::sync::Arc;

use crate::error::RetrievalError;
use crate::profile::{CustomerProfile, Persona};
use crate::retrieval::QueryEngine;

use super::prompts::{build_query_context, question_context};

/// Retrieval breadth for Business-persona recommendation queries.
const BUSINESS_TOP_K: usize = 10;
/// Retrieval breadth for all other recommendation queries.
const STANDARD_TOP_K: usize = 8;
/// Retrieval breadth for general Q&A.
const QUESTION_TOP_K: usize = 5;

/// Submits rendered query contexts to the query engine.
///
/// Stateless besides the injected engine handle; every call re-renders and
/// re-submits the full context.
pub struct Requester {
    engine: Arc<dyn QueryEngine>,
}

impl Requester {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Render the recommendation context for a completed profile and submit
    /// it as one query. The engine's answer is returned verbatim.
    pub async fn activity_recommendations(
        &self,
        profile: &CustomerProfile,
    ) -> Result<String, RetrievalError> {
        let context = build_query_context(profile);
        let top_k = if profile.persona == Some(Persona::Business) {
            BUSINESS_TOP_K
        } else {
            STANDARD_TOP_K
        };
        tracing::info!(persona = ?profile.persona, top_k, "Requesting activity recommendations");
        let response = self.engine.query(&context, top_k).await?;
        Ok(response.text)
    }

    /// Answer a free-form question with the short customer-context header.
    pub async fn answer_question(
        &self,
        profile: &CustomerProfile,
        question: &str,
    ) -> Result<String, RetrievalError> {
        let context = question_context(profile, question);
        let response = self.engine.query(&context, QUESTION_TOP_K).await?;
        Ok(response.text)
    }
}

/// Apply a conversational field update to the profile.
///
/// Case-insensitive keyword rules checked in fixed order, first match wins.
/// The shareholder and visa rules need a digit token in the input; without
/// one they fall through to the later rules. Returns false when no rule
/// applies, signalling the caller to treat the input as a question.
pub fn update_field(profile: &mut CustomerProfile, input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("shareholder") {
        if let Some(count) = first_digit_token(input) {
            tracing::debug!(count = %count, "Updated shareholder count from chat");
            profile.shareholder_count = count;
            return true;
        }
    }

    if lower.contains("visa") {
        if let Some(count) = first_digit_token(input) {
            tracing::debug!(count = %count, "Updated visa count from chat");
            profile.visas_needed = count;
            return true;
        }
    }

    if lower.contains("business") || lower.contains("activity") {
        profile.business_description = input.to_string();
        return true;
    }

    if lower.contains("nationality") || lower.contains("passport") {
        profile.nationalities = input.to_string();
        return true;
    }

    if lower.contains("timeline") {
        profile.timeline = input.to_string();
        return true;
    }

    false
}

fn first_digit_token(input: &str) -> Option<String> {
    input
        .split_whitespace()
        .find(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}
