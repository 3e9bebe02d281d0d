//! Follow-up question generation.
//!
//! One model call asking for a JSON array of exactly 3 questions; any failure
//! (call error, non-array payload) falls back to a static table keyed by
//! specialist. Never fails outward, never returns more than 3 items.

use serde::Serialize;
use tracing::warn;

use crate::agents::prompts::FOLLOW_UP_PROMPT_TEMPLATE;
use crate::agents::registry::SpecialistKey;
use crate::agents::specialist::truncate_chars;
use crate::llm_client::{complete_json, ChatMessage, ModelBackend};

/// Only this much of the answer is fed back into the follow-up prompt.
const ANSWER_EXCERPT_CHARS: usize = 400;
const MAX_FOLLOW_UPS: usize = 3;

/// Suggested next questions, tagged with whether the static fallback was used.
#[derive(Debug, Clone, Serialize)]
pub struct FollowUps {
    pub questions: Vec<String>,
    pub generic: bool,
}

/// Generates up to 3 follow-up questions for an answered interview question.
pub async fn generate_follow_ups(
    backend: &dyn ModelBackend,
    question: &str,
    answer: &str,
    specialist: SpecialistKey,
) -> FollowUps {
    let prompt = FOLLOW_UP_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{answer_excerpt}", truncate_chars(answer, ANSWER_EXCERPT_CHARS))
        .replace("{specialist}", specialist.as_str());

    match complete_json::<Vec<String>>(backend, &[ChatMessage::user(prompt)]).await {
        Ok(mut questions) => {
            questions.truncate(MAX_FOLLOW_UPS);
            FollowUps {
                questions,
                generic: false,
            }
        }
        Err(e) => {
            warn!("Follow-up generation failed for {specialist}: {e}");
            FollowUps {
                questions: generic_follow_ups(specialist)
                    .iter()
                    .map(|q| q.to_string())
                    .collect(),
                generic: true,
            }
        }
    }
}

/// Static fallback triplets, one per specialist.
fn generic_follow_ups(specialist: SpecialistKey) -> [&'static str; 3] {
    match specialist {
        SpecialistKey::ProductManager => [
            "How would you measure the success of this approach?",
            "What trade-offs would you consider?",
            "How would you prioritize if resources were limited?",
        ],
        SpecialistKey::Technical => [
            "Can you explain the time complexity?",
            "How would you handle edge cases?",
            "What are alternative approaches?",
        ],
        SpecialistKey::Architect => [
            "How would you scale this to millions of users?",
            "What failure scenarios should we consider?",
            "What are the cost implications?",
        ],
        SpecialistKey::Coding => [
            "How would you test this code?",
            "What edge cases need to be handled?",
            "How could this be optimized?",
        ],
        SpecialistKey::Behavioral => [
            "What did you learn from this experience?",
            "How would you handle it differently now?",
            "What was the biggest challenge?",
        ],
        SpecialistKey::SystemDesign => [
            "How would you handle data consistency?",
            "What caching strategy would you use?",
            "How would you monitor this system?",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_parses_model_follow_ups() {
        let backend =
            ScriptedBackend::replying(&[r#"["How do you shard?", "Why Kafka?", "What breaks first?"]"#]);

        let result =
            generate_follow_ups(&backend, "Design a feed", "answer", SpecialistKey::SystemDesign)
                .await;
        assert_eq!(result.questions.len(), 3);
        assert!(!result.generic);
    }

    #[tokio::test]
    async fn test_truncates_to_three_questions() {
        let backend = ScriptedBackend::replying(&[r#"["a", "b", "c", "d", "e"]"#]);

        let result = generate_follow_ups(&backend, "q", "a", SpecialistKey::Technical).await;
        assert_eq!(result.questions, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_non_array_payload_falls_back_to_table() {
        let backend = ScriptedBackend::replying(&[r#"{"questions": ["a"]}"#]);

        let result = generate_follow_ups(&backend, "q", "a", SpecialistKey::Behavioral).await;
        assert!(result.generic);
        assert_eq!(result.questions.len(), 3);
        assert_eq!(result.questions[0], "What did you learn from this experience?");
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_to_table() {
        let backend = ScriptedBackend::failing("timeout");

        let result = generate_follow_ups(&backend, "q", "a", SpecialistKey::Coding).await;
        assert!(result.generic);
        assert_eq!(result.questions.len(), 3);
    }

    #[test]
    fn test_every_specialist_has_a_triplet() {
        for key in SpecialistKey::ALL {
            assert_eq!(generic_follow_ups(key).len(), 3);
        }
    }
}
