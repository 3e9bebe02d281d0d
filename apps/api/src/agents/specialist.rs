//! Specialist answer generation.
//!
//! Every specialist shares this control flow and differs only in profile
//! data — there is no per-variant branching. Confidence is a deterministic
//! function of answer length, not model-reported.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::registry::{SpecialistKey, SpecialistProfile};
use crate::llm_client::{ChatMessage, ModelBackend};

/// How many prior turns are folded into the prompt.
const HISTORY_WINDOW: usize = 3;
/// Stored answers are truncated to this many characters in the prompt.
const HISTORY_ANSWER_CHARS: usize = 200;

/// One prior Q&A exchange, supplied by the caller. Never persisted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryTurn {
    pub question: String,
    pub answer: String,
}

/// Shape metadata derived from the generated answer text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerMetadata {
    pub word_count: usize,
    pub character_count: usize,
    pub has_examples: bool,
    pub has_structure: bool,
}

/// The outcome of one specialist invocation. `error` is the tagged-outcome
/// marker: when set, `answer` holds a human-readable error string and
/// `confidence` is 0.0.
#[derive(Debug, Clone, Serialize)]
pub struct SpecialistAnswer {
    pub answer: String,
    pub specialist: SpecialistKey,
    pub confidence: f32,
    pub metadata: AnswerMetadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SpecialistProfile {
    /// Answers an interview question in this specialist's persona.
    ///
    /// Never fails outward: a model-call failure yields an error-string
    /// answer with confidence 0.0 and the `error` marker set.
    pub async fn process(
        &self,
        backend: &dyn ModelBackend,
        question: &str,
        context: Option<&str>,
        history: &[HistoryTurn],
    ) -> SpecialistAnswer {
        let user_prompt = build_user_prompt(question, context, &condense_history(history));
        let messages = [
            ChatMessage::system(self.persona),
            ChatMessage::user(user_prompt),
        ];

        match backend.complete(&messages).await {
            Ok(answer) => {
                let metadata = extract_metadata(&answer);
                SpecialistAnswer {
                    confidence: confidence_for(&answer),
                    metadata,
                    answer,
                    specialist: self.key,
                    error: None,
                }
            }
            Err(e) => {
                warn!("Specialist {} model call failed: {e}", self.key);
                SpecialistAnswer {
                    answer: format!("Error generating response: {e}"),
                    specialist: self.key,
                    confidence: 0.0,
                    metadata: AnswerMetadata::default(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

/// Condenses history into a prompt fragment: the most recent 3 turns, each
/// answer truncated to 200 characters.
fn condense_history(history: &[HistoryTurn]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let start = history.len().saturating_sub(HISTORY_WINDOW);
    let mut out = String::from("\n\nPrevious conversation:\n");
    for (i, turn) in history[start..].iter().enumerate() {
        out.push_str(&format!("Q{}: {}\n", i + 1, turn.question));
        out.push_str(&format!(
            "A{}: {}...\n\n",
            i + 1,
            truncate_chars(&turn.answer, HISTORY_ANSWER_CHARS)
        ));
    }
    out
}

fn build_user_prompt(question: &str, context: Option<&str>, history_context: &str) -> String {
    let context_line = context
        .map(|c| format!("Candidate Context: {c}\n"))
        .unwrap_or_default();

    format!(
        "Interview Question: \"{question}\"\n\n{context_line}{history_context}\n\
         Provide a comprehensive, well-structured answer that would impress in an interview."
    )
}

/// Coarse confidence from answer length in characters. Not model-derived.
fn confidence_for(answer: &str) -> f32 {
    match answer.chars().count() {
        0..=99 => 0.6,
        100..=499 => 0.75,
        500..=999 => 0.85,
        _ => 0.9,
    }
}

fn extract_metadata(answer: &str) -> AnswerMetadata {
    let lower = answer.to_lowercase();
    AnswerMetadata {
        word_count: answer.split_whitespace().count(),
        character_count: answer.chars().count(),
        has_examples: lower.contains("example") || lower.contains("for instance"),
        has_structure: ["1.", "2.", "First", "Second", "\u{2022}", "-"]
            .iter()
            .any(|marker| answer.contains(marker)),
    }
}

/// Truncates at a character boundary, never mid-scalar.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::registry::SpecialistRegistry;
    use crate::llm_client::testing::ScriptedBackend;

    #[test]
    fn test_confidence_steps_at_length_boundaries() {
        assert_eq!(confidence_for(&"x".repeat(99)), 0.6);
        assert_eq!(confidence_for(&"x".repeat(100)), 0.75);
        assert_eq!(confidence_for(&"x".repeat(499)), 0.75);
        assert_eq!(confidence_for(&"x".repeat(500)), 0.85);
        assert_eq!(confidence_for(&"x".repeat(999)), 0.85);
        assert_eq!(confidence_for(&"x".repeat(1000)), 0.9);
    }

    #[test]
    fn test_metadata_detects_examples_and_structure() {
        let meta = extract_metadata("For instance: 1. do this 2. do that");
        assert!(meta.has_examples);
        assert!(meta.has_structure);
        assert_eq!(meta.word_count, 8);

        let plain = extract_metadata("plain prose without markers");
        assert!(!plain.has_examples);
        assert!(!plain.has_structure);
    }

    #[test]
    fn test_history_window_keeps_last_three_turns() {
        let history: Vec<HistoryTurn> = (1..=5)
            .map(|i| HistoryTurn {
                question: format!("q{i}"),
                answer: format!("a{i}"),
            })
            .collect();

        let condensed = condense_history(&history);
        assert!(!condensed.contains("q1"));
        assert!(!condensed.contains("q2"));
        assert!(condensed.contains("q3"));
        assert!(condensed.contains("q5"));
    }

    #[test]
    fn test_history_answers_truncate_at_200_chars() {
        let history = [HistoryTurn {
            question: "q".to_string(),
            answer: "y".repeat(500),
        }];
        let condensed = condense_history(&history);
        assert!(condensed.contains(&"y".repeat(200)));
        assert!(!condensed.contains(&"y".repeat(201)));
    }

    #[test]
    fn test_truncate_chars_respects_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("ab", 10), "ab");
    }

    #[tokio::test]
    async fn test_process_derives_confidence_and_metadata() {
        let registry = SpecialistRegistry::bootstrap();
        let answer_text = format!("For example, {}", "detail ".repeat(20));
        let backend = ScriptedBackend::replying(&[answer_text.as_str()]);

        let result = registry
            .get(SpecialistKey::Technical)
            .process(&backend, "Explain binary search", None, &[])
            .await;

        assert_eq!(result.specialist, SpecialistKey::Technical);
        assert_eq!(result.answer, answer_text);
        assert!(result.error.is_none());
        assert!(result.metadata.has_examples);
        assert!((0.0..=1.0).contains(&result.confidence));
    }

    #[tokio::test]
    async fn test_process_never_fails_outward() {
        let registry = SpecialistRegistry::bootstrap();
        let backend = ScriptedBackend::failing("upstream down");

        let result = registry
            .get(SpecialistKey::Coding)
            .process(&backend, "Write a function", None, &[])
            .await;

        assert_eq!(result.confidence, 0.0);
        assert!(result.answer.starts_with("Error generating response:"));
        assert!(result.error.is_some());
    }
}
