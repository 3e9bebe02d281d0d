//! Routing engine — picks exactly one specialist per question.
//!
//! The classification is a single constrained model call requesting a strict
//! JSON decision. Every failure mode (call failure, unparseable JSON, unknown
//! specialist key) converts into the same deterministic fallback decision, so
//! routing always produces a valid result and never propagates failure.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::agents::prompts::{ROUTING_PROMPT_TEMPLATE, ROUTING_SYSTEM};
use crate::agents::registry::SpecialistKey;
use crate::llm_client::{complete_json, ChatMessage, ModelBackend};

/// Confidence assigned when the model named a specialist outside the registry.
const FALLBACK_INVALID_CONFIDENCE: f32 = 0.7;
/// Confidence assigned when the model call or JSON parse failed outright.
const FALLBACK_ERROR_CONFIDENCE: f32 = 0.6;

/// The routing outcome for one request. Created once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct RoutingDecision {
    pub specialist: SpecialistKey,
    pub reasoning: String,
    pub confidence: f32,
    pub alternates: Vec<SpecialistKey>,
    /// True when this decision came from the deterministic fallback path.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

/// The raw JSON object the routing model is asked to produce.
#[derive(Debug, Deserialize)]
struct RawRoutingDecision {
    selected_specialist: String,
    reasoning: String,
    confidence: f32,
    #[serde(default)]
    alternates: Vec<String>,
}

/// Routes a question to a specialist. Guaranteed to return a decision whose
/// key is a registry member; confidence is clamped to [0, 1].
pub async fn route_question(
    backend: &dyn ModelBackend,
    question: &str,
    context: Option<&str>,
    domain_hint: Option<&str>,
) -> RoutingDecision {
    let raw = match request_decision(backend, question, context, domain_hint).await {
        Ok(raw) => raw,
        Err(reason) => {
            warn!("Routing failed, using fallback: {reason}");
            return fallback_decision(
                format!("Fallback routing: {reason}"),
                FALLBACK_ERROR_CONFIDENCE,
            );
        }
    };

    match raw.selected_specialist.parse::<SpecialistKey>() {
        Ok(specialist) => RoutingDecision {
            specialist,
            reasoning: raw.reasoning,
            confidence: raw.confidence.clamp(0.0, 1.0),
            alternates: valid_alternates(&raw.alternates),
            fallback: false,
        },
        Err(unknown) => {
            warn!("Routing selected {unknown}, using fallback");
            fallback_decision(
                format!("Fallback routing: {unknown}"),
                FALLBACK_INVALID_CONFIDENCE,
            )
        }
    }
}

async fn request_decision(
    backend: &dyn ModelBackend,
    question: &str,
    context: Option<&str>,
    domain_hint: Option<&str>,
) -> Result<RawRoutingDecision, String> {
    let prompt = build_routing_prompt(question, context, domain_hint);
    let messages = [ChatMessage::system(ROUTING_SYSTEM), ChatMessage::user(prompt)];

    complete_json(backend, &messages).await.map_err(|e| e.to_string())
}

fn build_routing_prompt(question: &str, context: Option<&str>, domain_hint: Option<&str>) -> String {
    let hint_line = domain_hint
        .map(|h| format!("Interview Type Hint: {h}\n"))
        .unwrap_or_default();
    let context_line = context
        .map(|c| format!("Candidate Context: {c}\n"))
        .unwrap_or_default();

    ROUTING_PROMPT_TEMPLATE
        .replace("{question}", question)
        .replace("{hint_line}", &hint_line)
        .replace("{context_line}", &context_line)
}

fn valid_alternates(raw: &[String]) -> Vec<SpecialistKey> {
    raw.iter()
        .filter_map(|s| s.parse::<SpecialistKey>().ok())
        .collect()
}

fn fallback_decision(reasoning: String, confidence: f32) -> RoutingDecision {
    RoutingDecision {
        specialist: SpecialistKey::FALLBACK,
        reasoning,
        confidence,
        alternates: Vec::new(),
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;

    #[tokio::test]
    async fn test_routes_design_question_to_system_design() {
        let backend = ScriptedBackend::replying(&[r#"{
            "selected_specialist": "system_design",
            "reasoning": "Full-system design of a social product",
            "confidence": 0.95,
            "alternates": ["architect"]
        }"#]);

        let decision = route_question(&backend, "Design Twitter", None, None).await;
        assert_eq!(decision.specialist, SpecialistKey::SystemDesign);
        assert!(decision.confidence >= 0.8);
        assert_eq!(decision.alternates, vec![SpecialistKey::Architect]);
        assert!(!decision.fallback);
    }

    #[tokio::test]
    async fn test_routes_star_question_to_behavioral() {
        let backend = ScriptedBackend::replying(&[r#"{
            "selected_specialist": "behavioral",
            "reasoning": "Past-experience conflict question",
            "confidence": 0.9
        }"#]);

        let decision = route_question(
            &backend,
            "Tell me about a time you resolved a conflict",
            None,
            None,
        )
        .await;
        assert_eq!(decision.specialist, SpecialistKey::Behavioral);
    }

    #[tokio::test]
    async fn test_accepts_fenced_json_decision() {
        let backend = ScriptedBackend::replying(&[
            "```json\n{\"selected_specialist\": \"coding\", \"reasoning\": \"explicit implement\", \"confidence\": 0.88}\n```",
        ]);

        let decision = route_question(&backend, "Implement a linked list", None, None).await;
        assert_eq!(decision.specialist, SpecialistKey::Coding);
        assert!(!decision.fallback);
    }

    #[tokio::test]
    async fn test_unknown_specialist_falls_back_at_point_seven() {
        let backend = ScriptedBackend::replying(&[r#"{
            "selected_specialist": "quantum_oracle",
            "reasoning": "made up",
            "confidence": 0.99
        }"#]);

        let decision = route_question(&backend, "Anything", None, None).await;
        assert_eq!(decision.specialist, SpecialistKey::FALLBACK);
        assert_eq!(decision.confidence, FALLBACK_INVALID_CONFIDENCE);
        assert!(decision.reasoning.contains("Fallback"));
        assert!(decision.fallback);
    }

    #[tokio::test]
    async fn test_backend_failure_falls_back_at_point_six() {
        let backend = ScriptedBackend::failing("connection reset");

        let decision = route_question(&backend, "Anything", None, None).await;
        assert_eq!(decision.specialist, SpecialistKey::FALLBACK);
        assert_eq!(decision.confidence, FALLBACK_ERROR_CONFIDENCE);
        assert!(decision.reasoning.contains("Fallback"));
        assert!((0.6..=0.7).contains(&decision.confidence));
    }

    #[tokio::test]
    async fn test_malformed_json_falls_back() {
        let backend = ScriptedBackend::replying(&["I think the technical agent fits best."]);

        let decision = route_question(&backend, "Anything", None, None).await;
        assert!(decision.fallback);
        assert_eq!(decision.confidence, FALLBACK_ERROR_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_confidence_is_clamped_into_unit_interval() {
        let backend = ScriptedBackend::replying(&[r#"{
            "selected_specialist": "technical",
            "reasoning": "overconfident model",
            "confidence": 1.7
        }"#]);

        let decision = route_question(&backend, "Explain quicksort", None, None).await;
        assert_eq!(decision.confidence, 1.0);
    }

    #[test]
    fn test_prompt_includes_hint_and_context_lines() {
        let prompt = build_routing_prompt("Q", Some("5 yoe"), Some("system_design"));
        assert!(prompt.contains("Interview Type Hint: system_design"));
        assert!(prompt.contains("Candidate Context: 5 yoe"));

        let bare = build_routing_prompt("Q", None, None);
        assert!(!bare.contains("Interview Type Hint"));
        assert!(!bare.contains("Candidate Context"));
    }

    #[test]
    fn test_invalid_alternates_are_dropped() {
        let alternates = valid_alternates(&[
            "architect".to_string(),
            "wizard".to_string(),
            "coding".to_string(),
        ]);
        assert_eq!(
            alternates,
            vec![SpecialistKey::Architect, SpecialistKey::Coding]
        );
    }
}
