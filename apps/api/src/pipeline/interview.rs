//! Interview pipeline: route → generate_answer → generate_follow_ups →
//! finalize.
//!
//! Routing and follow-ups recover internally, so the only failure that
//! reaches the state's error marker is the primary answer generation — which
//! callers surface as a request-level error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::BoxFuture;

use crate::agents::followups::generate_follow_ups;
use crate::agents::registry::{SpecialistKey, SpecialistRegistry};
use crate::agents::routing::{route_question, RoutingDecision};
use crate::agents::specialist::{HistoryTurn, SpecialistAnswer};
use crate::llm_client::ModelBackend;
use crate::pipeline::Pipeline;

/// Shared read-only context for interview stages.
#[derive(Clone)]
pub struct InterviewContext {
    pub backend: Arc<dyn ModelBackend>,
    pub registry: Arc<SpecialistRegistry>,
}

/// State owned by one in-flight interview request.
#[derive(Debug, Clone)]
pub struct InterviewState {
    // Input
    pub question: String,
    pub domain_hint: Option<String>,
    pub context: Option<String>,
    pub history: Vec<HistoryTurn>,

    // Decision
    pub routing: Option<RoutingDecision>,

    // Output
    pub answer: Option<SpecialistAnswer>,
    pub follow_ups: Vec<String>,
    pub completed_at: Option<DateTime<Utc>>,

    // Error marker — set only by the answer stage
    pub error: Option<String>,
}

impl InterviewState {
    pub fn new(
        question: String,
        domain_hint: Option<String>,
        context: Option<String>,
        history: Vec<HistoryTurn>,
    ) -> Self {
        Self {
            question,
            domain_hint,
            context,
            history,
            routing: None,
            answer: None,
            follow_ups: Vec::new(),
            completed_at: None,
            error: None,
        }
    }

    /// The selected specialist, defaulting to the routing fallback if the
    /// route stage has not run.
    pub fn specialist(&self) -> SpecialistKey {
        self.routing
            .as_ref()
            .map(|r| r.specialist)
            .unwrap_or(SpecialistKey::FALLBACK)
    }
}

/// Builds the interview pipeline. Stage order is the contract.
pub fn interview_pipeline() -> Pipeline<InterviewContext, InterviewState> {
    Pipeline::new()
        .stage("route", route_stage)
        .stage("generate_answer", answer_stage)
        .stage("generate_follow_ups", follow_ups_stage)
        .stage("finalize", finalize_stage)
}

fn route_stage(ctx: &InterviewContext, mut state: InterviewState) -> BoxFuture<'_, InterviewState> {
    Box::pin(async move {
        let decision = route_question(
            ctx.backend.as_ref(),
            &state.question,
            state.context.as_deref(),
            state.domain_hint.as_deref(),
        )
        .await;
        state.routing = Some(decision);
        state
    })
}

fn answer_stage(ctx: &InterviewContext, mut state: InterviewState) -> BoxFuture<'_, InterviewState> {
    Box::pin(async move {
        let profile = ctx.registry.get(state.specialist());
        let result = profile
            .process(
                ctx.backend.as_ref(),
                &state.question,
                state.context.as_deref(),
                &state.history,
            )
            .await;

        if let Some(reason) = &result.error {
            state.error = Some(reason.clone());
        }
        state.answer = Some(result);
        state
    })
}

fn follow_ups_stage(
    ctx: &InterviewContext,
    mut state: InterviewState,
) -> BoxFuture<'_, InterviewState> {
    Box::pin(async move {
        // A failed answer yields no follow-ups.
        if state.error.is_some() {
            return state;
        }

        if let Some(answer) = &state.answer {
            let follow_ups = generate_follow_ups(
                ctx.backend.as_ref(),
                &state.question,
                &answer.answer,
                state.specialist(),
            )
            .await;
            state.follow_ups = follow_ups.questions;
        }
        state
    })
}

fn finalize_stage(
    _ctx: &InterviewContext,
    mut state: InterviewState,
) -> BoxFuture<'_, InterviewState> {
    Box::pin(async move {
        state.completed_at = Some(Utc::now());
        state
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::testing::ScriptedBackend;

    const ROUTING_JSON: &str = r#"{
        "selected_specialist": "system_design",
        "reasoning": "full-system design question",
        "confidence": 0.95
    }"#;

    fn ctx_with(backend: ScriptedBackend) -> InterviewContext {
        InterviewContext {
            backend: Arc::new(backend),
            registry: Arc::new(SpecialistRegistry::bootstrap()),
        }
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(
            interview_pipeline().stage_names(),
            vec!["route", "generate_answer", "generate_follow_ups", "finalize"]
        );
    }

    #[tokio::test]
    async fn test_full_run_fills_every_output_field() {
        let backend = ScriptedBackend::replying(&[
            ROUTING_JSON,
            "Partition the timeline by user id and fan out on write.",
            r#"["How do you shard?", "Why fan-out on write?", "What about celebrities?"]"#,
        ]);
        let ctx = ctx_with(backend);
        let state = InterviewState::new("Design Twitter".to_string(), None, None, Vec::new());

        let out = interview_pipeline().run(&ctx, state).await;

        let routing = out.routing.expect("routing set");
        assert_eq!(routing.specialist, SpecialistKey::SystemDesign);
        assert!(routing.confidence >= 0.8);

        let answer = out.answer.expect("answer set");
        assert!(answer.answer.contains("Partition"));
        assert!((0.0..=1.0).contains(&answer.confidence));

        assert_eq!(out.follow_ups.len(), 3);
        assert!(out.completed_at.is_some());
        assert!(out.error.is_none());
    }

    #[tokio::test]
    async fn test_answer_failure_sets_error_and_skips_follow_ups() {
        let backend = ScriptedBackend::new(vec![
            Ok(ROUTING_JSON.to_string()),
            Err("model unavailable".to_string()),
        ]);
        let ctx = ctx_with(backend);
        let state = InterviewState::new("Design Twitter".to_string(), None, None, Vec::new());

        let out = interview_pipeline().run(&ctx, state).await;

        assert!(out.error.is_some());
        assert!(out.follow_ups.is_empty());
        assert!(out.completed_at.is_some());
        let answer = out.answer.expect("error answer still recorded");
        assert_eq!(answer.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_routing_failure_still_produces_an_answer() {
        let backend = ScriptedBackend::new(vec![
            Err("routing model down".to_string()),
            Ok("A binary search halves the range each step.".to_string()),
            Ok(r#"["a", "b", "c"]"#.to_string()),
        ]);
        let ctx = ctx_with(backend);
        let state = InterviewState::new("Explain binary search".to_string(), None, None, Vec::new());

        let out = interview_pipeline().run(&ctx, state).await;

        let routing = out.routing.expect("fallback routing set");
        assert_eq!(routing.specialist, SpecialistKey::FALLBACK);
        assert!(routing.fallback);
        assert!(out.error.is_none());
        assert!(out.answer.is_some());
        assert_eq!(out.follow_ups.len(), 3);
    }
}
