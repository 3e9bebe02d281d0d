//! Axum handler for the non-streaming interview endpoint.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agents::registry::SpecialistKey;
use crate::agents::specialist::HistoryTurn;
use crate::errors::AppError;
use crate::pipeline::interview::{interview_pipeline, InterviewState};
use crate::state::AppState;

const QUESTION_MIN_CHARS: usize = 5;
const QUESTION_MAX_CHARS: usize = 1000;
const CONTEXT_MAX_CHARS: usize = 500;

/// Request body shared by the interview and answer-stream endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct InterviewRequest {
    pub question: String,
    pub domain_hint: Option<String>,
    pub context: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryTurn>,
}

#[derive(Debug, Serialize)]
pub struct InterviewResponse {
    pub question: String,
    pub answer: String,
    pub specialist: SpecialistKey,
    pub reasoning: String,
    pub confidence: f32,
    pub follow_ups: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Length bounds shared by both interview endpoints.
pub fn validate_request(question: &str, context: Option<&str>) -> Result<(), String> {
    let len = question.trim().chars().count();
    if !(QUESTION_MIN_CHARS..=QUESTION_MAX_CHARS).contains(&len) {
        return Err(format!(
            "question must be between {QUESTION_MIN_CHARS} and {QUESTION_MAX_CHARS} characters"
        ));
    }
    if context.is_some_and(|c| c.chars().count() > CONTEXT_MAX_CHARS) {
        return Err(format!(
            "context must be at most {CONTEXT_MAX_CHARS} characters"
        ));
    }
    Ok(())
}

/// POST /api/interview
///
/// Routes the question, generates an answer with the selected specialist,
/// and suggests follow-ups. A failed answer generation surfaces as a 500;
/// routing and follow-up failures are recovered internally.
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Json<InterviewResponse>, AppError> {
    validate_request(&request.question, request.context.as_deref())
        .map_err(AppError::Validation)?;

    let ctx = state.interview_context();
    let initial = InterviewState::new(
        request.question,
        request.domain_hint,
        request.context,
        request.history,
    );

    let out = interview_pipeline().run(&ctx, initial).await;

    if let Some(reason) = &out.error {
        return Err(AppError::Llm(format!("Answer generation failed: {reason}")));
    }

    let specialist = out.specialist();
    let (reasoning, confidence) = out
        .routing
        .as_ref()
        .map(|r| (r.reasoning.clone(), r.confidence))
        .unwrap_or_default();
    let answer = out.answer.map(|a| a.answer).unwrap_or_default();

    Ok(Json(InterviewResponse {
        question: out.question,
        answer,
        specialist,
        reasoning,
        confidence,
        follow_ups: out.follow_ups,
        timestamp: out.completed_at.unwrap_or_else(Utc::now),
    }))
}
