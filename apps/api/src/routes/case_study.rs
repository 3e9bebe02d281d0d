//! Case-study analysis endpoints.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::pipeline::case_study::{case_study_pipeline, CaseAnalysis, CaseState};
use crate::state::AppState;

const CASE_STUDY_MIN_CHARS: usize = 5;

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct CaseStudyRequest {
    pub case_study: String,
    pub additional_context: Option<String>,
    #[serde(default = "default_true")]
    pub include_clarifying_questions: bool,
    #[serde(default = "default_true")]
    pub include_complete_solution: bool,
}

/// POST /api/analyze
///
/// Runs the five-stage case-study pipeline. Stage failures degrade to
/// deterministic fallbacks instead of failing the request.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<CaseStudyRequest>,
) -> Result<Json<CaseAnalysis>, AppError> {
    if request.case_study.trim().chars().count() < CASE_STUDY_MIN_CHARS {
        return Err(AppError::Validation(format!(
            "case_study must be at least {CASE_STUDY_MIN_CHARS} characters"
        )));
    }

    let ctx = state.case_context();
    let initial = CaseState::new(
        request.case_study,
        request.additional_context,
        request.include_clarifying_questions,
        request.include_complete_solution,
    );

    let out = case_study_pipeline().run(&ctx, initial).await;

    out.result
        .map(Json)
        .ok_or_else(|| AppError::Llm("analysis produced no result".to_string()))
}

/// GET /api/frameworks
pub async fn handle_frameworks(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "total_categories": state.frameworks.len(),
        "categories": state.frameworks.names(),
        "frameworks": state.frameworks.categories(),
    }))
}
