//! Pass-through CRUD handlers for the interview-tracking store.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::records::{
    CompanyRow, InterviewRoundRow, InterviewRow, QuestionRow, RoleRow, SkillRow,
};
use crate::state::AppState;
use crate::store;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub total: i64,
    pub skip: i64,
    pub limit: i64,
    pub items: Vec<T>,
}

// ────────────────────────────────────────────────────────────────────────────
// Companies / roles / skills
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewCompany {
    pub company_name: String,
    pub industry: Option<String>,
}

pub async fn handle_list_companies(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<CompanyRow>>, AppError> {
    let (skip, limit) = store::clamp_page(params.skip, params.limit);
    let companies =
        store::list_companies(&state.db, skip, limit, params.search.as_deref()).await?;
    Ok(Json(companies))
}

pub async fn handle_create_company(
    State(state): State<AppState>,
    Json(body): Json<NewCompany>,
) -> Result<(StatusCode, Json<CompanyRow>), AppError> {
    if body.company_name.trim().is_empty() {
        return Err(AppError::Validation("company_name cannot be empty".to_string()));
    }
    let company =
        store::create_company(&state.db, body.company_name.trim(), body.industry.as_deref())
            .await?;
    Ok((StatusCode::CREATED, Json(company)))
}

#[derive(Debug, Deserialize)]
pub struct NewRole {
    pub role_name: String,
    pub level: Option<String>,
}

pub async fn handle_list_roles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RoleRow>>, AppError> {
    let (skip, limit) = store::clamp_page(params.skip, params.limit);
    Ok(Json(store::list_roles(&state.db, skip, limit).await?))
}

pub async fn handle_create_role(
    State(state): State<AppState>,
    Json(body): Json<NewRole>,
) -> Result<(StatusCode, Json<RoleRow>), AppError> {
    if body.role_name.trim().is_empty() {
        return Err(AppError::Validation("role_name cannot be empty".to_string()));
    }
    let role = store::create_role(&state.db, body.role_name.trim(), body.level.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

#[derive(Debug, Deserialize)]
pub struct NewSkill {
    pub skill_name: String,
    pub category: Option<String>,
}

pub async fn handle_list_skills(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<SkillRow>>, AppError> {
    let (skip, limit) = store::clamp_page(params.skip, params.limit);
    Ok(Json(store::list_skills(&state.db, skip, limit).await?))
}

pub async fn handle_create_skill(
    State(state): State<AppState>,
    Json(body): Json<NewSkill>,
) -> Result<(StatusCode, Json<SkillRow>), AppError> {
    if body.skill_name.trim().is_empty() {
        return Err(AppError::Validation("skill_name cannot be empty".to_string()));
    }
    let skill =
        store::create_skill(&state.db, body.skill_name.trim(), body.category.as_deref()).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

// ────────────────────────────────────────────────────────────────────────────
// Interviews and rounds
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewInterview {
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default = "default_status")]
    pub status: String,
    pub notes: Option<String>,
}

fn default_status() -> String {
    "scheduled".to_string()
}

pub async fn handle_list_interviews(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<InterviewRow>>, AppError> {
    let (skip, limit) = store::clamp_page(params.skip, params.limit);
    let total = store::count_interviews(&state.db).await?;
    let items = store::list_interviews(&state.db, skip, limit).await?;
    Ok(Json(PagedResponse {
        total,
        skip,
        limit,
        items,
    }))
}

pub async fn handle_create_interview(
    State(state): State<AppState>,
    Json(body): Json<NewInterview>,
) -> Result<(StatusCode, Json<InterviewRow>), AppError> {
    let interview = store::create_interview(
        &state.db,
        body.company_id,
        body.role_id,
        body.scheduled_at,
        &body.status,
        body.notes.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(interview)))
}

pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewRow>, AppError> {
    store::get_interview(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("interview {id} not found")))
}

#[derive(Debug, Deserialize)]
pub struct NewRound {
    pub round_number: i32,
    pub round_type: Option<String>,
    pub outcome: Option<String>,
}

pub async fn handle_list_rounds(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<InterviewRoundRow>>, AppError> {
    // 404 on a missing parent rather than returning an empty list
    if store::get_interview(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("interview {id} not found")));
    }
    Ok(Json(store::list_rounds(&state.db, id).await?))
}

pub async fn handle_create_round(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewRound>,
) -> Result<(StatusCode, Json<InterviewRoundRow>), AppError> {
    if store::get_interview(&state.db, id).await?.is_none() {
        return Err(AppError::NotFound(format!("interview {id} not found")));
    }
    let round = store::create_round(
        &state.db,
        id,
        body.round_number,
        body.round_type.as_deref(),
        body.outcome.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(round)))
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewQuestion {
    pub question_text: String,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub source: Option<String>,
}

pub async fn handle_list_questions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedResponse<QuestionRow>>, AppError> {
    let (skip, limit) = store::clamp_page(params.skip, params.limit);
    let total = store::count_questions(&state.db).await?;
    let items =
        store::list_questions(&state.db, skip, limit, params.category.as_deref()).await?;
    Ok(Json(PagedResponse {
        total,
        skip,
        limit,
        items,
    }))
}

pub async fn handle_create_question(
    State(state): State<AppState>,
    Json(body): Json<NewQuestion>,
) -> Result<(StatusCode, Json<QuestionRow>), AppError> {
    if body.question_text.trim().is_empty() {
        return Err(AppError::Validation("question_text cannot be empty".to_string()));
    }
    let question = store::create_question(
        &state.db,
        body.question_text.trim(),
        body.category.as_deref(),
        body.difficulty.as_deref(),
        body.source.as_deref(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(question)))
}
