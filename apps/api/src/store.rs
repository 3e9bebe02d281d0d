//! Interview-tracking store — a conventional paginated CRUD data-access
//! layer. Pass-through collaborator only: the orchestration core has no
//! logic dependent on this schema.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::records::{
    CompanyRow, InterviewRoundRow, InterviewRow, QuestionRow, RoleRow, SkillRow,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 100;

/// Clamps caller-supplied paging into sane bounds.
pub fn clamp_page(skip: Option<i64>, limit: Option<i64>) -> (i64, i64) {
    let skip = skip.unwrap_or(0).max(0);
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    (skip, limit)
}

// ────────────────────────────────────────────────────────────────────────────
// Companies / roles / skills
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_companies(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    search: Option<&str>,
) -> sqlx::Result<Vec<CompanyRow>> {
    let pattern = search.map(|s| format!("%{s}%"));
    sqlx::query_as::<_, CompanyRow>(
        r#"
        SELECT id, company_name, industry, created_at
        FROM companies
        WHERE $1::text IS NULL OR company_name ILIKE $1
        ORDER BY company_name
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(pattern)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn create_company(
    pool: &PgPool,
    company_name: &str,
    industry: Option<&str>,
) -> sqlx::Result<CompanyRow> {
    sqlx::query_as::<_, CompanyRow>(
        r#"
        INSERT INTO companies (id, company_name, industry)
        VALUES ($1, $2, $3)
        RETURNING id, company_name, industry, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_name)
    .bind(industry)
    .fetch_one(pool)
    .await
}

pub async fn list_roles(pool: &PgPool, skip: i64, limit: i64) -> sqlx::Result<Vec<RoleRow>> {
    sqlx::query_as::<_, RoleRow>(
        r#"
        SELECT id, role_name, level, created_at
        FROM roles
        ORDER BY role_name
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn create_role(
    pool: &PgPool,
    role_name: &str,
    level: Option<&str>,
) -> sqlx::Result<RoleRow> {
    sqlx::query_as::<_, RoleRow>(
        r#"
        INSERT INTO roles (id, role_name, level)
        VALUES ($1, $2, $3)
        RETURNING id, role_name, level, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(role_name)
    .bind(level)
    .fetch_one(pool)
    .await
}

pub async fn list_skills(pool: &PgPool, skip: i64, limit: i64) -> sqlx::Result<Vec<SkillRow>> {
    sqlx::query_as::<_, SkillRow>(
        r#"
        SELECT id, skill_name, category, created_at
        FROM skills
        ORDER BY skill_name
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn create_skill(
    pool: &PgPool,
    skill_name: &str,
    category: Option<&str>,
) -> sqlx::Result<SkillRow> {
    sqlx::query_as::<_, SkillRow>(
        r#"
        INSERT INTO skills (id, skill_name, category)
        VALUES ($1, $2, $3)
        RETURNING id, skill_name, category, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(skill_name)
    .bind(category)
    .fetch_one(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Interviews and rounds
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_interviews(
    pool: &PgPool,
    skip: i64,
    limit: i64,
) -> sqlx::Result<Vec<InterviewRow>> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        SELECT id, company_id, role_id, scheduled_at, status, notes, created_at, updated_at
        FROM interviews
        ORDER BY created_at DESC
        OFFSET $1 LIMIT $2
        "#,
    )
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_interviews(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM interviews")
        .fetch_one(pool)
        .await
}

pub async fn get_interview(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<InterviewRow>> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        SELECT id, company_id, role_id, scheduled_at, status, notes, created_at, updated_at
        FROM interviews
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn create_interview(
    pool: &PgPool,
    company_id: Option<Uuid>,
    role_id: Option<Uuid>,
    scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    status: &str,
    notes: Option<&str>,
) -> sqlx::Result<InterviewRow> {
    sqlx::query_as::<_, InterviewRow>(
        r#"
        INSERT INTO interviews (id, company_id, role_id, scheduled_at, status, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, company_id, role_id, scheduled_at, status, notes, created_at, updated_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(company_id)
    .bind(role_id)
    .bind(scheduled_at)
    .bind(status)
    .bind(notes)
    .fetch_one(pool)
    .await
}

pub async fn list_rounds(pool: &PgPool, interview_id: Uuid) -> sqlx::Result<Vec<InterviewRoundRow>> {
    sqlx::query_as::<_, InterviewRoundRow>(
        r#"
        SELECT id, interview_id, round_number, round_type, outcome, created_at
        FROM interview_rounds
        WHERE interview_id = $1
        ORDER BY round_number
        "#,
    )
    .bind(interview_id)
    .fetch_all(pool)
    .await
}

pub async fn create_round(
    pool: &PgPool,
    interview_id: Uuid,
    round_number: i32,
    round_type: Option<&str>,
    outcome: Option<&str>,
) -> sqlx::Result<InterviewRoundRow> {
    sqlx::query_as::<_, InterviewRoundRow>(
        r#"
        INSERT INTO interview_rounds (id, interview_id, round_number, round_type, outcome)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, interview_id, round_number, round_type, outcome, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(interview_id)
    .bind(round_number)
    .bind(round_type)
    .bind(outcome)
    .fetch_one(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Questions
// ────────────────────────────────────────────────────────────────────────────

pub async fn list_questions(
    pool: &PgPool,
    skip: i64,
    limit: i64,
    category: Option<&str>,
) -> sqlx::Result<Vec<QuestionRow>> {
    sqlx::query_as::<_, QuestionRow>(
        r#"
        SELECT id, question_text, category, difficulty, source, created_at
        FROM questions
        WHERE $1::text IS NULL OR category = $1
        ORDER BY created_at DESC
        OFFSET $2 LIMIT $3
        "#,
    )
    .bind(category)
    .bind(skip)
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count_questions(pool: &PgPool) -> sqlx::Result<i64> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM questions")
        .fetch_one(pool)
        .await
}

pub async fn create_question(
    pool: &PgPool,
    question_text: &str,
    category: Option<&str>,
    difficulty: Option<&str>,
    source: Option<&str>,
) -> sqlx::Result<QuestionRow> {
    sqlx::query_as::<_, QuestionRow>(
        r#"
        INSERT INTO questions (id, question_text, category, difficulty, source)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, question_text, category, difficulty, source, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(question_text)
    .bind(category)
    .bind(difficulty)
    .bind(source)
    .fetch_one(pool)
    .await
}
