#![allow(dead_code)]

//! Row types for the interview-tracking store. The core treats these as an
//! opaque pass-through boundary; no orchestration logic depends on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub company_name: String,
    pub industry: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleRow {
    pub id: Uuid,
    pub role_name: String,
    pub level: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub id: Uuid,
    pub skill_name: String,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRow {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub role_id: Option<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewRoundRow {
    pub id: Uuid,
    pub interview_id: Uuid,
    pub round_number: i32,
    pub round_type: Option<String>,
    pub outcome: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub question_text: String,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}
