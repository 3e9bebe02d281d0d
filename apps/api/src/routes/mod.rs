pub mod agents;
pub mod case_study;
pub mod health;
pub mod interview;
pub mod records;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health::handle_health))
        // Interview Q&A
        .route("/api/interview", post(interview::handle_interview))
        .route("/api/agents/available", get(agents::handle_available))
        .route(
            "/api/agents/answer-stream",
            post(agents::handle_answer_stream),
        )
        // Case-study analysis
        .route("/api/analyze", post(case_study::handle_analyze))
        .route("/api/frameworks", get(case_study::handle_frameworks))
        // Interview tracking (pass-through collaborator)
        .route(
            "/api/companies",
            get(records::handle_list_companies).post(records::handle_create_company),
        )
        .route(
            "/api/roles",
            get(records::handle_list_roles).post(records::handle_create_role),
        )
        .route(
            "/api/skills",
            get(records::handle_list_skills).post(records::handle_create_skill),
        )
        .route(
            "/api/interviews",
            get(records::handle_list_interviews).post(records::handle_create_interview),
        )
        .route("/api/interviews/:id", get(records::handle_get_interview))
        .route(
            "/api/interviews/:id/rounds",
            get(records::handle_list_rounds).post(records::handle_create_round),
        )
        .route(
            "/api/questions",
            get(records::handle_list_questions).post(records::handle_create_question),
        )
        .with_state(state)
}
