use std::sync::Arc;

use sqlx::PgPool;

use crate::agents::registry::SpecialistRegistry;
use crate::config::Config;
use crate::frameworks::FrameworkCatalog;
use crate::llm_client::ModelBackend;
use crate::pipeline::case_study::CaseContext;
use crate::pipeline::interview::InterviewContext;

/// Shared application state injected into all route handlers via Axum
/// extractors. Everything here is read-only after startup; per-request state
/// lives in the pipeline state values.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: Arc<dyn ModelBackend>,
    pub registry: Arc<SpecialistRegistry>,
    pub frameworks: Arc<FrameworkCatalog>,
    pub config: Config,
}

impl AppState {
    pub fn interview_context(&self) -> InterviewContext {
        InterviewContext {
            backend: Arc::clone(&self.llm),
            registry: Arc::clone(&self.registry),
        }
    }

    pub fn case_context(&self) -> CaseContext {
        CaseContext {
            backend: Arc::clone(&self.llm),
            frameworks: Arc::clone(&self.frameworks),
        }
    }
}
