//! Case-study pipeline: classify → clarify → recommend_framework → solve →
//! compile.
//!
//! Every stage recovers locally with a deterministic fallback value, and the
//! pipeline deliberately does NOT short-circuit once the error marker is set:
//! later stages run against a possibly degraded classification, and `compile`
//! assembles whatever is present. The marker records the first degradation
//! for logging only; it never fails the request.

use std::sync::Arc;

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::frameworks::{FrameworkCatalog, FrameworkCategory};
use crate::llm_client::{complete_json, ChatMessage, ModelBackend};
use crate::pipeline::Pipeline;

// ────────────────────────────────────────────────────────────────────────────
// Prompts
// ────────────────────────────────────────────────────────────────────────────

const CLASSIFY_SYSTEM: &str = "You are a product management expert. Analyze case studies and \
    classify them into PM problem categories. Respond with valid JSON only.";

const CLARIFY_SYSTEM: &str = "You are a senior product manager conducting a case study \
    interview. Generate insightful clarifying questions that help understand the problem \
    better. Respond with valid JSON only.";

const RECOMMEND_SYSTEM: &str = "You are a PM framework expert. Provide detailed, actionable \
    guidance for applying product management frameworks. Respond with valid JSON only.";

const SOLVE_SYSTEM: &str = "You are an expert product manager who excels at solving PM case \
    studies. Provide comprehensive, detailed solutions that would impress in a PM interview. \
    Respond with valid JSON only.";

fn build_classify_prompt(case_study: &str, categories: &[&str]) -> String {
    format!(
        r#"Analyze this case study and classify it.

Case Study: "{case_study}"

Classify into ONE of these categories:
- {categories}

Respond in JSON format:
{{
  "problem_type": "category name",
  "confidence": 0.95,
  "reasoning": "brief explanation",
  "key_indicators": ["keyword1", "keyword2"]
}}"#,
        categories = categories.join("\n- "),
    )
}

fn build_clarify_prompt(case_study: &str, problem_type: &str) -> String {
    format!(
        r#"Given this case study, generate 5-7 clarifying questions that a PM should ask.

Case Study: "{case_study}"
Problem Type: {problem_type}

Cover constraints (time, budget, resources), target users and stakeholders, success criteria
and metrics, current state, business goals, and technical constraints.

Respond in JSON format:
{{
  "questions": [
    {{
      "question": "What is the primary goal: user satisfaction or business metrics?",
      "why_important": "Helps prioritize solutions between user experience and revenue",
      "category": "Goals"
    }}
  ]
}}

Provide 5-7 questions specific to this case and problem type."#
    )
}

fn build_recommend_prompt(case_study: &str, category: &FrameworkCategory) -> String {
    format!(
        r#"Provide detailed guidance for this case study.

Case Study: "{case_study}"
Problem Type: {problem_type}
Recommended Framework: {framework}
Framework Description: {description}

Provide a detailed response in JSON format:
{{
  "framework": "{framework}",
  "rationale": "why this framework is right for this specific case",
  "application_steps": [
    "Step 1: specific actionable guidance for this case",
    "Step 2: next step with concrete examples (provide 5-7 steps)"
  ],
  "key_tips": ["tip 1", "tip 2", "tip 3"],
  "common_pitfalls": ["pitfall 1", "pitfall 2"]
}}"#,
        problem_type = category.name,
        framework = category.primary,
        description = category.description,
    )
}

fn build_solve_prompt(case_study: &str, problem_type: &str, framework: &str) -> String {
    format!(
        r#"Provide a COMPLETE SOLUTION for this PM case study.

Case Study: "{case_study}"
Problem Type: {problem_type}
Framework: {framework}

Generate a comprehensive solution in JSON format with these sections:

{{
  "executive_summary": "2-3 sentence overview of your recommended solution",
  "situation_analysis": {{
    "current_state": "analysis of the current situation",
    "key_challenges": ["challenge 1", "challenge 2"],
    "opportunities": ["opportunity 1", "opportunity 2"]
  }},
  "user_analysis": {{
    "user_segments": [
      {{"segment": "segment name", "needs": "key needs", "pain_points": "main pain points"}}
    ],
    "primary_persona": "description of the primary target user"
  }},
  "proposed_solutions": [
    {{
      "solution_name": "Solution 1 Name",
      "description": "detailed description",
      "user_impact": "how it helps users",
      "business_impact": "how it helps the business",
      "priority": "High/Medium/Low",
      "implementation_complexity": "Low/Medium/High"
    }}
  ],
  "prioritized_recommendation": {{
    "top_solution": "name of the #1 recommended solution",
    "rationale": "why this is the best choice",
    "success_metrics": ["metric 1", "metric 2", "metric 3"],
    "implementation_timeline": "estimated timeline",
    "resource_requirements": "team and resources needed"
  }},
  "tradeoffs_considered": [
    {{"tradeoff": "description", "decision": "how we handle it"}}
  ],
  "risks_and_mitigations": [
    {{"risk": "potential risk", "mitigation": "how to address it"}}
  ],
  "next_steps": ["step 1", "step 2", "step 3"]
}}

Be specific, detailed, and actionable. Use real numbers and concrete examples where possible."#
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Stage output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Classification {
    pub problem_type: String,
    pub confidence: f32,
    pub reasoning: String,
    #[serde(default)]
    pub key_indicators: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClarifyingQuestion {
    pub question: String,
    pub why_important: String,
    pub category: String,
}

#[derive(Debug, Deserialize)]
struct ClarifyingQuestionList {
    questions: Vec<ClarifyingQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FrameworkRecommendation {
    pub framework: String,
    pub rationale: String,
    pub application_steps: Vec<String>,
    pub key_tips: Vec<String>,
    pub common_pitfalls: Vec<String>,
    /// Always attached from the catalog, never taken from the model.
    pub alternatives: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawFrameworkRecommendation {
    framework: String,
    rationale: String,
    application_steps: Vec<String>,
    #[serde(default)]
    key_tips: Vec<String>,
    #[serde(default)]
    common_pitfalls: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedSolution {
    pub solution_name: String,
    pub description: String,
    pub user_impact: String,
    pub business_impact: String,
    pub priority: String,
    pub implementation_complexity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrioritizedRecommendation {
    pub top_solution: String,
    pub rationale: String,
    #[serde(default)]
    pub success_metrics: Vec<String>,
    pub implementation_timeline: String,
    pub resource_requirements: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOff {
    pub tradeoff: String,
    pub decision: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskMitigation {
    pub risk: String,
    pub mitigation: String,
}

/// The full solution. `situation_analysis` and `user_analysis` are
/// intentionally schemaless — their shape is advisory in the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteSolution {
    pub executive_summary: String,
    #[serde(default)]
    pub situation_analysis: Value,
    #[serde(default)]
    pub user_analysis: Value,
    #[serde(default)]
    pub proposed_solutions: Vec<ProposedSolution>,
    #[serde(default)]
    pub prioritized_recommendation: Option<PrioritizedRecommendation>,
    #[serde(default)]
    pub tradeoffs_considered: Vec<TradeOff>,
    #[serde(default)]
    pub risks_and_mitigations: Vec<RiskMitigation>,
    #[serde(default)]
    pub next_steps: Vec<String>,
}

/// The compiled analysis returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CaseAnalysis {
    pub case_study: String,
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clarifying_questions: Option<Vec<ClarifyingQuestion>>,
    pub framework_recommendation: FrameworkRecommendation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub complete_solution: Option<CompleteSolution>,
}

// ────────────────────────────────────────────────────────────────────────────
// State and pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Shared read-only context for case-study stages.
#[derive(Clone)]
pub struct CaseContext {
    pub backend: Arc<dyn ModelBackend>,
    pub frameworks: Arc<FrameworkCatalog>,
}

/// State owned by one in-flight analysis request.
#[derive(Debug, Clone)]
pub struct CaseState {
    // Input
    pub case_study: String,
    pub additional_context: Option<String>,
    pub include_clarifying_questions: bool,
    pub include_complete_solution: bool,

    // Intermediate
    pub classification: Option<Classification>,
    pub clarifying_questions: Option<Vec<ClarifyingQuestion>>,
    pub framework_recommendation: Option<FrameworkRecommendation>,
    pub complete_solution: Option<CompleteSolution>,

    // Output
    pub result: Option<CaseAnalysis>,
    /// First degradation, for logging. Never fails the request.
    pub error: Option<String>,
}

impl CaseState {
    pub fn new(
        case_study: String,
        additional_context: Option<String>,
        include_clarifying_questions: bool,
        include_complete_solution: bool,
    ) -> Self {
        Self {
            case_study,
            additional_context,
            include_clarifying_questions,
            include_complete_solution,
            classification: None,
            clarifying_questions: None,
            framework_recommendation: None,
            complete_solution: None,
            result: None,
            error: None,
        }
    }

    /// The case text with any additional context folded in.
    fn case_with_context(&self) -> String {
        match &self.additional_context {
            Some(extra) => format!("{}. Additional context: {extra}", self.case_study),
            None => self.case_study.clone(),
        }
    }

    fn problem_type(&self) -> Option<&str> {
        self.classification.as_ref().map(|c| c.problem_type.as_str())
    }

    fn record_degradation(&mut self, stage: &str, reason: impl std::fmt::Display) {
        warn!("Case stage {stage} degraded: {reason}");
        self.error.get_or_insert_with(|| format!("{stage}: {reason}"));
    }
}

/// Builds the case-study pipeline. Stage order is the contract.
pub fn case_study_pipeline() -> Pipeline<CaseContext, CaseState> {
    Pipeline::new()
        .stage("classify", classify_stage)
        .stage("clarify", clarify_stage)
        .stage("recommend_framework", recommend_stage)
        .stage("solve", solve_stage)
        .stage("compile", compile_stage)
}

fn classify_stage(ctx: &CaseContext, mut state: CaseState) -> BoxFuture<'_, CaseState> {
    Box::pin(async move {
        let prompt = build_classify_prompt(&state.case_with_context(), &ctx.frameworks.names());
        let messages = [ChatMessage::system(CLASSIFY_SYSTEM), ChatMessage::user(prompt)];

        match complete_json::<Classification>(ctx.backend.as_ref(), &messages).await {
            Ok(mut classification) => {
                // Pin the reported category to a catalog member.
                classification.problem_type = ctx
                    .frameworks
                    .resolve(&classification.problem_type)
                    .name
                    .to_string();
                classification.confidence = classification.confidence.clamp(0.0, 1.0);
                state.classification = Some(classification);
            }
            Err(e) => {
                state.record_degradation("classify", &e);
                state.classification = Some(default_classification(ctx.frameworks.as_ref()));
            }
        }
        state
    })
}

fn clarify_stage(ctx: &CaseContext, mut state: CaseState) -> BoxFuture<'_, CaseState> {
    Box::pin(async move {
        if !state.include_clarifying_questions {
            return state;
        }

        let problem_type = state.problem_type().unwrap_or_default().to_string();
        let prompt = build_clarify_prompt(&state.case_study, &problem_type);
        let messages = [ChatMessage::system(CLARIFY_SYSTEM), ChatMessage::user(prompt)];

        match complete_json::<ClarifyingQuestionList>(ctx.backend.as_ref(), &messages).await {
            Ok(list) => state.clarifying_questions = Some(list.questions),
            Err(e) => {
                state.record_degradation("clarify", &e);
                state.clarifying_questions = Some(vec![ClarifyingQuestion {
                    question: "What are the main constraints?".to_string(),
                    why_important: "Helps scope the solution".to_string(),
                    category: "Constraints".to_string(),
                }]);
            }
        }
        state
    })
}

fn recommend_stage(ctx: &CaseContext, mut state: CaseState) -> BoxFuture<'_, CaseState> {
    Box::pin(async move {
        let category = match state.problem_type() {
            Some(name) => ctx.frameworks.resolve(name),
            None => ctx.frameworks.default_category(),
        };
        let prompt = build_recommend_prompt(&state.case_with_context(), category);
        let messages = [ChatMessage::system(RECOMMEND_SYSTEM), ChatMessage::user(prompt)];

        match complete_json::<RawFrameworkRecommendation>(ctx.backend.as_ref(), &messages).await {
            Ok(raw) => {
                state.framework_recommendation = Some(FrameworkRecommendation {
                    framework: raw.framework,
                    rationale: raw.rationale,
                    application_steps: raw.application_steps,
                    key_tips: raw.key_tips,
                    common_pitfalls: raw.common_pitfalls,
                    alternatives: category
                        .alternatives
                        .iter()
                        .map(|a| a.to_string())
                        .collect(),
                });
            }
            Err(e) => {
                state.record_degradation("recommend_framework", &e);
                state.framework_recommendation = Some(static_recommendation(category));
            }
        }
        state
    })
}

fn solve_stage(ctx: &CaseContext, mut state: CaseState) -> BoxFuture<'_, CaseState> {
    Box::pin(async move {
        if !state.include_complete_solution {
            return state;
        }

        let problem_type = state.problem_type().unwrap_or_default().to_string();
        let framework = state
            .framework_recommendation
            .as_ref()
            .map(|f| f.framework.clone())
            .unwrap_or_default();
        let prompt = build_solve_prompt(&state.case_with_context(), &problem_type, &framework);
        let messages = [ChatMessage::system(SOLVE_SYSTEM), ChatMessage::user(prompt)];

        match complete_json::<CompleteSolution>(ctx.backend.as_ref(), &messages).await {
            Ok(solution) => state.complete_solution = Some(solution),
            Err(e) => {
                state.record_degradation("solve", &e);
                state.complete_solution = Some(empty_solution());
            }
        }
        state
    })
}

fn compile_stage(ctx: &CaseContext, mut state: CaseState) -> BoxFuture<'_, CaseState> {
    Box::pin(async move {
        let classification = state
            .classification
            .clone()
            .unwrap_or_else(|| default_classification(ctx.frameworks.as_ref()));
        let framework_recommendation = state
            .framework_recommendation
            .clone()
            .unwrap_or_else(|| static_recommendation(ctx.frameworks.default_category()));

        state.result = Some(CaseAnalysis {
            case_study: state.case_study.clone(),
            classification,
            clarifying_questions: state.clarifying_questions.clone(),
            framework_recommendation,
            complete_solution: state.complete_solution.clone(),
        });
        state
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback values
// ────────────────────────────────────────────────────────────────────────────

fn default_classification(catalog: &FrameworkCatalog) -> Classification {
    Classification {
        problem_type: catalog.default_category().name.to_string(),
        confidence: 0.7,
        reasoning: "Default classification due to error".to_string(),
        key_indicators: Vec::new(),
    }
}

fn static_recommendation(category: &FrameworkCategory) -> FrameworkRecommendation {
    FrameworkRecommendation {
        framework: category.primary.to_string(),
        rationale: format!("Standard framework for {}", category.name),
        application_steps: vec!["Apply the framework systematically".to_string()],
        key_tips: Vec::new(),
        common_pitfalls: Vec::new(),
        alternatives: category.alternatives.iter().map(|a| a.to_string()).collect(),
    }
}

fn empty_solution() -> CompleteSolution {
    CompleteSolution {
        executive_summary: "Solution generation failed".to_string(),
        situation_analysis: Value::Null,
        user_analysis: Value::Null,
        proposed_solutions: Vec::new(),
        prioritized_recommendation: None,
        tradeoffs_considered: Vec::new(),
        risks_and_mitigations: Vec::new(),
        next_steps: Vec::new(),
    }
}
