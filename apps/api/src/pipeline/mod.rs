//! Pipeline executor — a fixed, linear sequence of named stage functions
//! applied in order to an owned state value.
//!
//! Every pipeline in this service is strictly linear, so this is a plain
//! ordered list, not a graph. A stage receives the state by value and returns
//! it (possibly with an error marker set); whether later stages react to that
//! marker is each pipeline's own policy.

pub mod case_study;
pub mod interview;

use futures::future::BoxFuture;
use tracing::debug;

/// One stage: borrows the shared per-pipeline context, consumes and returns
/// the request-owned state.
pub type StageFn<C, S> = for<'a> fn(&'a C, S) -> BoxFuture<'a, S>;

/// An ordered list of named stages over context `C` and state `S`.
pub struct Pipeline<C, S> {
    stages: Vec<(&'static str, StageFn<C, S>)>,
}

impl<C, S> Pipeline<C, S> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    pub fn stage(mut self, name: &'static str, f: StageFn<C, S>) -> Self {
        self.stages.push((name, f));
        self
    }

    /// Runs all stages in order. The state is exclusively owned by this call.
    pub async fn run(&self, ctx: &C, mut state: S) -> S {
        for (name, stage) in &self.stages {
            debug!(stage = *name, "pipeline stage");
            state = stage(ctx, state).await;
        }
        state
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|(name, _)| *name).collect()
    }
}

impl<C, S> Default for Pipeline<C, S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push_a<'a>(_ctx: &'a (), mut state: Vec<&'static str>) -> BoxFuture<'a, Vec<&'static str>> {
        Box::pin(async move {
            state.push("a");
            state
        })
    }

    fn push_b<'a>(_ctx: &'a (), mut state: Vec<&'static str>) -> BoxFuture<'a, Vec<&'static str>> {
        Box::pin(async move {
            state.push("b");
            state
        })
    }

    #[tokio::test]
    async fn test_stages_run_in_declaration_order() {
        let pipeline: Pipeline<(), Vec<&'static str>> = Pipeline::new()
            .stage("a", push_a)
            .stage("b", push_b)
            .stage("a_again", push_a);

        let out = pipeline.run(&(), Vec::new()).await;
        assert_eq!(out, vec!["a", "b", "a"]);
        assert_eq!(pipeline.stage_names(), vec!["a", "b", "a_again"]);
    }

    #[tokio::test]
    async fn test_empty_pipeline_returns_state_unchanged() {
        let pipeline: Pipeline<(), Vec<&'static str>> = Pipeline::new();
        let out = pipeline.run(&(), vec!["seed"]).await;
        assert_eq!(out, vec!["seed"]);
    }
}
