//! Specialist catalog and SSE streaming endpoints.

use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::Stream;
use serde::Serialize;
use tokio::sync::mpsc;

use crate::agents::registry::SpecialistKey;
use crate::errors::AppError;
use crate::routes::interview::{validate_request, InterviewRequest};
use crate::state::AppState;
use crate::streaming::{emit_answer_events, StreamEvent};

/// Events buffered ahead of a slow consumer before the emitter awaits.
const STREAM_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Serialize)]
pub struct SpecialistInfo {
    pub id: SpecialistKey,
    pub display_name: &'static str,
    pub specializations: &'static [&'static str],
    pub best_for: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct AvailableResponse {
    pub total_specialists: usize,
    pub specialists: Vec<SpecialistInfo>,
}

/// GET /api/agents/available
pub async fn handle_available(State(state): State<AppState>) -> Json<AvailableResponse> {
    let specialists: Vec<SpecialistInfo> = state
        .registry
        .profiles()
        .iter()
        .map(|p| SpecialistInfo {
            id: p.key,
            display_name: p.display_name,
            specializations: p.specializations,
            best_for: p.best_for,
        })
        .collect();

    Json(AvailableResponse {
        total_specialists: specialists.len(),
        specialists,
    })
}

/// POST /api/agents/answer-stream
///
/// Streams the interview flow as `data: <json>\n\n` records. The emitter runs
/// in its own task; dropping the connection drops the receiver, which stops
/// the emitter at its next send.
pub async fn handle_answer_stream(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    validate_request(&request.question, request.context.as_deref())
        .map_err(AppError::Validation)?;

    let (tx, rx) = mpsc::channel::<StreamEvent>(STREAM_CHANNEL_CAPACITY);
    tokio::spawn(emit_answer_events(
        state.interview_context(),
        request.question,
        request.context,
        request.domain_hint,
        request.history,
        tx,
    ));

    let stream = async_stream::stream! {
        let mut rx = rx;
        while let Some(event) = rx.recv().await {
            let data = serde_json::to_string(&event).unwrap_or_default();
            yield Ok(Event::default().data(data));
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
