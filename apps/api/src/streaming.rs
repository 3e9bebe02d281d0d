//! Streaming emitter — converts the interview flow into an ordered sequence
//! of typed events delivered incrementally over one connection.
//!
//! Event order: start → routing → processing → content… → answer_complete →
//! follow_ups → complete. A failed answer generation emits a single `error`
//! event and ends the stream; nothing follows a terminal event. The fixed
//! delays are open-loop pacing for consumer readability, not backpressure.
//! A failed channel send means the client disconnected: production stops
//! immediately, with no checkpoint or resume.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use crate::agents::followups::generate_follow_ups;
use crate::agents::registry::SpecialistKey;
use crate::agents::routing::route_question;
use crate::agents::specialist::{AnswerMetadata, HistoryTurn};
use crate::pipeline::interview::InterviewContext;

/// Content events carry fixed 50-character chunks of the answer.
pub const CONTENT_CHUNK_CHARS: usize = 50;
const EVENT_DELAY: Duration = Duration::from_millis(100);
const CHUNK_DELAY: Duration = Duration::from_millis(50);

/// Typed event payloads; the tag is the wire-visible event type.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum StreamEventKind {
    Start {
        message: String,
        question: String,
    },
    Routing {
        specialist: SpecialistKey,
        reasoning: String,
        confidence: f32,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        fallback: bool,
    },
    Processing {
        message: String,
        specialist: SpecialistKey,
    },
    Content {
        chunk: String,
        is_final: bool,
    },
    AnswerComplete {
        full_answer: String,
        word_count: usize,
        character_count: usize,
        metadata: AnswerMetadata,
    },
    FollowUps {
        questions: Vec<String>,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        generic: bool,
    },
    Complete {
        message: String,
        specialist_used: SpecialistKey,
        success: bool,
    },
    Error {
        error: String,
        message: String,
    },
}

/// The envelope actually written to the wire.
#[derive(Debug, Clone, Serialize)]
pub struct StreamEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: StreamEventKind,
}

impl StreamEvent {
    pub fn now(kind: StreamEventKind) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
        }
    }
}

/// Splits the answer into fixed-size character chunks, in original order.
pub fn chunk_answer(answer: &str) -> Vec<String> {
    let chars: Vec<char> = answer.chars().collect();
    chars
        .chunks(CONTENT_CHUNK_CHARS)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Sends one event; false means the consumer is gone and production must stop.
async fn send(tx: &mpsc::Sender<StreamEvent>, kind: StreamEventKind) -> bool {
    tx.send(StreamEvent::now(kind)).await.is_ok()
}

/// Runs the interview flow, emitting events into `tx` as each step lands.
///
/// This drives the same components as the interview pipeline (routing →
/// specialist → follow-ups) but interleaves emission with execution so the
/// client sees progress incrementally.
pub async fn emit_answer_events(
    ctx: InterviewContext,
    question: String,
    context: Option<String>,
    domain_hint: Option<String>,
    history: Vec<HistoryTurn>,
    tx: mpsc::Sender<StreamEvent>,
) {
    if !send(
        &tx,
        StreamEventKind::Start {
            message: "Processing question...".to_string(),
            question: question.clone(),
        },
    )
    .await
    {
        return;
    }
    sleep(EVENT_DELAY).await;

    // Routing never fails; a fallback decision carries its own marker.
    let decision = route_question(
        ctx.backend.as_ref(),
        &question,
        context.as_deref(),
        domain_hint.as_deref(),
    )
    .await;

    if !send(
        &tx,
        StreamEventKind::Routing {
            specialist: decision.specialist,
            reasoning: decision.reasoning.clone(),
            confidence: decision.confidence,
            fallback: decision.fallback,
        },
    )
    .await
    {
        return;
    }
    sleep(EVENT_DELAY).await;

    if !send(
        &tx,
        StreamEventKind::Processing {
            message: format!("Processing with {} specialist...", decision.specialist),
            specialist: decision.specialist,
        },
    )
    .await
    {
        return;
    }
    sleep(EVENT_DELAY).await;

    let profile = ctx.registry.get(decision.specialist);
    let result = profile
        .process(
            ctx.backend.as_ref(),
            &question,
            context.as_deref(),
            &history,
        )
        .await;

    // Primary generation failure is the one terminal error of this stream.
    if let Some(reason) = &result.error {
        send(
            &tx,
            StreamEventKind::Error {
                error: reason.clone(),
                message: "Failed to generate answer".to_string(),
            },
        )
        .await;
        return;
    }

    let chunks = chunk_answer(&result.answer);
    let last = chunks.len().saturating_sub(1);
    for (i, chunk) in chunks.into_iter().enumerate() {
        if !send(
            &tx,
            StreamEventKind::Content {
                chunk,
                is_final: i == last,
            },
        )
        .await
        {
            return;
        }
        sleep(CHUNK_DELAY).await;
    }

    if !send(
        &tx,
        StreamEventKind::AnswerComplete {
            full_answer: result.answer.clone(),
            word_count: result.metadata.word_count,
            character_count: result.metadata.character_count,
            metadata: result.metadata.clone(),
        },
    )
    .await
    {
        return;
    }
    sleep(EVENT_DELAY).await;

    let follow_ups = generate_follow_ups(
        ctx.backend.as_ref(),
        &question,
        &result.answer,
        decision.specialist,
    )
    .await;

    if !send(
        &tx,
        StreamEventKind::FollowUps {
            questions: follow_ups.questions,
            generic: follow_ups.generic,
        },
    )
    .await
    {
        return;
    }
    sleep(EVENT_DELAY).await;

    send(
        &tx,
        StreamEventKind::Complete {
            message: "Processing complete".to_string(),
            specialist_used: decision.specialist,
            success: true,
        },
    )
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::registry::SpecialistRegistry;
    use crate::llm_client::testing::ScriptedBackend;
    use std::sync::Arc;

    const ROUTING_JSON: &str = r#"{
        "selected_specialist": "technical",
        "reasoning": "algorithm question",
        "confidence": 0.9
    }"#;

    fn ctx_with(backend: ScriptedBackend) -> InterviewContext {
        InterviewContext {
            backend: Arc::new(backend),
            registry: Arc::new(SpecialistRegistry::bootstrap()),
        }
    }

    async fn collect_events(ctx: InterviewContext, question: &str) -> Vec<StreamEvent> {
        let (tx, mut rx) = mpsc::channel(64);
        let question = question.to_string();
        let task = tokio::spawn(emit_answer_events(ctx, question, None, None, Vec::new(), tx));

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        task.await.expect("emitter task");
        events
    }

    fn tag(event: &StreamEvent) -> &'static str {
        match event.kind {
            StreamEventKind::Start { .. } => "start",
            StreamEventKind::Routing { .. } => "routing",
            StreamEventKind::Processing { .. } => "processing",
            StreamEventKind::Content { .. } => "content",
            StreamEventKind::AnswerComplete { .. } => "answer_complete",
            StreamEventKind::FollowUps { .. } => "follow_ups",
            StreamEventKind::Complete { .. } => "complete",
            StreamEventKind::Error { .. } => "error",
        }
    }

    #[test]
    fn test_chunks_concatenate_to_original() {
        let answer = "a".repeat(120) + "é" + &"b".repeat(40);
        let chunks = chunk_answer(&answer);
        assert!(chunks.iter().all(|c| c.chars().count() <= CONTENT_CHUNK_CHARS));
        assert_eq!(chunks.concat(), answer);
    }

    #[test]
    fn test_empty_answer_has_no_chunks() {
        assert!(chunk_answer("").is_empty());
    }

    #[test]
    fn test_event_type_tags_are_snake_case() {
        let event = StreamEvent::now(StreamEventKind::AnswerComplete {
            full_answer: "a".to_string(),
            word_count: 1,
            character_count: 1,
            metadata: AnswerMetadata::default(),
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"event_type\":\"answer_complete\""));
        assert!(json.contains("\"timestamp\""));
    }

    #[tokio::test]
    async fn test_successful_stream_order_and_reconstruction() {
        let answer = "The invariant is that the search range always contains the target \
                      if it is present, and the range halves every iteration until it is empty.";
        let backend = ScriptedBackend::replying(&[
            ROUTING_JSON,
            answer,
            r#"["Why log n?", "What about duplicates?", "Iterative or recursive?"]"#,
        ]);

        let events = collect_events(ctx_with(backend), "Explain binary search").await;
        let tags: Vec<&str> = events.iter().map(tag).collect();

        assert_eq!(tags.first(), Some(&"start"));
        assert_eq!(tags.get(1), Some(&"routing"));
        assert_eq!(tags.get(2), Some(&"processing"));
        assert_eq!(tags.last(), Some(&"complete"));
        assert_eq!(tags.iter().filter(|t| **t == "complete").count(), 1);
        assert_eq!(tags.iter().filter(|t| **t == "error").count(), 0);

        // content chunks precede answer_complete and reproduce it exactly
        let mut rebuilt = String::new();
        let mut finals = 0;
        for event in &events {
            if let StreamEventKind::Content { chunk, is_final } = &event.kind {
                assert!(chunk.chars().count() <= CONTENT_CHUNK_CHARS);
                rebuilt.push_str(chunk);
                if *is_final {
                    finals += 1;
                }
            }
        }
        assert_eq!(finals, 1);

        let full = events
            .iter()
            .find_map(|e| match &e.kind {
                StreamEventKind::AnswerComplete { full_answer, .. } => Some(full_answer.clone()),
                _ => None,
            })
            .expect("answer_complete present");
        assert_eq!(rebuilt, full);
        assert_eq!(full, answer);

        let follow_up_count = events
            .iter()
            .find_map(|e| match &e.kind {
                StreamEventKind::FollowUps { questions, .. } => Some(questions.len()),
                _ => None,
            })
            .expect("follow_ups present");
        assert!(follow_up_count <= 3);
    }

    #[tokio::test]
    async fn test_failed_generation_ends_with_single_error() {
        let backend = ScriptedBackend::new(vec![
            Ok(ROUTING_JSON.to_string()),
            Err("model unavailable".to_string()),
        ]);

        let events = collect_events(ctx_with(backend), "Explain binary search").await;
        let tags: Vec<&str> = events.iter().map(tag).collect();

        assert_eq!(tags.last(), Some(&"error"));
        assert_eq!(tags.iter().filter(|t| **t == "error").count(), 1);
        assert_eq!(tags.iter().filter(|t| **t == "complete").count(), 0);
        assert_eq!(tags.iter().filter(|t| **t == "content").count(), 0);
    }

    #[tokio::test]
    async fn test_routing_event_precedes_content() {
        let backend = ScriptedBackend::replying(&[ROUTING_JSON, "short answer", r#"["a"]"#]);

        let events = collect_events(ctx_with(backend), "q").await;
        let tags: Vec<&str> = events.iter().map(tag).collect();
        let routing_at = tags.iter().position(|t| *t == "routing").expect("routing");
        let content_at = tags.iter().position(|t| *t == "content").expect("content");
        assert!(routing_at < content_at);
    }

    #[tokio::test]
    async fn test_disconnected_consumer_stops_production() {
        let backend = ScriptedBackend::replying(&[ROUTING_JSON, "answer", r#"["a"]"#]);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        // Must return promptly instead of producing into the void.
        emit_answer_events(
            ctx_with(backend),
            "q".to_string(),
            None,
            None,
            Vec::new(),
            tx,
        )
        .await;
    }
}
