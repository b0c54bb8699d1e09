//! Real-time job events via Server-Sent Events.

use std::convert::Infallible;

use actors::PrintDesk;
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures_util::Stream;
use printflow_core::JobEvent;
use tokio::sync::broadcast::error::RecvError;

fn event_name(json: &serde_json::Value) -> &str {
    json.get("event")
        .and_then(|v| v.as_str())
        .unwrap_or("message")
}

/// Format an event for SSE; the event name is the serde tag.
pub fn sse_event(event: &JobEvent) -> Event {
    let json = serde_json::to_value(event).unwrap_or_default();
    Event::default()
        .event(event_name(&json))
        .data(json.to_string())
}

/// Stream every queue event published after the client connects.
pub async fn event_stream(
    State(desk): State<PrintDesk>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = desk.subscribe();

    let stream = futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) => return Some((Ok(sse_event(&event)), rx)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods)]

    use super::*;
    use chrono::Utc;
    use printflow_core::TicketId;

    #[test]
    fn sse_event_is_named_after_the_event_tag() {
        let event = JobEvent::DocumentRenamed {
            ticket: TicketId(1001),
            old_name: "essay.pdf".into(),
            new_name: "report.pdf".into(),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(event_name(&json), "document_renamed");
        assert_eq!(event_name(&serde_json::Value::Null), "message");
    }
}
