//! SSE endpoint. Each connection registers a push channel, receives one
//! `connected` frame before anything else, then relays broadcast frames
//! until the client goes away. Disconnect is detected by the response
//! stream being dropped, which unregisters the channel.

use std::convert::Infallible;

use axum::extract::State;
use axum::http::header;
use axum::response::sse::{Event, Sse};
use axum::response::IntoResponse;
use chrono::Utc;
use serde_json::json;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_stream::StreamExt;

use crate::events::{ChannelId, ConnectionRegistry, PushFrame, CONNECTED_EVENT};
use crate::AppState;

/// Unregisters the channel when the response stream is dropped, on every
/// exit path (client disconnect, write error, server shutdown).
struct ChannelGuard {
    registry: ConnectionRegistry,
    id: ChannelId,
}

impl Drop for ChannelGuard {
    fn drop(&mut self) {
        self.registry.unregister(self.id);
    }
}

fn to_sse_event(frame: PushFrame) -> Event {
    Event::default().event(frame.event).data(frame.data)
}

/// GET /api/events
pub async fn events(State(state): State<AppState>) -> impl IntoResponse {
    let (id, rx) = state.registry.register();
    tracing::info!(
        handler = "events",
        connections = state.registry.connection_count(),
        "Handler: GET /api/events — channel open"
    );

    let guard = ChannelGuard {
        registry: state.registry.clone(),
        id,
    };

    // The acknowledgement is the first frame on the wire, ahead of any
    // update already queued on the channel.
    let connected = PushFrame {
        event: CONNECTED_EVENT.to_string(),
        data: json!({ "time": Utc::now().to_rfc3339() }).to_string(),
    };

    let updates = UnboundedReceiverStream::new(rx).map(move |frame| {
        // Guard lives as long as the stream does.
        let _held = &guard;
        Ok::<Event, Infallible>(to_sse_event(frame))
    });
    let stream = tokio_stream::once(Ok(to_sse_event(connected))).chain(updates);

    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(stream),
    )
}
