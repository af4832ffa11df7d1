//! Event subscription: named-handler dispatch over decoded SSE frames, and
//! the reqwest-backed stream that feeds it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::client::cache::DashboardCache;
use crate::client::sse::{SseDecoder, SseFrame};
use crate::client::ClientError;
use crate::events::{CONNECTED_EVENT, METRICS_UPDATE_EVENT};
use crate::models::metrics::MetricsSnapshot;

type EventHandler = Box<dyn FnMut(&str) + Send>;

/// Registration of handlers for named events, independent of any transport
/// or renderer. Frames with no handler (or no event name) are dropped.
#[derive(Default)]
pub struct Subscription {
    handlers: HashMap<String, EventHandler>,
}

impl Subscription {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event<F>(&mut self, name: &str, handler: F)
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.handlers.insert(name.to_string(), Box::new(handler));
    }

    pub fn dispatch(&mut self, frame: &SseFrame) {
        let Some(name) = frame.event.as_deref() else {
            return;
        };
        if let Some(handler) = self.handlers.get_mut(name) {
            handler(&frame.data);
        } else {
            tracing::debug!(event = name, "No handler for event, ignoring");
        }
    }
}

/// A live `/api/events` connection feeding a [`DashboardCache`].
///
/// `close` tears down the reader task and is idempotent; it also runs on
/// drop so the channel is released on every exit path. There is no
/// auto-reconnect: after a transport error the page keeps working on
/// last-known cached data.
pub struct DashboardStream {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl DashboardStream {
    pub async fn connect(
        base_url: &str,
        cache: Arc<Mutex<DashboardCache>>,
    ) -> Result<Self, ClientError> {
        let response = reqwest::Client::new()
            .get(format!("{base_url}/api/events"))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        let mut subscription = Subscription::new();
        subscription.on_event(CONNECTED_EVENT, |data| {
            // Diagnostic only; no state change.
            tracing::debug!(payload = data, "Event stream acknowledged by server");
        });
        {
            let cache = cache.clone();
            subscription.on_event(METRICS_UPDATE_EVENT, move |data| {
                match serde_json::from_str::<MetricsSnapshot>(data) {
                    Ok(snapshot) => {
                        let mut cache = cache.lock().expect("cache lock poisoned");
                        cache.apply_push(snapshot);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Dropping malformed metrics-update payload");
                    }
                }
            });
        }

        let cancel = CancellationToken::new();
        let task = tokio::spawn(read_loop(
            response.bytes_stream(),
            subscription,
            cancel.clone(),
        ));

        Ok(Self {
            cancel,
            task: Some(task),
        })
    }

    /// Close the channel. Safe to call multiple times.
    pub fn close(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_none()
    }
}

impl Drop for DashboardStream {
    fn drop(&mut self) {
        self.close();
    }
}

async fn read_loop<S>(byte_stream: S, mut subscription: Subscription, cancel: CancellationToken)
where
    S: futures_util::Stream<Item = reqwest::Result<bytes::Bytes>>,
{
    let mut byte_stream = std::pin::pin!(byte_stream);
    let mut decoder = SseDecoder::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!("Event stream reader cancelled");
                return;
            }
            chunk = byte_stream.next() => match chunk {
                Some(Ok(chunk)) => {
                    for frame in decoder.push(&chunk) {
                        subscription.dispatch(&frame);
                    }
                }
                Some(Err(e)) => {
                    // No reconnect; cached data keeps serving the page.
                    tracing::warn!(error = %e, "Event stream transport error, closing channel");
                    return;
                }
                None => {
                    tracing::info!("Event stream ended by server");
                    return;
                }
            }
        }
    }
}
