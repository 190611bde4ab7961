use std::convert::Infallible;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use futures::stream;
use tokio::sync::broadcast::error::RecvError;

use crate::bridge::BridgeClient;
use crate::state::AppState;

/// Server-sent events for one editor page. The page counts as a print
/// host for as long as this stream stays open, and receives print requests
/// while it is the most recently connected page.
pub async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let client = state.bridge.connect();

    let stream = stream::unfold(client, |mut client: BridgeClient| async move {
        loop {
            match client.recv().await {
                Ok(event) => {
                    let sse = Event::default()
                        .event(event.name())
                        .json_data(&event)
                        .unwrap_or_else(|_| Event::default().event(event.name()));
                    return Some((Ok(sse), client));
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "editor page fell behind on events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(15)))
}
