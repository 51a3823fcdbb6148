use std::{convert::Infallible, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures_core::stream::Stream;
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::main_lib::AppState;

/// Streams the household's domain events so clients can drop stale reads.
async fn stream_events(
    Path(household_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let receiver = BroadcastStream::new(state.event_hub.subscribe(&household_id));
    let stream = tokio_stream::StreamExt::filter_map(receiver, |event| match event {
        Ok(evt) => match SseEvent::default().event(evt.name()).json_data(&evt) {
            Ok(sse_event) => Some(Ok(sse_event)),
            Err(err) => {
                tracing::error!("Failed to serialize SSE payload for {}: {}", evt.name(), err);
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(skipped)) => {
            tracing::warn!("Event stream lagged, {} events skipped", skipped);
            None
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/events", get(stream_events))
}
