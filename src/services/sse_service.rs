use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use tokio::sync::{
    broadcast::{self, error::RecvError},
    mpsc,
};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
    auth::Identity,
    dto::sse::{Handshake, ServerEvent},
    error::ServiceError,
    services::room_service::{ensure_participant, load_room},
    state::SharedState,
};

const EVENT_HANDSHAKE: &str = "handshake";

/// Subscribe a participant to the events of one room.
///
/// The receiver is registered before returning so no event published afterwards is missed.
pub async fn subscribe_room(
    state: &SharedState,
    caller: &Identity,
    room_id: Uuid,
) -> Result<broadcast::Receiver<ServerEvent>, ServiceError> {
    let store = state.require_room_store().await?;
    let room = load_room(&store, room_id).await?;
    ensure_participant(&room, &caller.user_id)?;
    Ok(state.events().subscribe())
}

/// Event sent first on every room stream.
pub async fn handshake(state: &SharedState, room_id: Uuid) -> Option<ServerEvent> {
    let payload = Handshake {
        room_id,
        message: "room stream connected".into(),
        degraded: state.is_degraded().await,
    };
    ServerEvent::json(Some(EVENT_HANDSHAKE.to_string()), Some(room_id), &payload).ok()
}

fn to_sse_event(payload: ServerEvent) -> Event {
    let event = Event::default().data(payload.data);
    match payload.event {
        Some(name) => event.event(name),
        None => event,
    }
}

/// Convert a broadcast receiver into an SSE response carrying only the events of `room_id`,
/// cleaning up once the client disconnects.
pub fn to_sse_stream(
    mut receiver: broadcast::Receiver<ServerEvent>,
    room_id: Uuid,
    first: Option<ServerEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    tokio::spawn(async move {
        if let Some(first) = first {
            if tx.send(Ok(to_sse_event(first))).await.is_err() {
                return;
            }
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = receiver.recv() => {
                    match recv_result {
                        Ok(payload) if payload.room_id == Some(room_id) => {
                            if tx.send(Ok(to_sse_event(payload))).await.is_err() {
                                break;
                            }
                        }
                        Ok(_) => continue,
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(skipped)) => {
                            debug!(%room_id, skipped, "room stream lagged");
                            continue;
                        }
                    }
                }
            }
        }

        info!(%room_id, "room SSE stream disconnected");
    });

    let stream = ReceiverStream::new(rx);
    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}
