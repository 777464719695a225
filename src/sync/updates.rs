//! Room change notifications behind one capability, fed either by polling or by the in-process
//! event hub.

use std::{fmt::Display, sync::Arc};

use futures::{
    StreamExt,
    future::{self, BoxFuture},
    stream::BoxStream,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
    dao::models::RoomStatus,
    dto::room::RoomDetail,
    error::ServiceError,
    services::{question_service, room_service},
    state::{RoomPhase, SharedState},
    sync::poller::Poller,
};

/// Snapshot of everything a participant waits on in a room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSignal {
    /// Room observed.
    pub room_id: Uuid,
    /// Persisted status.
    pub status: RoomStatus,
    /// Whether the partner slot is bound.
    pub partner_joined: bool,
    /// Participants with a stored question set.
    pub ready_count: usize,
    /// Whether both sets are stored.
    pub ready: bool,
}

impl RoomSignal {
    /// Phase derived from status and partner.
    pub fn phase(&self) -> RoomPhase {
        RoomPhase::of(self.status, self.partner_joined)
    }
}

impl From<&RoomDetail> for RoomSignal {
    fn from(detail: &RoomDetail) -> Self {
        Self {
            room_id: detail.room.id,
            status: detail.room.status,
            partner_joined: detail.room.partner_id.is_some(),
            ready_count: detail.readiness.ready_count,
            ready: detail.readiness.ready,
        }
    }
}

/// Something able to produce the current [`RoomSignal`] of a room on demand.
pub trait RoomSignalSource: Send + Sync + 'static {
    /// Failure reported when no snapshot could be taken.
    type Error: Display + Send + 'static;

    /// Current snapshot of `room_id`.
    fn room_signal(&self, room_id: Uuid) -> BoxFuture<'static, Result<RoomSignal, Self::Error>>;
}

/// Stream of room snapshots, yielding the current one first and then every change.
pub trait RoomUpdates: Send + Sync {
    /// Updates of `room_id`; dropping the stream stops them.
    fn subscribe(&self, room_id: Uuid) -> BoxStream<'static, RoomSignal>;
}

/// Wait for the first signal of `room_id` accepted by `predicate`.
///
/// Returns `None` when the update stream ends first.
pub async fn wait_for<U, P>(updates: &U, room_id: Uuid, mut predicate: P) -> Option<RoomSignal>
where
    U: RoomUpdates + ?Sized,
    P: FnMut(&RoomSignal) -> bool,
{
    let mut stream = updates.subscribe(room_id);
    while let Some(signal) = stream.next().await {
        if predicate(&signal) {
            return Some(signal);
        }
    }
    None
}

/// Updates obtained by querying a [`RoomSignalSource`] on a fixed interval.
pub struct PollingRoomUpdates<S> {
    source: Arc<S>,
    poller: Poller,
}

impl<S: RoomSignalSource> PollingRoomUpdates<S> {
    /// Poll `source` at the cadence of `poller`.
    pub fn new(source: Arc<S>, poller: Poller) -> Self {
        Self { source, poller }
    }
}

impl<S: RoomSignalSource> RoomUpdates for PollingRoomUpdates<S> {
    fn subscribe(&self, room_id: Uuid) -> BoxStream<'static, RoomSignal> {
        let source = self.source.clone();
        let mut last: Option<RoomSignal> = None;

        self.poller
            .stream("room updates", move || source.room_signal(room_id))
            .filter_map(move |signal| {
                let changed = last.as_ref() != Some(&signal);
                if changed {
                    last = Some(signal.clone());
                }
                future::ready(changed.then_some(signal))
            })
            .boxed()
    }
}

/// Reads room signals straight from the installed room store.
#[derive(Clone)]
pub struct ServiceSignalSource {
    state: SharedState,
}

impl ServiceSignalSource {
    /// Source reading through the services of `state`.
    pub fn new(state: SharedState) -> Self {
        Self { state }
    }

    async fn snapshot(state: SharedState, room_id: Uuid) -> Result<RoomSignal, ServiceError> {
        let store = state.require_room_store().await?;
        let room = room_service::load_room(&store, room_id).await?;
        let readiness = question_service::readiness_of(&store, &room, None).await?;
        Ok(RoomSignal {
            room_id,
            status: room.status,
            partner_joined: room.partner_id.is_some(),
            ready_count: readiness.ready_count,
            ready: readiness.ready,
        })
    }
}

impl RoomSignalSource for ServiceSignalSource {
    type Error = ServiceError;

    fn room_signal(&self, room_id: Uuid) -> BoxFuture<'static, Result<RoomSignal, ServiceError>> {
        Box::pin(Self::snapshot(self.state.clone(), room_id))
    }
}

/// Updates pushed by the event hub that also feeds the SSE endpoint.
///
/// Every event of the room triggers a fresh snapshot, so the stream carries the same
/// [`RoomSignal`] values as the polling strategy.
pub struct PushRoomUpdates {
    state: SharedState,
    source: ServiceSignalSource,
}

impl PushRoomUpdates {
    /// Updates driven by the event hub of `state`.
    pub fn new(state: SharedState) -> Self {
        let source = ServiceSignalSource::new(state.clone());
        Self { state, source }
    }
}

impl RoomUpdates for PushRoomUpdates {
    fn subscribe(&self, room_id: Uuid) -> BoxStream<'static, RoomSignal> {
        // Subscribe before the first snapshot so no event between the two is lost.
        let mut receiver = self.state.events().subscribe();
        let source = self.source.clone();

        async_stream::stream! {
            let mut last: Option<RoomSignal> = None;
            let mut refresh = true;

            loop {
                if refresh {
                    match source.room_signal(room_id).await {
                        Ok(signal) => {
                            if last.as_ref() != Some(&signal) {
                                last = Some(signal.clone());
                                yield signal;
                            }
                        }
                        Err(err) => warn!(%room_id, error = %err, "room snapshot failed"),
                    }
                }

                refresh = match receiver.recv().await {
                    Ok(event) => event.room_id == Some(room_id),
                    Err(RecvError::Lagged(skipped)) => {
                        debug!(%room_id, skipped, "room updates lagged; refreshing");
                        true
                    }
                    Err(RecvError::Closed) => break,
                };
            }
        }
        .boxed()
    }
}
