//! Client-side synchronisation: the reusable poll loop, room update strategies and the typed
//! API client driving them.

pub mod client;
pub mod poller;
pub mod updates;

pub use client::{ClientError, ClientResult, QuizClient};
pub use poller::{PollHandle, PollOutcome, Poller};
pub use updates::{
    PollingRoomUpdates, PushRoomUpdates, RoomSignal, RoomSignalSource, RoomUpdates,
    ServiceSignalSource, wait_for,
};
