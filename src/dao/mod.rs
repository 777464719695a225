/// Domain entities persisted by the room stores.
pub mod models;
/// Room store trait and its backends.
pub mod room_store;
/// Storage abstraction layer errors.
pub mod storage;
