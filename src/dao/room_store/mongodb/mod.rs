mod error;
mod manager;
mod models;
/// [`RoomStore`](crate::dao::room_store::RoomStore) implementation over the MongoDB driver.
pub mod store;

pub use error::MongoDaoError;
pub use store::MongoRoomStore;
