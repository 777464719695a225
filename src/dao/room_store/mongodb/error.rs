use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

use crate::dao::storage::StorageError;

/// Result alias for MongoDB backend operations.
pub type MongoResult<T> = std::result::Result<T, MongoDaoError>;

/// Failures of the MongoDB backend, converted into [`StorageError`] at the trait boundary.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// URI as configured.
        uri: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The driver refused the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// The server never answered the startup ping.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Pings sent before giving up.
        attempts: u32,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A periodic ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index name.
        index: &'static str,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A room insert or conditional update failed.
    #[error("failed to write room `{id}`")]
    WriteRoom {
        /// Record id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading a room failed.
    #[error("failed to load room data for `{id}`")]
    LoadRoom {
        /// Record id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing rooms failed.
    #[error("failed to query rooms")]
    QueryRooms {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An invite insert or update failed.
    #[error("failed to write invite `{id}`")]
    WriteInvite {
        /// Record id.
        id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Listing invites failed.
    #[error("failed to query invites")]
    QueryInvites {
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// A question set upsert failed.
    #[error("failed to write questions of `{author_id}` for room `{room_id}`")]
    WriteQuestions {
        /// Room the records belong to.
        room_id: Uuid,
        /// Author of the set.
        author_id: String,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading question sets failed.
    #[error("failed to load question sets of room `{room_id}`")]
    LoadQuestions {
        /// Room the records belong to.
        room_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// Reading or counting answers failed.
    #[error("failed to load answers of room `{room_id}`")]
    LoadAnswers {
        /// Room the records belong to.
        room_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
    /// An answer insert failed for a reason other than a duplicate.
    #[error("failed to write answer for room `{room_id}`")]
    WriteAnswer {
        /// Room the records belong to.
        room_id: Uuid,
        /// Driver error.
        #[source]
        source: MongoError,
    },
}

impl From<MongoDaoError> for StorageError {
    fn from(err: MongoDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    fn offline() -> MongoError {
        MongoError::from(io::Error::other("connection reset"))
    }

    #[test]
    fn load_errors_name_the_collection_that_failed() {
        let room_id = Uuid::nil();
        let questions = StorageError::from(MongoDaoError::LoadQuestions {
            room_id,
            source: offline(),
        });
        let answers = StorageError::from(MongoDaoError::LoadAnswers {
            room_id,
            source: offline(),
        });

        assert!(questions.to_string().contains("question sets"));
        assert!(answers.to_string().contains("answers"));
        assert!(!answers.to_string().contains("room data"));
    }
}
