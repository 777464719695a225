use std::{sync::Arc, time::Duration};

use mongodb::{
    Client, Database, IndexModel,
    bson::{Document, doc},
    options::{ClientOptions, IndexOptions},
};
use tokio::{sync::RwLock, time::sleep};
use tracing::info;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DB: &str = "partner_quiz";
const MAX_CONNECT_ATTEMPTS: u32 = 10;
const BASE_RETRY_DELAY_MS: u64 = 250;

pub(super) const ROOMS: &str = "rooms";
pub(super) const INVITES: &str = "invites";
pub(super) const QUESTION_SETS: &str = "question_sets";
pub(super) const ANSWERS: &str = "answers";

/// Shared handle on the MongoDB client that can be swapped on reconnect.
#[derive(Clone)]
pub struct MongoManager {
    inner: Arc<MongoManagerInner>,
}

struct MongoManagerInner {
    state: RwLock<MongoState>,
    options: ClientOptions,
    database_name: String,
}

struct MongoState {
    client: Client,
    database: Database,
}

/// Connect to MongoDB, retrying the initial ping with exponential backoff.
pub async fn connect(uri: &str, db_name: Option<&str>) -> MongoResult<MongoManager> {
    let database_name = db_name.unwrap_or(DEFAULT_DB).to_owned();
    let options = ClientOptions::parse(uri)
        .await
        .map_err(|source| MongoDaoError::InvalidUri {
            uri: uri.to_owned(),
            source,
        })?;

    let (client, database) = establish_connection(&options, &database_name).await?;

    Ok(MongoManager {
        inner: Arc::new(MongoManagerInner {
            state: RwLock::new(MongoState { client, database }),
            options,
            database_name,
        }),
    })
}

/// Ensure the unique indexes backing the natural keys of the protocol are present.
pub async fn ensure_indexes(database: &Database) -> MongoResult<()> {
    create_index(database, QUESTION_SETS, "room_author_unique", doc! {"room_id": 1, "author_id": 1}, true).await?;
    create_index(
        database,
        ANSWERS,
        "room_user_question_unique",
        doc! {"room_id": 1, "user_id": 1, "question_id": 1},
        true,
    )
    .await?;
    create_index(database, INVITES, "invitee_status_idx", doc! {"invitee_email": 1, "status": 1}, false).await?;
    create_index(database, ROOMS, "creator_idx", doc! {"creator_id": 1}, false).await?;
    create_index(database, ROOMS, "partner_idx", doc! {"partner_id": 1}, false).await?;
    Ok(())
}

async fn create_index(
    database: &Database,
    collection: &'static str,
    index: &'static str,
    keys: Document,
    unique: bool,
) -> MongoResult<()> {
    let model = IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .name(Some(index.to_string()))
                .unique(Some(unique))
                .build(),
        )
        .build();
    database
        .collection::<Document>(collection)
        .create_index(model)
        .await
        .map_err(|source| MongoDaoError::EnsureIndex {
            collection,
            index,
            source,
        })?;
    Ok(())
}

impl MongoManager {
    /// Clone the current database handle.
    pub async fn database(&self) -> Database {
        let guard = self.inner.state.read().await;
        guard.database.clone()
    }

    /// Issue a ping against the current MongoDB connection.
    pub async fn ping(&self) -> MongoResult<()> {
        self.database()
            .await
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    /// Replace the client with a freshly established connection.
    pub async fn reconnect(&self) -> MongoResult<()> {
        let (client, database) =
            establish_connection(&self.inner.options, &self.inner.database_name).await?;
        let mut guard = self.inner.state.write().await;
        guard.client = client;
        guard.database = database;
        info!("MongoDB connection re-established");
        Ok(())
    }
}

async fn establish_connection(
    options: &ClientOptions,
    database_name: &str,
) -> MongoResult<(Client, Database)> {
    let client = Client::with_options(options.clone())
        .map_err(|source| MongoDaoError::ClientConstruction { source })?;
    let database = client.database(database_name);

    let mut attempts = 0;
    let mut delay = Duration::from_millis(BASE_RETRY_DELAY_MS);

    loop {
        match database.run_command(doc! { "ping": 1 }).await {
            Ok(_) => break,
            Err(err) => {
                attempts += 1;
                if attempts >= MAX_CONNECT_ATTEMPTS {
                    return Err(MongoDaoError::InitialPing {
                        attempts,
                        source: err,
                    });
                }
                sleep(delay).await;
                delay = (delay * 2).min(Duration::from_secs(5));
            }
        }
    }

    Ok((client, database))
}
