//! MongoDB connection for the movie store.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};
use tracing::info;

use super::models::MovieDocument;

const APP_NAME: &str = "reelcache";
const MOVIES: &str = "movies";

/// Startup fails instead of waiting on an unreachable server.
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle on the database holding the `movies` collection.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect and ping, so a bad URI or a dead server stops startup.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let client = Client::with_options(client_options(uri).await?)?;
        client.database(db_name).run_command(doc! { "ping": 1 }).await?;

        info!("MongoDB reachable, using database {}", db_name);
        Ok(Self {
            db: client.database(db_name),
        })
    }

    pub fn movies(&self) -> Collection<MovieDocument> {
        self.db.collection(MOVIES)
    }
}

async fn client_options(uri: &str) -> mongodb::error::Result<ClientOptions> {
    let mut options = ClientOptions::parse(uri).await?;
    options.app_name.get_or_insert_with(|| APP_NAME.to_string());
    options.server_selection_timeout = Some(SERVER_SELECTION_TIMEOUT);
    Ok(options)
}
