use std::sync::Arc;

use log::{error, info};
use mongodb::{Client, Database};
use rocket::fairing::AdHoc;

use crate::services::{DocumentStore, MongoStore};

pub fn init() -> AdHoc {
    AdHoc::try_on_ignite("MongoDB", |rocket| async {
        match connect().await {
            Ok(database) => {
                info!("✓ MongoDB connected successfully");
                let store: DbConn = Arc::new(MongoStore::new(database));
                Ok(rocket.manage(store))
            }
            Err(e) => {
                error!("✗ Failed to connect to MongoDB: {}", e);
                Err(rocket)
            }
        }
    })
}

async fn connect() -> Result<Database, mongodb::error::Error> {
    let uri = crate::config::Config::mongodb_uri();
    let client = Client::with_uri_str(&uri).await?;

    // Test connection
    client
        .database("admin")
        .run_command(mongodb::bson::doc! {"ping": 1}, None)
        .await?;

    Ok(client.database(&crate::config::Config::mongodb_database()))
}

pub type DbConn = Arc<dyn DocumentStore>;
