use std::time::Duration;

use groupframe_config::{DatabaseSettings, Settings};
use mongodb::{Client, Database, options::ClientOptions};
use tracing::info;

pub async fn connect(settings: &Settings) -> Result<Database, mongodb::error::Error> {
    connect_named(&settings.database, &settings.database.name).await
}

/// Connects using the pool settings from `database` but opens `db_name`,
/// which lets test fixtures get an isolated database per run.
pub async fn connect_named(
    database: &DatabaseSettings,
    db_name: &str,
) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse(&database.url).await?;

    client_options.app_name = Some("groupframe".to_string());
    client_options.server_selection_timeout = Some(Duration::from_secs(10));
    if let Some(max_pool) = database.max_pool_size {
        client_options.max_pool_size = Some(max_pool);
    }
    if let Some(min_pool) = database.min_pool_size {
        client_options.min_pool_size = Some(min_pool);
    }

    let client = Client::with_options(client_options)?;

    client
        .database("admin")
        .run_command(bson::doc! { "ping": 1 })
        .await?;

    info!(db = %db_name, "Connected to MongoDB");

    Ok(client.database(db_name))
}
