use mongodb::bson::doc;
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Database, IndexModel};

use crate::config::Config;
use crate::models::User;

pub async fn connect(config: &Config) -> Database {
    let client_options = ClientOptions::parse(&config.database_url)
        .await
        .expect("Failed to parse MongoDB connection string");

    let client = Client::with_options(client_options).expect("Failed to initialize MongoDB client");

    client.database(&config.database_name)
}

/// The unique index on `users.email` backs the duplicate-email invariant; a
/// concurrent signup race surfaces as a duplicate-key write error instead of
/// two accounts.
pub async fn ensure_indexes(db: &Database) {
    let index = IndexModel::builder()
        .keys(doc! { "email": 1 })
        .options(IndexOptions::builder().unique(true).build())
        .build();

    db.collection::<User>("users")
        .create_index(index, None)
        .await
        .expect("Failed to create unique email index");
}
