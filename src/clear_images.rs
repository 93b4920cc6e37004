// clear_images.rs
// Maintenance utility that purges every generated image record.
// Files under the uploads directory are left in place; only rows go.
#![allow(dead_code)]

#[path = "images/models.rs"]
mod models;
#[path = "images/store.rs"]
mod store;

use dotenv::dotenv;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{env, str::FromStr};

use store::ImageStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://text2img.db".to_string());

    let connect_options = SqliteConnectOptions::from_str(&database_url)?;
    let pool = SqlitePoolOptions::new()
        .connect_with(connect_options)
        .await?;

    let store = ImageStore::new(pool);
    let deleted = store.purge_all().await?;

    println!("Deleted {} images", deleted);

    Ok(())
}
