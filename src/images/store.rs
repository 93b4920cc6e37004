//! SQLite-backed store for generated image records.

use sqlx::SqlitePool;

use super::models::{Image, NewImage};

/// Handle over the images table. Constructed once at startup and shared
/// through application state; tests construct one over an in-memory pool.
#[derive(Debug, Clone)]
pub struct ImageStore {
    pool: SqlitePool,
}

impl ImageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append-only insert; returns the stored row including its timestamp.
    pub async fn create(&self, image: NewImage) -> Result<Image, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO images (id, user_id, prompt, steps, cfg_scale, seed, width, height, file_name, url)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&image.id)
        .bind(&image.user_id)
        .bind(&image.prompt)
        .bind(image.steps)
        .bind(image.cfg_scale)
        .bind(image.seed)
        .bind(image.width)
        .bind(image.height)
        .bind(&image.file_name)
        .bind(&image.url)
        .execute(&self.pool)
        .await?;

        // fetch back
        sqlx::query_as::<_, Image>("SELECT * FROM images WHERE id = ?")
            .bind(&image.id)
            .fetch_one(&self.pool)
            .await
    }

    /// The caller's records, newest first. created_at has one-second
    /// resolution, so rowid breaks same-second ties deterministically.
    pub async fn list_by_user(&self, user_id: &str) -> Result<Vec<Image>, sqlx::Error> {
        sqlx::query_as::<_, Image>(
            "SELECT * FROM images WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Delete every record and report the count. Maintenance use only; not
    /// exposed on any HTTP route.
    pub async fn purge_all(&self) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM images").execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
