//! Favorites store: plain membership keyed by metadata id.
use crate::{db::Db, models::Favorite};

pub async fn add(
    db: &Db,
    id: i64,
    title: &str,
    cover_image: Option<&str>,
) -> Result<Favorite, sqlx::Error> {
    let now = chrono::Utc::now().to_rfc3339();

    sqlx::query(
        "INSERT INTO favorites (id, title, cover_image, added_at) VALUES (?, ?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET title=excluded.title, cover_image=excluded.cover_image",
    )
    .bind(id)
    .bind(title)
    .bind(cover_image)
    .bind(&now)
    .execute(db)
    .await?;

    sqlx::query_as("SELECT * FROM favorites WHERE id=?")
        .bind(id)
        .fetch_one(db)
        .await
}

/// Returns whether a row was removed.
pub async fn remove(db: &Db, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM favorites WHERE id=?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn is_favorite(db: &Db, id: i64) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM favorites WHERE id=?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row.is_some())
}

pub async fn list(db: &Db) -> Result<Vec<Favorite>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM favorites ORDER BY added_at DESC, id DESC")
        .fetch_all(db)
        .await
}
