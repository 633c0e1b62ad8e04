use anyhow::Context;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};
use tracing::info;

use crate::config::AppConfig;

pub type Db = SqlitePool;

pub async fn connect(config: &AppConfig) -> anyhow::Result<Db> {
    // Ensure the data directory exists
    if let Some(parent) = std::path::Path::new(&config.database_url)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("create DB dir {parent:?}"))?;
    }

    let url = format!("sqlite://{}?mode=rwc", config.database_url);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .with_context(|| format!("connect to SQLite at {}", config.database_url))?;

    run_migrations(&pool, true).await?;

    info!("Database ready at {}", config.database_url);
    Ok(pool)
}

async fn run_migrations(pool: &Db, wal: bool) -> anyhow::Result<()> {
    if wal {
        sqlx::query("PRAGMA journal_mode=WAL;")
            .execute(pool)
            .await
            .context("set WAL mode")?;
    }

    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("run migrations")?;

    Ok(())
}

/// Single-connection in-memory database with migrations applied.
#[cfg(test)]
pub async fn connect_memory() -> Db {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool, false).await.unwrap();
    pool
}
