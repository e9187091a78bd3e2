use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite, SqlitePool};
use std::path::Path;
use tracing::info;

pub type DbPool = Pool<Sqlite>;

#[derive(Clone)]
pub struct ConnectionPool {
    pool: SqlitePool,
}

impl ConnectionPool {
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        info!("Database connected: {}", database_url);

        Ok(Self { pool })
    }

    /// Opens (creating if needed) the database file at `path`.
    pub async fn open_file(path: &Path, max_connections: u32) -> Result<Self, sqlx::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        Self::new(&url, max_connections).await
    }

    pub async fn from_memory() -> Result<Self, sqlx::Error> {
        // A single connection keeps every caller on the same in-memory database.
        Self::new("sqlite::memory:", 1).await
    }

    pub fn get_pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
