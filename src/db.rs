use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::db_storage::APPLICANTS_SCHEMA;

pub struct Database {
    pub pool: PgPool,
}

impl Database {
    pub async fn new(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::query("SELECT 1").execute(&pool).await?;

        Ok(Self { pool })
    }

    /// Create the applicants table if it does not exist yet.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        sqlx::query(APPLICANTS_SCHEMA).execute(&self.pool).await?;
        tracing::info!("Applicants table ready");
        Ok(())
    }
}
