use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use crate::store::{rows_to_recipes, validate_identifier, RecipeRow, RecipeSource};
use async_trait::async_trait;
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use tracing::debug;

/// Reads the recipe table over a direct database connection.
///
/// Uses the `Any` driver so the same code runs against Postgres in production
/// and SQLite in tests.
pub struct SqlSource {
    pool: AnyPool,
    query: String,
}

impl SqlSource {
    /// Build a lazily connecting pool. Nothing touches the network here:
    /// an unreachable database shows up as an error from `fetch_all`.
    pub fn connect(
        database_url: &str,
        max_connections: u32,
        table: &str,
        text_column: &str,
    ) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect_lazy(database_url)?;

        Self::with_pool(pool, table, text_column)
    }

    pub fn from_config(config: &StoreConfig) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| Error::Config("DATABASE_URL is not set".to_string()))?;

        Self::connect(url, config.max_connections, &config.table, &config.text_column)
    }

    pub fn with_pool(pool: AnyPool, table: &str, text_column: &str) -> Result<Self> {
        let table = validate_identifier(table)?;
        let text_column = validate_identifier(text_column)?;

        Ok(Self {
            pool,
            query: format!("SELECT title, {text_column} FROM {table}"),
        })
    }
}

#[async_trait]
impl RecipeSource for SqlSource {
    fn name(&self) -> &str {
        "sql"
    }

    async fn fetch_all(&self) -> Result<Vec<Recipe>> {
        debug!("SQL recipe load: {}", self.query);

        let rows: Vec<(Option<String>, Option<String>)> = sqlx::query_as(&self.query)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows_to_recipes(
            rows.into_iter()
                .map(|(title, raw_text)| RecipeRow {
                    title,
                    raw_text,
                    ..Default::default()
                })
                .collect(),
        ))
    }
}
