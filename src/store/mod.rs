// Record store clients: bulk fetch of recipe rows at startup and on refresh

pub mod scheduler;
pub mod sql;
pub mod supabase;

pub use scheduler::RefreshScheduler;
pub use sql::SqlSource;
pub use supabase::{SupabaseSource, TableReport};

use crate::config::{SourceKind, StoreConfig};
use crate::error::{Error, Result};
use crate::recipe::Recipe;
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tracing::debug;

/// Anything that can hand over the full recipe table in load order
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// Short label for logs
    fn name(&self) -> &str;

    async fn fetch_all(&self) -> Result<Vec<Recipe>>;
}

/// One row of the recipe table. Older exports keep the body under `raw` or
/// `full_text`; `raw_text` wins when several are present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeRow {
    pub title: Option<String>,
    pub raw_text: Option<String>,
    pub raw: Option<String>,
    pub full_text: Option<String>,
}

impl RecipeRow {
    /// `None` when the row has no body text at all
    pub fn into_recipe(self) -> Option<Recipe> {
        let body = [self.raw_text, self.raw, self.full_text]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())?;

        Some(Recipe::new(self.title.unwrap_or_default(), body))
    }
}

/// Convert rows, dropping those without a body, keeping order
pub fn rows_to_recipes(rows: Vec<RecipeRow>) -> Vec<Recipe> {
    let total = rows.len();
    let recipes: Vec<Recipe> = rows.into_iter().filter_map(RecipeRow::into_recipe).collect();

    if recipes.len() < total {
        debug!(
            "Dropped {} recipe rows without body text",
            total - recipes.len()
        );
    }
    recipes
}

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)?$")
        .expect("identifier pattern is valid")
});

/// Table and column names are spliced into SQL and URLs, so only plain
/// identifiers (optionally schema-qualified) are accepted
pub fn validate_identifier(name: &str) -> Result<&str> {
    if IDENTIFIER_RE.is_match(name) {
        Ok(name)
    } else {
        Err(Error::Validation(format!("Invalid identifier: {name}")))
    }
}

/// Build the configured source. Neither source connects until the first fetch.
pub fn source_from_config(config: &StoreConfig) -> Result<Arc<dyn RecipeSource>> {
    match config.kind {
        SourceKind::Supabase => Ok(Arc::new(SupabaseSource::from_config(config)?)),
        SourceKind::Sql => Ok(Arc::new(SqlSource::from_config(config)?)),
    }
}
