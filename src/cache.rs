use crate::recipe::Recipe;
use crate::store::RecipeSource;
use crate::Result;
use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Immutable set of records the matcher reads from
#[derive(Debug, Clone, Default)]
pub struct RecipeSnapshot {
    pub recipes: Vec<Recipe>,
    /// `None` until the first successful load
    pub loaded_at: Option<DateTime<Utc>>,
}

impl RecipeSnapshot {
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded_at.is_some()
    }
}

/// In-memory recipe cache.
///
/// Readers take an `Arc` to the current snapshot and keep it for the whole
/// request; a reload publishes a new snapshot with a single pointer swap.
#[derive(Debug, Default)]
pub struct RecipeCache {
    current: ArcSwap<RecipeSnapshot>,
}

impl RecipeCache {
    /// Empty, not-yet-loaded cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache pre-filled with a fixed record set
    pub fn with_recipes(recipes: Vec<Recipe>) -> Self {
        let cache = Self::new();
        cache.replace(recipes);
        cache
    }

    pub fn snapshot(&self) -> Arc<RecipeSnapshot> {
        self.current.load_full()
    }

    /// Publish a new snapshot and return the one it replaced
    pub fn replace(&self, recipes: Vec<Recipe>) -> Arc<RecipeSnapshot> {
        self.current.swap(Arc::new(RecipeSnapshot {
            recipes,
            loaded_at: Some(Utc::now()),
        }))
    }

    /// Fetch every record from `source` and swap it in.
    ///
    /// On failure the current snapshot stays in place.
    pub async fn refresh(&self, source: &dyn RecipeSource) -> Result<usize> {
        info!("Loading recipes from {}", source.name());

        match source.fetch_all().await {
            Ok(recipes) => {
                let count = recipes.len();
                self.replace(recipes);
                info!("Loaded {} recipes from {}", count, source.name());
                Ok(count)
            }
            Err(e) => {
                warn!(
                    "Recipe load from {} failed, keeping {} cached recipes: {}",
                    source.name(),
                    self.snapshot().len(),
                    e.log_safe()
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;

    struct FixedSource(Vec<Recipe>);

    #[async_trait]
    impl RecipeSource for FixedSource {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_all(&self) -> Result<Vec<Recipe>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl RecipeSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch_all(&self) -> Result<Vec<Recipe>> {
            Err(Error::Store("unavailable".to_string()))
        }
    }

    #[test]
    fn test_new_cache_is_empty_and_unloaded() {
        let cache = RecipeCache::new();
        let snapshot = cache.snapshot();
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_loaded());
    }

    #[test]
    fn test_swap_keeps_old_snapshot_intact() {
        let cache = RecipeCache::with_recipes(vec![Recipe::new("עוגת גזר", "גזר")]);
        let before = cache.snapshot();

        let replaced = cache.replace(vec![
            Recipe::new("חומוס", "חומוס"),
            Recipe::new("טחינה", "טחינה"),
        ]);

        // A reader holding the old snapshot still sees the old records
        assert_eq!(before.len(), 1);
        assert_eq!(before.recipes[0].title, "עוגת גזר");
        assert!(Arc::ptr_eq(&before, &replaced));
        assert_eq!(cache.snapshot().len(), 2);
    }

    #[tokio::test]
    async fn test_refresh_from_source() {
        let cache = RecipeCache::new();
        let source = FixedSource(vec![Recipe::new("בראוניז", "בראוניז")]);

        let count = cache.refresh(&source).await.unwrap();
        assert_eq!(count, 1);
        assert!(cache.snapshot().is_loaded());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_snapshot() {
        let cache = RecipeCache::with_recipes(vec![Recipe::new("בראוניז", "בראוניז")]);

        assert!(cache.refresh(&FailingSource).await.is_err());
        assert_eq!(cache.snapshot().len(), 1);
    }
}
