use crate::cache::RecipeCache;
use crate::store::RecipeSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info, warn};

/// Background task that reloads the recipe cache on a fixed interval
pub struct RefreshScheduler {
    cache: Arc<RecipeCache>,
    source: Arc<dyn RecipeSource>,
    interval_seconds: u64,
}

impl RefreshScheduler {
    pub fn new(cache: Arc<RecipeCache>, source: Arc<dyn RecipeSource>, interval_seconds: u64) -> Self {
        Self {
            cache,
            source,
            interval_seconds,
        }
    }

    /// Start the scheduler in the background. The initial load is the
    /// caller's job, so the first reload happens one interval from now.
    pub fn start(self) -> Option<tokio::task::JoinHandle<()>> {
        if self.interval_seconds == 0 {
            debug!("Recipe refresh disabled");
            return None;
        }

        Some(tokio::spawn(async move {
            info!(
                "Recipe refresh scheduler started with interval: {}s",
                self.interval_seconds
            );

            let mut ticker = interval(Duration::from_secs(self.interval_seconds));
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                debug!("Scheduler tick: reloading recipes");

                if let Err(e) = self.cache.refresh(self.source.as_ref()).await {
                    warn!("Scheduled recipe refresh failed: {}", e.log_safe());
                }
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::Recipe;
    use crate::Result;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource(AtomicUsize);

    #[async_trait]
    impl RecipeSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch_all(&self) -> Result<Vec<Recipe>> {
            let n = self.0.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((0..n).map(|i| Recipe::new(format!("מתכון {i}"), "גוף")).collect())
        }
    }

    #[test]
    fn test_zero_interval_disables() {
        let cache = Arc::new(RecipeCache::new());
        let source: Arc<dyn RecipeSource> = Arc::new(CountingSource(AtomicUsize::new(0)));
        assert!(RefreshScheduler::new(cache, source, 0).start().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reloads_on_interval() {
        let cache = Arc::new(RecipeCache::new());
        let source: Arc<dyn RecipeSource> = Arc::new(CountingSource(AtomicUsize::new(0)));

        let handle = RefreshScheduler::new(cache.clone(), source, 60)
            .start()
            .unwrap();

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(cache.snapshot().len(), 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(cache.snapshot().len(), 2);

        handle.abort();
    }
}
