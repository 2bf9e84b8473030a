// Chat flow: recipe requests are answered from the cache, everything else
// goes to the completion service.

pub mod intent;

pub use intent::{classify, Intent};

use crate::cache::RecipeCache;
use crate::completion::{ChatMessage, CompletionClient};
use crate::config::Settings;
use crate::matching::RecipeMatcher;
use crate::recipe::{render, RenderedRecipe, Segmenter};
use crate::utils::sanitize::sanitize_html;
use crate::Result;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

/// A found recipe, rendered into lists
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeLookup {
    /// Title of the matched record
    pub title: String,
    pub score: f64,
    pub recipe: RenderedRecipe,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChatReply {
    Recipe(RecipeLookup),
    /// Recipe request with no record at or above the threshold
    NotFound,
    /// Completion text, already sanitized for HTML
    Completion(String),
}

pub struct ChatService {
    cache: Arc<RecipeCache>,
    matcher: RecipeMatcher,
    segmenter: Segmenter,
    completion: Arc<dyn CompletionClient>,
    system_prompt: String,
}

impl ChatService {
    pub fn new(
        cache: Arc<RecipeCache>,
        matcher: RecipeMatcher,
        completion: Arc<dyn CompletionClient>,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            cache,
            matcher,
            segmenter: Segmenter::new(),
            completion,
            system_prompt: system_prompt.into(),
        }
    }

    /// Service wired from settings
    pub fn from_settings(
        settings: &Settings,
        cache: Arc<RecipeCache>,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        let matcher = RecipeMatcher::new(
            settings.matcher.threshold,
            &settings.matcher.featured_keywords,
        );
        Self::new(cache, matcher, completion, settings.completion.system_prompt.clone())
    }

    pub fn cache(&self) -> &Arc<RecipeCache> {
        &self.cache
    }

    /// Look a query up in the current snapshot.
    ///
    /// Never fails: an empty snapshot or an unusable query is simply a miss.
    pub fn lookup(&self, query: &str) -> Option<RecipeLookup> {
        let snapshot = self.cache.snapshot();
        let found = self.matcher.find_best_match(query, &snapshot.recipes)?;

        let segmented = self.segmenter.segment(&found.recipe.raw_text);
        let mut recipe = render(&segmented);
        if recipe.title.is_empty() {
            recipe.title = found.recipe.title.trim().to_string();
        }

        Some(RecipeLookup {
            title: found.recipe.title.clone(),
            score: found.score,
            recipe,
        })
    }

    /// Answer one chat message
    pub async fn reply(&self, message: &str) -> Result<ChatReply> {
        let message = message.trim();

        match classify(message) {
            Intent::Recipe => {
                debug!("Recipe request: {:?}", message);
                Ok(match self.lookup(message) {
                    Some(found) => {
                        info!("Matched recipe {:?} ({:.2})", found.title, found.score);
                        ChatReply::Recipe(found)
                    }
                    None => {
                        info!("No recipe matched {:?}", message);
                        ChatReply::NotFound
                    }
                })
            }
            Intent::General => {
                debug!(
                    "General question, asking {}",
                    self.completion.provider_name()
                );
                let messages = [
                    ChatMessage::system(self.system_prompt.as_str()),
                    ChatMessage::user(message),
                ];
                let text = self.completion.complete(&messages).await?;
                Ok(ChatReply::Completion(sanitize_html(&text)))
            }
        }
    }
}
