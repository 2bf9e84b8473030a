use crate::matching::normalize::{NormalizedText, Normalizer};
use crate::matching::rules::{default_rules, ScoringRule};
use crate::recipe::Recipe;
use serde::Serialize;
use tracing::debug;

/// Minimum score for a record to count as found
pub const DEFAULT_THRESHOLD: f64 = 0.25;

/// Dish keywords that get the featured-keyword lift by default
pub const DEFAULT_FEATURED_KEYWORDS: &[&str] = &["שוקולד"];

/// Best-scoring record for a query
#[derive(Debug, Clone, Copy)]
pub struct RecipeMatch<'a> {
    pub recipe: &'a Recipe,
    /// Position of the record in the scanned slice
    pub index: usize,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleBonus {
    pub rule: &'static str,
    pub bonus: f64,
}

/// Per-rule account of how a score was reached
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub base: f64,
    /// Rules that contributed a non-zero bonus, in application order
    pub bonuses: Vec<RuleBonus>,
    /// Clamped to [0, 1]
    pub total: f64,
}

/// Scores cached recipe titles against a free-text query.
#[derive(Debug)]
pub struct RecipeMatcher {
    normalizer: Normalizer,
    rules: Vec<Box<dyn ScoringRule>>,
    threshold: f64,
}

impl Default for RecipeMatcher {
    fn default() -> Self {
        let featured: Vec<String> = DEFAULT_FEATURED_KEYWORDS
            .iter()
            .map(|k| k.to_string())
            .collect();
        Self::new(DEFAULT_THRESHOLD, &featured)
    }
}

impl RecipeMatcher {
    /// Matcher with the built-in vocabulary and the default rule set
    pub fn new(threshold: f64, featured_keywords: &[String]) -> Self {
        let normalizer = Normalizer::new();
        let rules = default_rules(&normalizer, featured_keywords);
        Self::with_rules(normalizer, rules, threshold)
    }

    pub fn with_rules(
        normalizer: Normalizer,
        rules: Vec<Box<dyn ScoringRule>>,
        threshold: f64,
    ) -> Self {
        Self {
            normalizer,
            rules,
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Score a single title against an already-normalized query
    pub fn score(&self, query: &NormalizedText, title: &str) -> f64 {
        self.breakdown(query, title).total
    }

    /// Score a title and report which rules fired
    pub fn explain(&self, query: &str, title: &str) -> ScoreBreakdown {
        let query = self.normalizer.normalize_text(query);
        self.breakdown(&query, title)
    }

    fn breakdown(&self, query: &NormalizedText, title: &str) -> ScoreBreakdown {
        let title = self.normalizer.normalize_text(title);
        let base = query.tokens.jaccard(&title.tokens);

        let bonuses: Vec<RuleBonus> = self
            .rules
            .iter()
            .map(|rule| RuleBonus {
                rule: rule.name(),
                bonus: rule.bonus(query, &title),
            })
            .filter(|b| b.bonus != 0.0)
            .collect();

        let total = bonuses.iter().fold(base, |acc, b| acc + b.bonus);

        ScoreBreakdown {
            base,
            bonuses,
            total: total.clamp(0.0, 1.0),
        }
    }

    /// Find the highest-scoring record at or above the threshold.
    ///
    /// An empty query token set or an empty record slice is a miss. Ties keep
    /// the earliest record.
    pub fn find_best_match<'a>(&self, query: &str, recipes: &'a [Recipe]) -> Option<RecipeMatch<'a>> {
        let normalized = self.normalizer.normalize_text(query);
        if normalized.tokens.is_empty() || recipes.is_empty() {
            debug!("Nothing to match (query tokens: {}, records: {})", normalized.tokens.len(), recipes.len());
            return None;
        }

        let mut best: Option<RecipeMatch<'a>> = None;
        for (index, recipe) in recipes.iter().enumerate() {
            let score = self.score(&normalized, &recipe.title);
            if best.map_or(true, |b| score > b.score) {
                best = Some(RecipeMatch {
                    recipe,
                    index,
                    score,
                });
            }
        }

        let best = best?;
        if best.score >= self.threshold {
            debug!(
                "Best match {:?} (index {}) scored {:.3}",
                best.recipe.title, best.index, best.score
            );
            Some(best)
        } else {
            debug!(
                "Best candidate {:?} scored {:.3}, below threshold {:.2}",
                best.recipe.title, best.score, self.threshold
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipes(titles: &[&str]) -> Vec<Recipe> {
        titles
            .iter()
            .map(|t| Recipe::new(*t, format!("{t}\nמצרכים\nקמח")))
            .collect()
    }

    #[test]
    fn test_picks_best_title() {
        let matcher = RecipeMatcher::default();
        let records = recipes(&["עוגת גזר", "עוגיות שוקולד צ׳יפס", "פשטידת תרד"]);

        let found = matcher
            .find_best_match("תני לי מתכון לעוגיות שוקולד", &records)
            .unwrap();
        assert_eq!(found.index, 1);
        assert!(found.score <= 1.0);
    }

    #[test]
    fn test_empty_inputs_are_misses() {
        let matcher = RecipeMatcher::default();
        let records = recipes(&["עוגת גזר"]);

        assert!(matcher.find_best_match("", &records).is_none());
        assert!(matcher.find_best_match("   ", &records).is_none());
        assert!(matcher.find_best_match("מתכון טבעוני", &records).is_none());
        assert!(matcher.find_best_match("עוגת גזר", &[]).is_none());
    }

    #[test]
    fn test_score_is_clamped() {
        let matcher = RecipeMatcher::default();
        let breakdown = matcher.explain("עוגת שוקולד", "עוגת שוקולד");

        assert_eq!(breakdown.base, 1.0);
        assert_eq!(breakdown.total, 1.0);
        let fired: Vec<&str> = breakdown.bonuses.iter().map(|b| b.rule).collect();
        assert_eq!(
            fired,
            vec!["all_content_words", "leading_word", "containment", "featured_keyword"]
        );
    }

    #[test]
    fn test_ties_keep_first_record() {
        let matcher = RecipeMatcher::default();
        let records = recipes(&["עוגת גזר", "עוגת גזר"]);

        let found = matcher.find_best_match("עוגת גזר", &records).unwrap();
        assert_eq!(found.index, 0);
    }

    #[test]
    fn test_rules_can_be_disabled() {
        let matcher = RecipeMatcher::with_rules(Normalizer::new(), Vec::new(), 0.5);
        let breakdown = matcher.explain("עוגת גזר", "עוגת גזר ואגוזים");

        assert!(breakdown.bonuses.is_empty());
        assert_eq!(breakdown.total, breakdown.base);
    }
}
