// Fuzzy recipe matching: query normalization, scoring rules and best-match selection

pub mod matcher;
pub mod normalize;
pub mod rules;

// Re-exports
pub use matcher::{
    RecipeMatch, RecipeMatcher, RuleBonus, ScoreBreakdown, DEFAULT_FEATURED_KEYWORDS,
    DEFAULT_THRESHOLD,
};
pub use normalize::{canonical_words, canonicalize, NormalizedText, Normalizer, TokenSet};
pub use rules::{default_rules, ScoringRule};
