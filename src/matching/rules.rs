use crate::matching::normalize::{NormalizedText, Normalizer};
use std::fmt;

/// One heuristic boost applied on top of the Jaccard base score.
///
/// Rules are pure: the bonus depends only on the normalized query and title.
pub trait ScoringRule: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    fn bonus(&self, query: &NormalizedText, title: &NormalizedText) -> f64;
}

/// Shortest text the substring rules will consider
const MIN_FRAGMENT_CHARS: usize = 2;

fn is_fragment(text: &str) -> bool {
    text.chars().count() >= MIN_FRAGMENT_CHARS
}

/// Every content word of the query appears somewhere in the title.
#[derive(Debug, Clone)]
pub struct AllContentWords {
    pub bonus: f64,
}

impl ScoringRule for AllContentWords {
    fn name(&self) -> &'static str {
        "all_content_words"
    }

    fn bonus(&self, query: &NormalizedText, title: &NormalizedText) -> f64 {
        let words: Vec<&String> = query
            .content_words
            .iter()
            .filter(|w| is_fragment(w))
            .collect();

        if !words.is_empty() && words.iter().all(|w| title.text.contains(w.as_str())) {
            self.bonus
        } else {
            0.0
        }
    }
}

/// The title starts with the query's first content word.
#[derive(Debug, Clone)]
pub struct LeadingWord {
    pub bonus: f64,
}

impl ScoringRule for LeadingWord {
    fn name(&self) -> &'static str {
        "leading_word"
    }

    fn bonus(&self, query: &NormalizedText, title: &NormalizedText) -> f64 {
        match query.content_words.iter().find(|w| is_fragment(w)) {
            Some(first) if title.text.starts_with(first.as_str()) => self.bonus,
            _ => 0.0,
        }
    }
}

/// Query and title contain one another (either direction).
#[derive(Debug, Clone)]
pub struct Containment {
    pub bonus: f64,
}

impl ScoringRule for Containment {
    fn name(&self) -> &'static str {
        "containment"
    }

    fn bonus(&self, query: &NormalizedText, title: &NormalizedText) -> f64 {
        let (q, t) = (query.text.as_str(), title.text.as_str());
        let title_in_query = is_fragment(t) && q.contains(t);
        let query_in_title = is_fragment(q) && t.contains(q);

        if title_in_query || query_in_title {
            self.bonus
        } else {
            0.0
        }
    }
}

/// Small lift for frequently requested dishes. Applied at most once.
#[derive(Debug, Clone)]
pub struct FeaturedKeyword {
    keywords: Vec<String>,
    pub bonus: f64,
}

impl FeaturedKeyword {
    /// Keywords are normalized with the same normalizer the matcher uses
    pub fn new(normalizer: &Normalizer, keywords: &[String], bonus: f64) -> Self {
        let keywords = keywords
            .iter()
            .map(|k| normalizer.normalize_text(k).text)
            .filter(|k| is_fragment(k))
            .collect();
        Self { keywords, bonus }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

impl ScoringRule for FeaturedKeyword {
    fn name(&self) -> &'static str {
        "featured_keyword"
    }

    fn bonus(&self, _query: &NormalizedText, title: &NormalizedText) -> f64 {
        if self
            .keywords
            .iter()
            .any(|k| title.text.contains(k.as_str()))
        {
            self.bonus
        } else {
            0.0
        }
    }
}

pub const ALL_CONTENT_WORDS_BONUS: f64 = 0.30;
pub const LEADING_WORD_BONUS: f64 = 0.10;
pub const CONTAINMENT_BONUS: f64 = 0.20;
pub const FEATURED_KEYWORD_BONUS: f64 = 0.05;

/// Rules in the order they are applied
pub fn default_rules(normalizer: &Normalizer, featured: &[String]) -> Vec<Box<dyn ScoringRule>> {
    vec![
        Box::new(AllContentWords {
            bonus: ALL_CONTENT_WORDS_BONUS,
        }),
        Box::new(LeadingWord {
            bonus: LEADING_WORD_BONUS,
        }),
        Box::new(Containment {
            bonus: CONTAINMENT_BONUS,
        }),
        Box::new(FeaturedKeyword::new(
            normalizer,
            featured,
            FEATURED_KEYWORD_BONUS,
        )),
    ]
}
