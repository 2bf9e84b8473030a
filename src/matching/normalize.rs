use std::collections::{BTreeSet, HashMap, HashSet};

/// Words that carry no signal for recipe identity: prepositions, conjunctions,
/// request phrasing and generic diet descriptors (every recipe on the blog is vegan).
const STOPWORDS: &[&str] = &[
    // Hebrew
    "של", "עם", "ללא", "בלי", "את", "על", "או", "גם", "וגם", "עבור", "בשביל", "לי", "אני",
    "רוצה", "בבקשה", "תני", "תן", "איך", "מכינים", "להכין", "בא", "מתכון", "מתכונים", "יש",
    "טבעוני", "טבעונית", "טבעוניים", "טבעוניות", "צמחוני", "צמחונית", "בריא", "בריאה", "ביתי",
    "ביתית", "הכי", "טעים", "טעימה", "טעימות", "מושלם", "מושלמת", "קל", "קלה", "מהיר", "מהירה",
    // English
    "the", "a", "an", "and", "or", "of", "with", "without", "for", "to", "my", "me", "i",
    "please", "recipe", "recipes", "vegan", "healthy", "easy", "quick", "how", "make", "give",
];

/// Canonical key followed by the terms that should match it.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("עוגיות", &["עוגייה", "עוגיה", "עוגיית", "קוקיז", "cookie", "cookies"]),
    ("עוגה", &["עוגת", "עוגות", "cake", "cakes"]),
    ("שוקולד", &["שוקו", "chocolate"]),
    ("בראוניז", &["בראוני", "brownie", "brownies"]),
    ("מאפינס", &["מאפין", "muffin", "muffins"]),
    ("פנקייק", &["פנקייקים", "פנקייקס", "pancake", "pancakes"]),
    ("גלידה", &["גלידות", "icecream", "gelato"]),
    ("לחם", &["לחמים", "bread"]),
    ("חומוס", &["hummus"]),
    ("טחינה", &["tahini"]),
    ("עדשים", &["lentil", "lentils"]),
];

/// Single letters Hebrew attaches to the front of a word (and, the, to, in, from, that, as)
const HEBREW_PREFIXES: &[char] = &['ו', 'ה', 'ל', 'ב', 'מ', 'ש', 'כ'];

/// Normalized, stopword-filtered, synonym-expanded set of words.
///
/// Backed by an ordered set so iteration (and therefore `to_text`) is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet(BTreeSet<String>);

impl TokenSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: impl Into<String>) -> bool {
        self.0.insert(token.into())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Jaccard index: |A ∩ B| / |A ∪ B|, 0 when both sets are empty.
    pub fn jaccard(&self, other: &TokenSet) -> f64 {
        let intersection = self.0.intersection(&other.0).count();
        let union = self.len() + other.len() - intersection;
        if union == 0 {
            return 0.0;
        }
        intersection as f64 / union as f64
    }

    /// Space-joined tokens, suitable for feeding back into the normalizer.
    pub fn to_text(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(" ")
    }
}

impl FromIterator<String> for TokenSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Normalized view of a query or title used by the matcher.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedText {
    /// Canonical words with quotes stripped and every synonym replaced by its key.
    pub text: String,
    /// Words of `text` that are not stopwords, in their original order.
    pub content_words: Vec<String>,
    /// Synonym-expanded token set.
    pub tokens: TokenSet,
}

/// Canonicalizes free text into comparable tokens.
#[derive(Debug, Clone)]
pub struct Normalizer {
    stopwords: HashSet<String>,
    /// Each group starts with its canonical key
    groups: Vec<Vec<String>>,
    group_of: HashMap<String, usize>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer with the built-in stopword and synonym tables
    pub fn new() -> Self {
        Self::with_vocabulary(STOPWORDS, SYNONYMS)
    }

    /// Build a normalizer from custom tables. Entries are normalized on the way in,
    /// so they may be written with final letters or mixed case. A term listed in
    /// more than one synonym group stays in the first one, and synonym terms are
    /// never treated as stopwords.
    pub fn with_vocabulary(stopwords: &[&str], synonyms: &[(&str, &[&str])]) -> Self {
        let mut groups: Vec<Vec<String>> = Vec::new();
        let mut group_of = HashMap::new();

        for (key, members) in synonyms {
            let Some(key) = single_word(key) else {
                continue;
            };
            if group_of.contains_key(&key) {
                continue;
            }

            let index = groups.len();
            let mut group = vec![key.clone()];
            group_of.insert(key, index);

            for member in members.iter().filter_map(|m| single_word(m)) {
                if group_of.contains_key(&member) {
                    continue;
                }
                group_of.insert(member.clone(), index);
                group.push(member);
            }
            groups.push(group);
        }

        let stopwords = stopwords
            .iter()
            .filter_map(|w| single_word(w))
            .filter(|w| !group_of.contains_key(w))
            .collect();

        Self {
            stopwords,
            groups,
            group_of,
        }
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        self.stopwords.contains(word)
    }

    /// Canonical synonym key for an already-canonical word
    pub fn synonym_key(&self, word: &str) -> Option<&str> {
        self.group_index(word)
            .map(|index| self.groups[index][0].as_str())
    }

    /// Group lookup that also folds one attached prefix letter ("לעוגיות" -> "עוגיות"),
    /// but only onto words that are in the synonym table.
    fn group_index(&self, word: &str) -> Option<usize> {
        if let Some(&index) = self.group_of.get(word) {
            return Some(index);
        }

        let mut chars = word.chars();
        let first = chars.next()?;
        let rest = chars.as_str();
        if HEBREW_PREFIXES.contains(&first) && rest.chars().count() >= 2 {
            return self.group_of.get(rest).copied();
        }
        None
    }

    /// Normalize text into a synonym-expanded token set.
    ///
    /// Empty or whitespace-only input yields an empty set.
    pub fn normalize(&self, text: &str) -> TokenSet {
        self.expand(&canonical_words(text))
    }

    /// Normalize text into the full view the matcher scores against.
    pub fn normalize_text(&self, text: &str) -> NormalizedText {
        let words = canonical_words(text);
        let tokens = self.expand(&words);

        let mut keyed = Vec::with_capacity(words.len());
        let mut content_words = Vec::new();
        for word in &words {
            let key = self.synonym_key(word).unwrap_or(word).to_string();
            if !self.is_stopword(word) {
                content_words.push(key.clone());
            }
            keyed.push(key);
        }

        NormalizedText {
            text: keyed.join(" "),
            content_words,
            tokens,
        }
    }

    fn expand(&self, words: &[String]) -> TokenSet {
        let mut tokens = TokenSet::new();
        for word in words {
            if self.is_stopword(word) {
                continue;
            }
            match self.group_index(word) {
                Some(index) => {
                    for term in &self.groups[index] {
                        tokens.insert(term.clone());
                    }
                }
                None => {
                    tokens.insert(word.clone());
                }
            }
        }
        tokens
    }
}

/// Unify quote glyphs, drop niqqud, map final letters to medial forms and lowercase.
pub fn canonicalize(text: &str) -> String {
    text.chars()
        .filter(|c| !is_hebrew_diacritic(*c))
        .map(|c| match c {
            '״' | '”' | '“' | '„' => '"',
            '׳' | '’' | '‘' | '`' => '\'',
            'ך' => 'כ',
            'ם' => 'מ',
            'ן' => 'נ',
            'ף' => 'פ',
            'ץ' => 'צ',
            other => other,
        })
        .collect::<String>()
        .to_lowercase()
}

/// Canonical text with quotes removed in place and every other non-alphanumeric
/// character (dashes, maqaf, bullets, icons) treated as a word separator.
pub fn canonical_words(text: &str) -> Vec<String> {
    let mut cleaned = String::with_capacity(text.len());
    for c in canonicalize(text).chars() {
        if c == '"' || c == '\'' {
            continue;
        }
        if c.is_alphanumeric() {
            cleaned.push(c);
        } else {
            cleaned.push(' ');
        }
    }
    cleaned.split_whitespace().map(str::to_string).collect()
}

fn single_word(term: &str) -> Option<String> {
    let mut words = canonical_words(term);
    if words.len() == 1 {
        words.pop()
    } else {
        None
    }
}

// Points and cantillation marks; maqaf (U+05BE), paseq (U+05C0) and
// sof pasuq (U+05C3) are punctuation and stay.
fn is_hebrew_diacritic(c: char) -> bool {
    matches!(c, '\u{0591}'..='\u{05BD}' | '\u{05BF}' | '\u{05C1}'..='\u{05C2}' | '\u{05C4}'..='\u{05C5}' | '\u{05C7}')
}
