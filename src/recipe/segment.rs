use regex::Regex;
use serde::Serialize;

/// Section of a recipe body the segmenter is currently filling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Title,
    Ingredients,
    Steps,
    Notes,
}

/// Raw body split into its four buffers. Each kept line ends with `\n`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SegmentedRecipe {
    pub title: String,
    pub ingredients: String,
    pub steps: String,
    pub notes: String,
}

impl SegmentedRecipe {
    pub fn buffer(&self, section: Section) -> &str {
        match section {
            Section::Title => &self.title,
            Section::Ingredients => &self.ingredients,
            Section::Steps => &self.steps,
            Section::Notes => &self.notes,
        }
    }

    fn buffer_mut(&mut self, section: Section) -> &mut String {
        match section {
            Section::Title => &mut self.title,
            Section::Ingredients => &mut self.ingredients,
            Section::Steps => &mut self.steps,
            Section::Notes => &mut self.notes,
        }
    }
}

/// Marker patterns in match order. The first entry that matches a line wins.
/// A marker opens its line: only icons, bullets and punctuation may precede it.
const TRANSITIONS: &[(Section, &str)] = &[
    (
        Section::Ingredients,
        r"(?i)^[^\p{L}\p{N}]*(?:🧾|\b(?:מרכיבים|מצרכים|ingredients)\b)",
    ),
    (
        Section::Steps,
        r"(?i)^[^\p{L}\p{N}]*(?:👩‍🍳|\b(?:אופן\s+ה?הכנה|הוראות\s+הכנה|instructions|directions)\b)",
    ),
    (
        Section::Notes,
        r"(?i)^[^\p{L}\p{N}]*(?:📌|\b(?:הערות|notes|tips)\b)",
    ),
];

// Navigation leftover ("previous / next") scraped along with the post body
const NAVIGATION_LEFTOVER: &str = r"(?i)קודם\s*הבא";

/// What a single line does to the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Marker line: switch section, drop the line
    Enter(Section),
    /// Content line: append to the current section
    Append,
}

/// Line-oriented state machine that splits a raw recipe body into sections.
///
/// Starts in [`Section::Title`]. A line matching a marker pattern moves to that
/// marker's section and is discarded; every other non-empty line is appended to
/// the current section. There is no terminal transition.
#[derive(Debug, Clone)]
pub struct Segmenter {
    transitions: Vec<(Section, Regex)>,
    navigation: Regex,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl Segmenter {
    pub fn new() -> Self {
        let transitions = TRANSITIONS
            .iter()
            .map(|(section, pattern)| {
                (
                    *section,
                    Regex::new(pattern).expect("marker patterns are valid"),
                )
            })
            .collect();

        Self {
            transitions,
            navigation: Regex::new(NAVIGATION_LEFTOVER).expect("navigation pattern is valid"),
        }
    }

    /// Unescape literal `\n`, drop carriage returns and the navigation leftover, trim.
    pub fn pre_clean(&self, raw: &str) -> String {
        let unescaped = raw.replace("\\n", "\n").replace('\r', "");
        self.navigation
            .replace_all(&unescaped, "")
            .trim()
            .to_string()
    }

    /// Which section a marker line opens, if the line is a marker
    pub fn marker(&self, line: &str) -> Option<Section> {
        self.transitions
            .iter()
            .find(|(_, pattern)| pattern.is_match(line))
            .map(|(section, _)| *section)
    }

    fn step(&self, line: &str) -> Step {
        match self.marker(line) {
            Some(section) => Step::Enter(section),
            None => Step::Append,
        }
    }

    /// Split a raw recipe body into title, ingredients, steps and notes.
    ///
    /// Empty input gives empty buffers; input without markers ends up
    /// entirely in the title buffer.
    pub fn segment(&self, raw: &str) -> SegmentedRecipe {
        let mut segmented = SegmentedRecipe::default();
        let mut current = Section::Title;

        for line in self.pre_clean(raw).lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match self.step(line) {
                Step::Enter(section) => current = section,
                Step::Append => {
                    let buffer = segmented.buffer_mut(current);
                    buffer.push_str(line);
                    buffer.push('\n');
                }
            }
        }

        segmented
    }
}
