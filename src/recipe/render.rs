use crate::recipe::segment::SegmentedRecipe;
use regex::Regex;
use serde::{Deserialize, Serialize};
use once_cell::sync::Lazy;

/// Decorative icons recipe posts put in front of the title
const TITLE_ICONS: &[&str] = &["🍰", "🍪", "🎂", "🧁"];

/// Structured recipe returned to callers.
///
/// Step numbering is not part of the strings; it comes from list position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub steps: Vec<String>,
    pub notes: Vec<String>,
}

/// A number or fraction, optionally followed by a measurement word
static QUANTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)(?:\d+(?:[.,/]\d+)?|[½¼¾⅓⅔])\s*(?:כוסות|כוס|כפות|כף|כפיות|כפית|גרם|גר|קילו|ק"ג|מ"ל|ליטר|יחידות|יחידה|חבילות|חבילה|שקית|פחית|קורט|cups?|tbsp|tsp|grams?|kg|ml)?"#,
    )
    .expect("quantity pattern is valid")
});

/// `<integer>.` or `<integer>)` at the start of a line
static STEP_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+[.)]").expect("step number pattern is valid"));

/// Render a segmented recipe into lists. Pure: same input, same output.
pub fn render(segmented: &SegmentedRecipe) -> RenderedRecipe {
    RenderedRecipe {
        title: render_title(&segmented.title),
        ingredients: split_ingredients(&segmented.ingredients),
        steps: split_steps(&segmented.steps),
        notes: split_notes(&segmented.notes),
    }
}

pub fn render_title(buffer: &str) -> String {
    let trimmed = buffer.trim_start();
    let without_icon = TITLE_ICONS
        .iter()
        .find_map(|icon| trimmed.strip_prefix(icon))
        .unwrap_or(trimmed);
    collapse_whitespace(without_icon)
}

/// One item per line; a single-line buffer is split before each quantity.
/// Fragments shorter than two characters are noise and dropped.
pub fn split_ingredients(buffer: &str) -> Vec<String> {
    let trimmed = buffer.trim();
    let pieces: Vec<&str> = if trimmed.contains('\n') {
        trimmed.lines().collect()
    } else {
        split_before_quantities(trimmed)
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| p.chars().count() > 1)
        .map(str::to_string)
        .collect()
}

fn split_before_quantities(line: &str) -> Vec<&str> {
    let mut starts = vec![0];

    for m in QUANTITY_RE.find_iter(line) {
        let start = m.start();
        if start == 0 {
            continue;
        }

        let before = &line[..start];
        let before_trimmed = before.trim_end();
        // Only split at a word boundary, and keep "1 1/2" together
        if before_trimmed.len() == before.len() {
            continue;
        }
        if before_trimmed
            .chars()
            .last()
            .map_or(true, |c| c.is_ascii_digit())
        {
            continue;
        }
        starts.push(start);
    }

    let mut pieces = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(line.len());
        pieces.push(&line[start..end]);
    }
    pieces
}

/// Numbered lines open a new step and lose their number; unnumbered lines
/// continue the previous step. Without any numbered line, each line is a step.
pub fn split_steps(buffer: &str) -> Vec<String> {
    let cleaned = buffer.replace("**", "");
    let lines: Vec<&str> = cleaned
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let numbered = lines.iter().any(|l| strip_step_number(l).is_some());
    let mut steps: Vec<String> = Vec::new();

    for line in lines {
        if !numbered {
            steps.push(line.to_string());
            continue;
        }

        match strip_step_number(line) {
            Some(rest) => steps.push(rest.to_string()),
            None => match steps.last_mut() {
                Some(last) => {
                    if !last.is_empty() {
                        last.push(' ');
                    }
                    last.push_str(line);
                }
                None => steps.push(line.to_string()),
            },
        }
    }

    steps.retain(|s| !s.is_empty());
    steps
}

fn strip_step_number(line: &str) -> Option<&str> {
    let m = STEP_NUMBER_RE.find(line)?;
    let rest = &line[m.end()..];
    // "1.5 כוסות" is a quantity, not step one
    if rest.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    Some(rest.trim())
}

/// Split after `.`, `!` or `?` when whitespace follows.
pub fn split_notes(buffer: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = buffer.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            sentences.push(std::mem::take(&mut current));
        }
    }
    sentences.push(current);

    sentences
        .iter()
        .map(|s| collapse_whitespace(s))
        .filter(|s| !s.is_empty())
        .collect()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        assert_eq!(render_title("🍰  עוגת   שוקולד\n"), "עוגת שוקולד");
        assert_eq!(render_title("בראוניז"), "בראוניז");
        assert_eq!(render_title(""), "");
    }

    #[test]
    fn test_ingredients_by_line() {
        let items = split_ingredients("2 כוסות קמח\n1 כוס סוכר\n\nמ\n");
        assert_eq!(items, vec!["2 כוסות קמח", "1 כוס סוכר"]);
    }

    #[test]
    fn test_ingredients_single_line() {
        let items = split_ingredients("2 כוסות קמח 1 כוס סוכר ½ כפית מלח");
        assert_eq!(items, vec!["2 כוסות קמח", "1 כוס סוכר", "½ כפית מלח"]);
    }

    #[test]
    fn test_ingredients_keep_mixed_numbers() {
        let items = split_ingredients("1 1/2 כוסות קמח 200 גרם חמאה");
        assert_eq!(items, vec!["1 1/2 כוסות קמח", "200 גרם חמאה"]);
    }

    #[test]
    fn test_steps_strip_numbers() {
        let steps = split_steps("1. **מחממים** תנור\n2. מערבבים\nעד לקבלת בצק\n3) אופים\n");
        assert_eq!(
            steps,
            vec!["מחממים תנור", "מערבבים עד לקבלת בצק", "אופים"]
        );
    }

    #[test]
    fn test_steps_inconsistent_numbering() {
        // Source numbering is dropped; position decides the order
        let steps = split_steps("1. ראשון\n1. שני\n7. שלישי\n");
        assert_eq!(steps, vec!["ראשון", "שני", "שלישי"]);
    }

    #[test]
    fn test_steps_without_numbers() {
        let steps = split_steps("מחממים תנור\nאופים 20 דקות\n");
        assert_eq!(steps, vec!["מחממים תנור", "אופים 20 דקות"]);
    }

    #[test]
    fn test_steps_decimal_is_not_a_number() {
        let steps = split_steps("1. מוסיפים\n1.5 כוסות מים\n");
        assert_eq!(steps, vec!["מוסיפים 1.5 כוסות מים"]);
    }

    #[test]
    fn test_notes() {
        let notes = split_notes("אפשר להקפיא. שומרים במקרר!\nמגישים חם?  כן\n");
        assert_eq!(notes, vec!["אפשר להקפיא.", "שומרים במקרר!", "מגישים חם?", "כן"]);
        assert!(split_notes("").is_empty());
    }

    #[test]
    fn test_render_is_stable() {
        let segmented = SegmentedRecipe {
            title: "🍪 עוגיות\n".to_string(),
            ingredients: "קמח\nסוכר\n".to_string(),
            steps: "1. לערבב\n2. לאפות\n".to_string(),
            notes: "טעים.\n".to_string(),
        };
        assert_eq!(render(&segmented), render(&segmented));
        assert_eq!(render(&segmented).title, "עוגיות");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&SegmentedRecipe::default()), RenderedRecipe::default());
    }
}
