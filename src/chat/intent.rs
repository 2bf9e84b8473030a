use regex::Regex;
use once_cell::sync::Lazy;

/// What the user is asking for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Wants a recipe from the blog
    Recipe,
    /// Anything else; goes to the completion service
    General,
}

static RECIPE_REQUEST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)מתכון|איך מכינים|תני לי|תן לי|בא לי להכין|recipe|how (?:do i|to) make")
        .expect("recipe request pattern is valid")
});

pub fn classify(message: &str) -> Intent {
    if RECIPE_REQUEST_RE.is_match(message) {
        Intent::Recipe
    } else {
        Intent::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipe_requests() {
        assert_eq!(classify("מתכון לעוגיות שוקולד"), Intent::Recipe);
        assert_eq!(classify("איך מכינים חומוס?"), Intent::Recipe);
        assert_eq!(classify("תני לי משהו מתוק"), Intent::Recipe);
        assert_eq!(classify("בא לי להכין בראוניז"), Intent::Recipe);
        assert_eq!(classify("Recipe for brownies"), Intent::Recipe);
        assert_eq!(classify("how do I make pancakes"), Intent::Recipe);
    }

    #[test]
    fn test_general_questions() {
        assert_eq!(classify("מה אפשר לשים במקום ביצה?"), Intent::General);
        assert_eq!(classify("כמה גרם יש בכוס קמח"), Intent::General);
        assert_eq!(classify(""), Intent::General);
    }
}
