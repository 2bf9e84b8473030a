use askama::Template;

use crate::chat::ChatReply;
use crate::recipe::RenderedRecipe;
use crate::Result;

/// Reply for a recipe request that matched nothing
pub const NOT_FOUND_REPLY: &str = "<p>לא נמצא מתכון תואם במאגר קוקישף 🍪</p>";

/// Recipe card shown in the chat widget
#[derive(Template)]
#[template(path = "recipe_reply.html")]
struct RecipeReplyTemplate<'a> {
    recipe: &'a RenderedRecipe,
}

/// Turn a chat reply into the HTML fragment the widget displays.
///
/// Recipe fields are escaped by the template. Completion text was already
/// sanitized by the chat service and passes through unchanged.
pub fn render_reply(reply: &ChatReply) -> Result<String> {
    match reply {
        ChatReply::Recipe(found) => Ok(RecipeReplyTemplate {
            recipe: &found.recipe,
        }
        .render()?),
        ChatReply::NotFound => Ok(NOT_FOUND_REPLY.to_string()),
        ChatReply::Completion(text) => Ok(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::RecipeLookup;

    fn lookup(recipe: RenderedRecipe) -> ChatReply {
        ChatReply::Recipe(RecipeLookup {
            title: recipe.title.clone(),
            score: 1.0,
            recipe,
        })
    }

    #[test]
    fn test_recipe_card() {
        let html = render_reply(&lookup(RenderedRecipe {
            title: "עוגיות שוקולד".to_string(),
            ingredients: vec!["2 כוסות קמח".to_string(), "1 כוס סוכר".to_string()],
            steps: vec!["מחממים תנור".to_string()],
            notes: vec!["אפשר להקפיא.".to_string()],
        }))
        .unwrap();

        assert!(html.contains("dir=\"rtl\""));
        assert!(html.contains("<h2 style=\"margin:4px 0 12px 0;\">עוגיות שוקולד</h2>"));
        assert!(html.contains("<li>2 כוסות קמח</li><li>1 כוס סוכר</li>"));
        assert!(html.contains("<li>מחממים תנור</li>"));
        assert!(html.contains("📌 הערות והמרות"));
        assert!(html.contains("<li>אפשר להקפיא.</li>"));
    }

    #[test]
    fn test_recipe_card_without_notes_or_title() {
        let html = render_reply(&lookup(RenderedRecipe {
            ingredients: vec!["קמח".to_string()],
            ..Default::default()
        }))
        .unwrap();

        assert!(!html.contains("<h2"));
        assert!(!html.contains("📌"));
        assert!(html.contains("🧾 מצרכים"));
    }

    #[test]
    fn test_recipe_fields_are_escaped() {
        let html = render_reply(&lookup(RenderedRecipe {
            title: "<script>alert(1)</script>".to_string(),
            ingredients: vec!["<b>קמח</b>".to_string()],
            ..Default::default()
        }))
        .unwrap();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_other_replies() {
        assert_eq!(render_reply(&ChatReply::NotFound).unwrap(), NOT_FOUND_REPLY);
        assert_eq!(
            render_reply(&ChatReply::Completion("<p>שלום</p>".to_string())).unwrap(),
            "<p>שלום</p>"
        );
    }
}
